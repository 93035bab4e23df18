//! The RPC gateway against an in-process mock node.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use ballot_gateway::{GatewayError, LedgerEvent, LedgerGateway, PendingTx, TxStatus, WriteAction};
use ballot_gateway_rpc::{RpcGatewayConfig, RpcLedgerGateway};
use ballot_types::{ProposalId, TokenAmount, TxHash, WalletAddress};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Mock node
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockNode {
    requests: Vec<Value>,
    receipts: VecDeque<Value>,
    fail_http: bool,
    failing_receipt_polls: usize,
}

type Shared = Arc<Mutex<MockNode>>;

fn hash() -> String {
    format!("0x{}", "0f".repeat(32))
}

async fn handle(State(node): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut node = node.lock().unwrap();
    node.requests.push(body.clone());
    if node.fail_http {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    let action = body["action"].as_str().unwrap_or_default();
    if action == "tx_receipt" && node.failing_receipt_polls > 0 {
        node.failing_receipt_polls -= 1;
        return (StatusCode::BAD_GATEWAY, Json(json!({})));
    }
    let reply = match action {
        "proposal_get" if body["id"] == json!(1) => json!({ "result": {
            "creator": "0x1111111111111111111111111111111111111111",
            "description": "Description: hi",
            "forVotes": "30000000000000000000",
            "againstVotes": "0x8ac7230489e80000",
            "startTime": 100,
            "endTime": 200,
            "executed": false,
            "passed": false
        }}),
        "proposal_get" => json!({ "result": null }),
        "proposal_count" => json!({ "result": { "count": 4 } }),
        "proposal_has_voted" => json!({ "result": { "voted": true } }),
        "token_decimals" => json!({ "result": { "decimals": 18 } }),
        "token_balance" => json!({ "result": { "balance": "5000" } }),
        "governance_quorum" => json!({ "result": { "quorum": 0 } }),
        "governance_voting_period" => json!({ "result": { "voting_period": 259200 } }),
        "proposal_create" if body["description"] == json!("") => {
            json!({ "error": "description is empty" })
        }
        "proposal_create" | "proposal_vote" | "proposal_execute" => {
            json!({ "result": { "hash": hash() } })
        }
        "tx_receipt" => {
            let receipt = node
                .receipts
                .pop_front()
                .unwrap_or_else(|| json!({ "status": "pending" }));
            json!({ "result": receipt })
        }
        _ => json!({ "error": format!("unknown action {action}") }),
    };
    (StatusCode::OK, Json(reply))
}

async fn spawn_node(node: Shared) -> SocketAddr {
    let app = Router::new().route("/", post(handle)).with_state(node);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn receipt_polls(node: &Shared) -> usize {
    node.lock()
        .unwrap()
        .requests
        .iter()
        .filter(|r| r["action"] == json!("tx_receipt"))
        .count()
}

async fn gateway(node: &Shared, confirmation_timeout: Option<Duration>) -> RpcLedgerGateway {
    let addr = spawn_node(Arc::clone(node)).await;
    let mut config = RpcGatewayConfig::new(format!("http://{addr}/"));
    config.poll_interval = Duration::from_millis(5);
    config.confirmation_timeout = confirmation_timeout;
    RpcLedgerGateway::new(config).unwrap()
}

fn signer() -> WalletAddress {
    WalletAddress::parse("0x2222222222222222222222222222222222222222").unwrap()
}

fn pending(action: WriteAction) -> PendingTx {
    PendingTx {
        hash: TxHash::from_hex(&hash()).unwrap(),
        action,
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reads_decode_node_answers() {
    let node = Shared::default();
    let gw = gateway(&node, None).await;

    let raw = gw.read_proposal(ProposalId::new(1)).await.unwrap();
    assert_eq!(raw.creator.as_deref(), Some("0x1111111111111111111111111111111111111111"));
    assert_eq!(raw.start_time, Some(json!(100)));
    assert_eq!(raw.against_votes, Some(json!("0x8ac7230489e80000")));

    assert_eq!(gw.read_proposal_count().await.unwrap(), 4);
    assert!(gw.read_has_voted(ProposalId::new(1), &signer()).await.unwrap());
    assert_eq!(gw.read_token_decimals().await.unwrap(), 18);
    assert_eq!(gw.read_token_balance(&signer()).await.unwrap(), TokenAmount::new(5000));
    assert_eq!(gw.read_quorum().await.unwrap(), TokenAmount::ZERO);
    assert_eq!(gw.read_voting_period().await.unwrap(), 259_200);

    let requests = node.lock().unwrap().requests.clone();
    assert_eq!(requests[0], json!({ "action": "proposal_get", "id": 1 }));
    assert_eq!(requests[2]["voter"], json!(signer().as_str()));
}

#[tokio::test]
async fn null_proposal_is_not_found() {
    let node = Shared::default();
    let gw = gateway(&node, None).await;
    let err = gw.read_proposal(ProposalId::new(7)).await.unwrap_err();
    assert_eq!(err, GatewayError::NotFound(ProposalId::new(7)));
}

#[tokio::test]
async fn http_failure_is_a_transport_error() {
    let node = Shared::default();
    node.lock().unwrap().fail_http = true;
    let gw = gateway(&node, None).await;
    assert!(matches!(
        gw.read_proposal_count().await,
        Err(GatewayError::Transport(_))
    ));
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let gw = RpcLedgerGateway::new(RpcGatewayConfig::new(format!("http://{addr}/"))).unwrap();
    assert!(matches!(
        gw.read_token_decimals().await,
        Err(GatewayError::Transport(_))
    ));
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn node_error_on_submit_is_a_rejection() {
    let node = Shared::default();
    let gw = gateway(&node, None).await;
    let err = gw.submit_create(&signer(), "").await.unwrap_err();
    assert_eq!(err, GatewayError::Rejected("description is empty".into()));
}

#[tokio::test]
async fn confirmation_polls_past_pending() {
    let node = Shared::default();
    {
        let mut n = node.lock().unwrap();
        n.receipts.push_back(json!({ "status": "pending" }));
        n.receipts.push_back(json!({ "status": "pending" }));
        n.receipts.push_back(json!({
            "status": "confirmed",
            "events": [{
                "event": "proposal_created",
                "proposal_id": 5,
                "creator": signer().as_str(),
                "start_time": 100,
                "end_time": 200
            }]
        }));
    }
    let gw = gateway(&node, None).await;

    let tx = gw.submit_create(&signer(), "Description: x").await.unwrap();
    assert_eq!(tx.action, WriteAction::CreateProposal);
    let receipt = gw.await_confirmation(&tx).await.unwrap();
    assert!(receipt.is_confirmed());
    assert_eq!(receipt.created_proposal(), Some(ProposalId::new(5)));
    assert!(matches!(receipt.events[0], LedgerEvent::ProposalCreated { .. }));

    assert_eq!(receipt_polls(&node), 3);
}

#[tokio::test]
async fn failed_receipt_poll_keeps_waiting() {
    let node = Shared::default();
    {
        let mut n = node.lock().unwrap();
        n.failing_receipt_polls = 1;
        n.receipts.push_back(json!({ "status": "confirmed" }));
    }
    let gw = gateway(&node, None).await;

    let receipt = gw
        .await_confirmation(&pending(WriteAction::CastVote))
        .await
        .unwrap();
    assert!(receipt.is_confirmed());
    assert_eq!(receipt_polls(&node), 2);
}

#[tokio::test]
async fn persistent_receipt_failures_end_the_wait() {
    let node = Shared::default();
    node.lock().unwrap().failing_receipt_polls = usize::MAX;
    let addr = spawn_node(Arc::clone(&node)).await;
    let mut config = RpcGatewayConfig::new(format!("http://{addr}/"));
    config.poll_interval = Duration::from_millis(5);
    config.receipt_retries = 2;
    let gw = RpcLedgerGateway::new(config).unwrap();

    let err = gw
        .await_confirmation(&pending(WriteAction::CastVote))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
    assert_eq!(receipt_polls(&node), 3);
}

#[tokio::test]
async fn reverted_and_dropped_receipts() {
    let node = Shared::default();
    {
        let mut n = node.lock().unwrap();
        n.receipts
            .push_back(json!({ "status": "reverted", "reason": "voting period has not ended" }));
        n.receipts.push_back(json!({ "status": "dropped" }));
    }
    let gw = gateway(&node, None).await;

    let receipt = gw
        .await_confirmation(&pending(WriteAction::ExecuteProposal))
        .await
        .unwrap();
    assert_eq!(
        receipt.status,
        TxStatus::Reverted {
            reason: "voting period has not ended".into()
        }
    );

    let err = gw
        .await_confirmation(&pending(WriteAction::CastVote))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Dropped(_)));
}

#[tokio::test]
async fn confirmation_timeout_is_optional() {
    let node = Shared::default();
    let gw = gateway(&node, Some(Duration::from_millis(50))).await;
    let err = gw
        .await_confirmation(&pending(WriteAction::CastVote))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(_)));
}
