//! HTTP JSON-RPC implementation of the ledger gateway.
//!
//! Every request is a POST of a JSON object carrying an `action` field plus
//! the action's parameters. The node answers with either `{"result": ...}`
//! or `{"error": "..."}`.

mod response;

use ballot_gateway::{
    GatewayError, LedgerGateway, PendingTx, RawProposal, Receipt, TxStatus, WriteAction,
};
use ballot_types::{ProposalId, TokenAmount, WalletAddress};
use serde_json::{json, Value};
use std::time::Duration;

use crate::response::ReceiptResponse;

/// Connection settings for [`RpcLedgerGateway`].
#[derive(Clone, Debug)]
pub struct RpcGatewayConfig {
    /// Node endpoint, e.g. `http://127.0.0.1:8545`.
    pub node_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Delay between receipt polls while a transaction is pending.
    pub poll_interval: Duration,
    /// Give up waiting for a confirmation after this long. `None` waits forever.
    pub confirmation_timeout: Option<Duration>,
    /// Consecutive failed receipt polls tolerated before giving up on a
    /// pending transaction.
    pub receipt_retries: u32,
}

/// Default for [`RpcGatewayConfig::receipt_retries`].
pub const DEFAULT_RECEIPT_RETRIES: u32 = 5;

impl RpcGatewayConfig {
    pub fn new(node_url: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            confirmation_timeout: None,
            receipt_retries: DEFAULT_RECEIPT_RETRIES,
        }
    }
}

/// Ledger gateway talking to a governance node over HTTP.
#[derive(Clone)]
pub struct RpcLedgerGateway {
    http: reqwest::Client,
    config: RpcGatewayConfig,
}

impl RpcLedgerGateway {
    pub fn new(config: RpcGatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// The configured node URL.
    pub fn node_url(&self) -> &str {
        &self.config.node_url
    }

    /// Send a request and return the `result` field.
    ///
    /// An `error` answer from the node comes back as [`GatewayError::Rejected`];
    /// read paths reclassify it.
    async fn rpc_call(&self, action: &str, params: Value) -> Result<Value, GatewayError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| GatewayError::Malformed("params must be a JSON object".into()))?
            .insert("action".to_string(), json!(action));
        tracing::trace!(action, "rpc request");

        let response = self
            .http
            .post(&self.config.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(format!("{action} request"))
                } else {
                    GatewayError::Transport(format!("{action} request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(GatewayError::Transport(format!(
                "node returned HTTP {} for {action}",
                response.status()
            )));
        }

        let mut json: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(format!("invalid JSON response to {action}: {e}")))?;

        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            tracing::debug!(action, error = err, "node returned an error");
            return Err(GatewayError::Rejected(err.to_string()));
        }

        Ok(match json.get_mut("result") {
            Some(result) => result.take(),
            None => json,
        })
    }

    async fn read(&self, action: &str, params: Value) -> Result<Value, GatewayError> {
        self.rpc_call(action, params).await.map_err(|e| match e {
            GatewayError::Rejected(reason) => {
                GatewayError::Transport(format!("node error on {action}: {reason}"))
            }
            other => other,
        })
    }

    async fn submit(&self, action: WriteAction, params: Value) -> Result<PendingTx, GatewayError> {
        let name = rpc_action(action);
        let result = self.rpc_call(name, params).await?;
        let hash = response::tx_hash(name, &result)?;
        tracing::debug!(%action, tx = %hash, "write accepted by node");
        Ok(PendingTx { hash, action })
    }

    /// Poll `tx_receipt` until the transaction leaves the pending state.
    ///
    /// Transport failures and timeouts on a poll leave the transaction
    /// pending, so they are retried up to `receipt_retries` times in a row.
    /// Dropped transactions and malformed receipts end the wait.
    async fn poll_receipt(&self, pending: &PendingTx) -> Result<Receipt, GatewayError> {
        let mut failures = 0u32;
        loop {
            let result = match self
                .read("tx_receipt", json!({ "hash": pending.hash.to_string() }))
                .await
            {
                Ok(result) => {
                    failures = 0;
                    result
                }
                Err(e @ (GatewayError::Transport(_) | GatewayError::Timeout(_))) => {
                    failures += 1;
                    if failures > self.config.receipt_retries {
                        return Err(e);
                    }
                    tracing::warn!(
                        tx = %pending.hash,
                        attempt = failures,
                        error = %e,
                        "receipt poll failed, retrying"
                    );
                    tokio::time::sleep(self.config.poll_interval).await;
                    continue;
                }
                Err(e) => return Err(e),
            };
            let (status, events) = match response::receipt(result)? {
                ReceiptResponse::Pending => {
                    tokio::time::sleep(self.config.poll_interval).await;
                    continue;
                }
                ReceiptResponse::Dropped => {
                    return Err(GatewayError::Dropped(pending.hash.to_string()))
                }
                ReceiptResponse::Confirmed { events } => (TxStatus::Confirmed, events),
                ReceiptResponse::Reverted { reason } => (TxStatus::Reverted { reason }, Vec::new()),
            };
            return Ok(Receipt {
                tx: pending.hash,
                status,
                events,
            });
        }
    }
}

fn rpc_action(action: WriteAction) -> &'static str {
    match action {
        WriteAction::CreateProposal => "proposal_create",
        WriteAction::CastVote => "proposal_vote",
        WriteAction::ExecuteProposal => "proposal_execute",
    }
}

impl LedgerGateway for RpcLedgerGateway {
    async fn read_proposal(&self, id: ProposalId) -> Result<RawProposal, GatewayError> {
        let result = self.read("proposal_get", json!({ "id": id.get() })).await?;
        if result.is_null() {
            return Err(GatewayError::NotFound(id));
        }
        serde_json::from_value(result).map_err(|e| response::malformed("proposal_get", e))
    }

    async fn read_proposal_count(&self) -> Result<u64, GatewayError> {
        let result = self.read("proposal_count", json!({})).await?;
        response::u64_field("proposal_count", &result, "count")
    }

    async fn read_has_voted(
        &self,
        id: ProposalId,
        voter: &WalletAddress,
    ) -> Result<bool, GatewayError> {
        let result = self
            .read(
                "proposal_has_voted",
                json!({ "id": id.get(), "voter": voter.as_str() }),
            )
            .await?;
        response::bool_field("proposal_has_voted", &result, "voted")
    }

    async fn read_token_decimals(&self) -> Result<u8, GatewayError> {
        let result = self.read("token_decimals", json!({})).await?;
        let decimals = response::u64_field("token_decimals", &result, "decimals")?;
        u8::try_from(decimals)
            .map_err(|_| response::malformed("token_decimals", format!("{decimals} decimals")))
    }

    async fn read_token_balance(&self, owner: &WalletAddress) -> Result<TokenAmount, GatewayError> {
        let result = self
            .read("token_balance", json!({ "account": owner.as_str() }))
            .await?;
        response::amount_field("token_balance", &result, "balance")
    }

    async fn read_quorum(&self) -> Result<TokenAmount, GatewayError> {
        let result = self.read("governance_quorum", json!({})).await?;
        response::amount_field("governance_quorum", &result, "quorum")
    }

    async fn read_voting_period(&self) -> Result<u64, GatewayError> {
        let result = self.read("governance_voting_period", json!({})).await?;
        response::u64_field("governance_voting_period", &result, "voting_period")
    }

    async fn submit_create(
        &self,
        signer: &WalletAddress,
        description: &str,
    ) -> Result<PendingTx, GatewayError> {
        self.submit(
            WriteAction::CreateProposal,
            json!({ "signer": signer.as_str(), "description": description }),
        )
        .await
    }

    async fn submit_vote(
        &self,
        signer: &WalletAddress,
        id: ProposalId,
        support: bool,
    ) -> Result<PendingTx, GatewayError> {
        self.submit(
            WriteAction::CastVote,
            json!({ "signer": signer.as_str(), "id": id.get(), "support": support }),
        )
        .await
    }

    async fn submit_execute(
        &self,
        signer: &WalletAddress,
        id: ProposalId,
    ) -> Result<PendingTx, GatewayError> {
        self.submit(
            WriteAction::ExecuteProposal,
            json!({ "signer": signer.as_str(), "id": id.get() }),
        )
        .await
    }

    async fn await_confirmation(&self, pending: &PendingTx) -> Result<Receipt, GatewayError> {
        match self.config.confirmation_timeout {
            None => self.poll_receipt(pending).await,
            Some(limit) => tokio::time::timeout(limit, self.poll_receipt(pending))
                .await
                .map_err(|_| GatewayError::Timeout(pending.hash.to_string()))?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names() {
        assert_eq!(rpc_action(WriteAction::CreateProposal), "proposal_create");
        assert_eq!(rpc_action(WriteAction::CastVote), "proposal_vote");
        assert_eq!(rpc_action(WriteAction::ExecuteProposal), "proposal_execute");
    }

    #[test]
    fn config_defaults() {
        let config = RpcGatewayConfig::new("http://127.0.0.1:8545");
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(config.confirmation_timeout.is_none());
        assert_eq!(config.receipt_retries, DEFAULT_RECEIPT_RETRIES);
        let gateway = RpcLedgerGateway::new(config).unwrap();
        assert_eq!(gateway.node_url(), "http://127.0.0.1:8545");
    }
}
