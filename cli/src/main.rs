//! ballot: command-line client for the governance ledger.

mod config;
mod render;

use anyhow::Context;
use ballot_gateway_rpc::RpcLedgerGateway;
use ballot_governance::{GovernanceClient, ProposalContent, ProposalFilter, WalletSession};
use ballot_types::{Clock, ProposalId, SystemClock, WalletAddress};
use ballot_utils::{init_logging, LogFormat};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ClientConfig;

#[derive(Parser)]
#[command(name = "ballot", about = "Governance ledger client", version)]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Governance node JSON-RPC endpoint.
    #[arg(long, global = true, env = "BALLOT_NODE_URL")]
    node_url: Option<String>,

    /// Wallet address to act as (required for create, vote and execute).
    #[arg(long, global = true, env = "BALLOT_ACCOUNT")]
    account: Option<WalletAddress>,

    /// Proposal reads kept in flight while listing.
    #[arg(long, global = true, env = "BALLOT_FETCH_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Stop waiting for a write confirmation after this many seconds.
    #[arg(long, global = true, env = "BALLOT_CONFIRMATION_TIMEOUT_SECS")]
    confirmation_timeout_secs: Option<u64>,

    /// Log filter: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "BALLOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "BALLOT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// List proposals in creation order.
    List {
        /// all, active, completed, passed or rejected.
        #[arg(long, default_value = "all")]
        filter: ProposalFilter,
    },
    /// Show one proposal.
    Show { id: ProposalId },
    /// Submit a new proposal.
    Create {
        /// What should be done and why.
        #[arg(long)]
        description: String,
        /// Link to the content the proposal is about.
        #[arg(long, default_value = "")]
        content_url: String,
        /// Reason for removal.
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Vote on an active proposal.
    Vote {
        id: ProposalId,
        #[arg(long, value_enum)]
        support: Support,
    },
    /// Execute a proposal whose voting window has closed.
    Execute { id: ProposalId },
    /// Outcome statistics over executed proposals.
    Stats,
    /// Quorum, voting period and token decimals.
    Params,
    /// Print the resolved configuration as TOML.
    Config,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Support {
    For,
    Against,
}

impl Cli {
    /// File config (or defaults) with flag and env overrides applied.
    fn resolve_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.node_url {
            config.node_url = url.clone();
        }
        if let Some(account) = &self.account {
            config.account = Some(account.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.fetch_concurrency = concurrency;
        }
        if let Some(secs) = self.confirmation_timeout_secs {
            config.confirmation_timeout_secs = Some(secs);
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok(config)
    }
}

fn print<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(config.log_format, &config.log_level);
    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }
    tracing::debug!(node = %config.node_url, account = ?config.account, "configuration resolved");

    let gateway = Arc::new(RpcLedgerGateway::new(config.rpc_config())?);
    let clock = Arc::new(SystemClock);
    let client = GovernanceClient::new(gateway, Arc::clone(&clock))
        .with_concurrency(config.fetch_concurrency);
    let session = match &config.account {
        Some(account) => WalletSession::connected(account.clone()),
        None => WalletSession::disconnected(),
    };
    let caller = session.address();
    let json = cli.json;

    match cli.command {
        Command::List { filter } => {
            let batch = client.list_batch(caller.as_ref()).await?;
            for failure in &batch.failures {
                eprintln!("warning: skipped proposal {}: {}", failure.id, failure.error);
            }
            let now = clock.now();
            let proposals = filter.apply(batch.proposals);
            print(json, &proposals, || {
                if proposals.is_empty() {
                    return "No proposals.\n".to_string();
                }
                proposals
                    .iter()
                    .map(|p| render::proposal_line(p, now) + "\n")
                    .collect()
            })?;
        }
        Command::Show { id } => {
            let proposal = client.get_proposal(id, caller.as_ref()).await?;
            let now = clock.now();
            print(json, &proposal, || render::proposal_detail(&proposal, now))?;
        }
        Command::Create {
            description,
            content_url,
            reason,
        } => {
            let content = ProposalContent::new(content_url, description, reason);
            let id = client.create_proposal(&session, &content).await?;
            print(json, &id, || format!("Created proposal {id}\n"))?;
        }
        Command::Vote { id, support } => {
            let support = matches!(support, Support::For);
            let outcome = client.vote(&session, id, support).await?;
            let now = clock.now();
            let refreshed = outcome.refreshed.as_ref().ok();
            print(json, &refreshed, || render::write_outcome("Vote", &outcome, now))?;
        }
        Command::Execute { id } => {
            let outcome = client.execute(&session, id).await?;
            let now = clock.now();
            let refreshed = outcome.refreshed.as_ref().ok();
            print(json, &refreshed, || {
                render::write_outcome("Execution", &outcome, now)
            })?;
        }
        Command::Stats => {
            let batch = client.list_batch(caller.as_ref()).await?;
            if !batch.is_complete() {
                eprintln!(
                    "warning: {} of {} proposals could not be loaded",
                    batch.failures.len(),
                    batch.count
                );
            }
            let tally = client.stats(&batch.proposals);
            print(json, &tally, || render::tally(&tally))?;
        }
        Command::Params => {
            let params = client.params().await?;
            print(json, &params, || render::params(&params))?;
        }
        Command::Config => {}
    }

    Ok(())
}
