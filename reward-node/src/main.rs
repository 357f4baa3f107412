//! This binary scores open source contributors from their GitHub activity and pays them in TEA
//! tokens on an Ethereum network.
//!
//! ## Usage
//! ```sh
//! export ETH_RPC_URL=https://sepolia.example/rpc TEA_TOKEN_ADDRESS=0x... GITHUB_TOKEN=ghp_...
//! reward-node score --owner tea-xyz --repo demo octocat
//! reward-node contributions --owner tea-xyz --repo demo octocat
//! reward-node history --owner tea-xyz --repo demo octocat 0xAbC...
//! reward-node distribute --owner tea-xyz --repo demo octocat 0xAbC... --eth-key-path .eth
//! reward-node stake --staking-address 0x... --project-address 0x...
//! reward-node watch
//! ```
//!
//! Results are printed to stdout as JSON; diagnostics go to stderr through `RUST_LOG`.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::Address as EthAddress;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::{LocalSignerError, PrivateKeySigner};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use clap::{Args, Parser, Subcommand};
use log::info;
use reward_core::{ActivityTimeline, Address, ChainEvent, EventKind};
use reward_engine::activity_ledger::ActivityLedger;
use reward_engine::config::{ScoringArgs, ScoringConfig};
use reward_engine::coordinator::{
    parse_recipient,
    CompositionError,
    RewardCoordinator,
    ScoredContribution,
};
use reward_engine::error::{BoxError, CoordinatorError, ValidationError};
use reward_engine::event_bus::EventBus;
use reward_engine::observability::{LogSink, ObservabilitySink};
use reward_engine::providers::DistributionProvider;
use reward_node::chain_source::{LogPoller, RpcChainHead, DEFAULT_BATCH_SIZE};
use reward_node::distributor::TokenDistributor;
use reward_node::error::NodeError;
use reward_node::github::{GitHubConfig, GitHubStatsProvider, DEFAULT_API_URL};
use reward_node::staking::ProjectStakeReader;
use serde::Serialize;
use snafu::{ResultExt, Snafu};
use url::Url;

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("Failed to read Ethereum key from file '{}': {}", path, source))]
    KeyFileRead {
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("Failed to parse Ethereum key: {}", source))]
    KeyParse { source: LocalSignerError },

    #[snafu(display("{source}"))]
    Validation { source: ValidationError },

    #[snafu(display("{source}"))]
    Node { source: NodeError },

    #[snafu(display("{source}"))]
    Coordinator { source: CoordinatorError },

    #[snafu(display("Failed to read the chain head: {source}"))]
    ChainHead {
        source: alloy::transports::TransportError,
    },

    #[snafu(display("Failed to serialize output: {source}"))]
    Json { source: serde_json::Error },
}

/// Type alias for returning results with `CliError`
type Result<T, E = CliError> = std::result::Result<T, E>;

/// CLI arguments parser using `clap` derive syntax
#[derive(Parser, Debug)]
#[command(
    name = "reward-node",
    version,
    about = "Scores open source contributors and rewards them in TEA tokens"
)]
struct Cli {
    /// The RPC URL of the Ethereum node
    #[arg(long, env = "ETH_RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc_url: Url,

    #[command(flatten)]
    scoring: ScoringArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Repository whose contributors are scored.
#[derive(Args, Debug, Clone)]
struct GitHubArgs {
    /// Repository owner
    #[arg(long, env = "GITHUB_OWNER")]
    owner: String,

    /// Repository name
    #[arg(long, env = "GITHUB_REPO")]
    repo: String,

    /// Personal access token; requests are anonymous without one
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    github_api_url: Url,
}

/// The token contract, for subcommands that read or write the chain.
#[derive(Args, Debug, Clone, Copy)]
struct TokenArgs {
    /// The TEA token contract address
    #[arg(long, env = "TEA_TOKEN_ADDRESS")]
    token_address: EthAddress,
}

impl GitHubArgs {
    fn provider(&self) -> Result<GitHubStatsProvider> {
        GitHubStatsProvider::new(GitHubConfig {
            api_url: self.github_api_url.clone(),
            token: self.github_token.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
        })
        .context(NodeSnafu)
    }
}

/// Defines the available subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scores a contributor without paying out
    Score {
        #[command(flatten)]
        github: GitHubArgs,
        /// GitHub username
        username: String,
    },
    /// Lists the commits, issues and pull requests behind a contributor's counts
    Contributions {
        #[command(flatten)]
        github: GitHubArgs,
        /// GitHub username
        username: String,
    },
    /// Shows a contributor's score next to their recent token activity
    History {
        #[command(flatten)]
        github: GitHubArgs,
        #[command(flatten)]
        token: TokenArgs,
        /// GitHub username
        username: String,
        /// The contributor's Ethereum address
        address: String,
    },
    /// Scores a contributor and transfers the reward
    Distribute {
        #[command(flatten)]
        github: GitHubArgs,
        #[command(flatten)]
        token: TokenArgs,
        /// GitHub username
        username: String,
        /// Reward recipient
        address: String,
        /// Path to the operator's hex-encoded private key
        #[arg(long, env = "ETH_KEY_PATH", default_value = ".eth")]
        eth_key_path: String,
    },
    /// Prints the TEA balance of an address
    Balance {
        #[command(flatten)]
        token: TokenArgs,
        /// Account to look up
        address: String,
    },
    /// Lists lifetime commit totals for every contributor of the repository
    Contributors {
        #[command(flatten)]
        github: GitHubArgs,
    },
    /// Prints every token event of one kind in a block range
    Events {
        #[command(flatten)]
        token: TokenArgs,
        /// Transfer, Stake, Unstake or RewardDistributed
        kind: EventKind,
        /// First block, inclusive
        #[arg(long)]
        from_block: u64,
        /// Last block, inclusive; defaults to the chain head
        #[arg(long)]
        to_block: Option<u64>,
    },
    /// Prints the TEA stake backing a project
    Stake {
        /// The staking contract address
        #[arg(long, env = "TEA_STAKING_ADDRESS")]
        staking_address: EthAddress,
        /// The project whose stake is read
        #[arg(long, env = "PROJECT_ADDRESS")]
        project_address: EthAddress,
    },
    /// Streams token events as JSON lines
    Watch {
        #[command(flatten)]
        token: TokenArgs,
        /// First block to read; defaults to one block window behind the head
        #[arg(long)]
        from_block: Option<u64>,
        /// Blocks per log request
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: u64,
        /// Seconds between polls
        #[arg(long, default_value_t = 12)]
        poll_interval_secs: u64,
    },
}

/// Both sides of a contributor history, with whatever failed spelled out.
#[derive(Debug, Serialize)]
struct HistoryReport {
    identifier: String,
    address: Address,
    off_chain: Option<ScoredContribution>,
    on_chain: Option<ActivityTimeline>,
    errors: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Cli::parse();
    let config = args.scoring.to_config().context(ValidationSnafu)?;
    let sink: Arc<dyn ObservabilitySink> = Arc::new(LogSink);
    let provider = ProviderBuilder::new().on_http(args.rpc_url.clone());

    match args.command {
        Commands::Score { github, username } => {
            let coordinator = build_coordinator(
                config,
                &github,
                Arc::new(NoPayouts),
                Arc::new(ActivityLedger::new(sink.clone())),
                sink,
            )?;
            let scored = coordinator
                .score_contributor(&username)
                .await
                .context(CoordinatorSnafu)?;
            print_json(&scored)
        }
        Commands::Contributions { github, username } => {
            let recent = github
                .provider()?
                .recent_contribution_details(&username, config.window_days)
                .await
                .context(NodeSnafu)?;
            print_json(&recent)
        }
        Commands::History {
            github,
            token,
            username,
            address,
        } => {
            let address = parse_recipient(&address).context(ValidationSnafu)?;
            let ledger =
                backfill_ledger(&provider, token.token_address, config.block_window, sink.clone())
                    .await?;
            let coordinator = build_coordinator(
                config,
                &github,
                Arc::new(NoPayouts),
                ledger,
                sink,
            )?
            .with_chain_head(Arc::new(RpcChainHead::new(provider)));

            let history = coordinator.contributor_history(&username, &address).await;
            print_json(&history_report(username, address, history.into_complete()))
        }
        Commands::Distribute {
            github,
            token,
            username,
            address,
            eth_key_path,
        } => {
            let recipient = parse_recipient(&address).context(ValidationSnafu)?;
            let signer = load_signer(&eth_key_path).await?;
            info!("Distributing from operator {}", signer.address());
            let wallet_provider = ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .on_http(args.rpc_url.clone());

            let coordinator = build_coordinator(
                config,
                &github,
                Arc::new(TokenDistributor::new(wallet_provider, token.token_address)),
                Arc::new(ActivityLedger::new(sink.clone())),
                sink,
            )?;
            let report = coordinator
                .reward_contributor(&username, &recipient)
                .await
                .context(CoordinatorSnafu)?;
            print_json(&report)
        }
        Commands::Balance { token, address } => {
            let owner = parse_recipient(&address).context(ValidationSnafu)?;
            let balance = TokenDistributor::new(provider, token.token_address)
                .balance_of(&owner)
                .await
                .context(NodeSnafu)?;
            print_json(&serde_json::json!({ "address": owner, "balance": balance }))
        }
        Commands::Contributors { github } => {
            let stats = github
                .provider()?
                .contributor_stats()
                .await
                .context(NodeSnafu)?;
            print_json(&stats)
        }
        Commands::Events {
            token,
            kind,
            from_block,
            to_block,
        } => {
            let to_block = match to_block {
                Some(block) => block,
                None => provider.get_block_number().await.context(ChainHeadSnafu)?,
            };
            let bus = Arc::new(EventBus::new(sink.clone()));
            let events = LogPoller::new(
                provider,
                token.token_address,
                bus,
                Arc::new(ActivityLedger::new(sink)),
            )
            .past_events(kind, from_block, to_block)
            .await
            .context(NodeSnafu)?;
            print_json(&events)
        }
        Commands::Stake {
            staking_address,
            project_address,
        } => {
            let stake = ProjectStakeReader::new(provider, staking_address, project_address)
                .project_stake()
                .await
                .context(NodeSnafu)?;
            print_json(&serde_json::json!({ "project": project_address, "stake": stake }))
        }
        Commands::Watch {
            token,
            from_block,
            batch_size,
            poll_interval_secs,
        } => {
            let start = match from_block {
                Some(block) => block,
                None => provider
                    .get_block_number()
                    .await
                    .context(ChainHeadSnafu)?
                    .saturating_sub(config.block_window),
            };

            let bus = Arc::new(EventBus::new(sink.clone()));
            let ledger = Arc::new(ActivityLedger::new(sink));
            ledger.attach(&bus);
            for kind in EventKind::ALL {
                bus.register(kind.as_str(), |event: &ChainEvent| -> Result<(), BoxError> {
                    println!("{}", serde_json::to_string(event)?);
                    Ok(())
                });
            }

            LogPoller::new(provider, token.token_address, bus, ledger)
                .starting_at(start)
                .with_batch_size(batch_size)
                .with_poll_interval(Duration::from_secs(poll_interval_secs))
                .run()
                .await;
            Ok(())
        }
    }
}

/// Distribution provider for subcommands that never pay out.
struct NoPayouts;

#[async_trait]
impl DistributionProvider for NoPayouts {
    async fn distribute(
        &self,
        recipient: &Address,
        amount: &BigDecimal,
    ) -> Result<String, BoxError> {
        Err(format!("payouts are disabled; not sending {amount} tokens to {recipient}").into())
    }
}

fn build_coordinator(
    config: ScoringConfig,
    github: &GitHubArgs,
    distributor: Arc<dyn DistributionProvider>,
    ledger: Arc<ActivityLedger>,
    sink: Arc<dyn ObservabilitySink>,
) -> Result<RewardCoordinator> {
    RewardCoordinator::new(
        config,
        Arc::new(github.provider()?),
        distributor,
        ledger,
        sink,
    )
    .context(ValidationSnafu)
}

/// Loads the last block window of token events into a fresh ledger.
async fn backfill_ledger<P>(
    provider: &P,
    token: EthAddress,
    block_window: u64,
    sink: Arc<dyn ObservabilitySink>,
) -> Result<Arc<ActivityLedger>>
where
    P: Provider + Clone,
{
    let head = provider.get_block_number().await.context(ChainHeadSnafu)?;
    let bus = Arc::new(EventBus::new(sink.clone()));
    let ledger = Arc::new(ActivityLedger::new(sink));
    ledger.attach(&bus);

    let summary = LogPoller::new(provider.clone(), token, bus, ledger.clone())
        .starting_at(head.saturating_sub(block_window))
        .poll_once()
        .await
        .context(NodeSnafu)?;
    info!(
        "Loaded {} token events up to block {}",
        summary.published, summary.head
    );
    Ok(ledger)
}

fn history_report(
    identifier: String,
    address: Address,
    history: Result<(ScoredContribution, ActivityTimeline), CompositionError>,
) -> HistoryReport {
    let mut report = HistoryReport {
        identifier,
        address,
        off_chain: None,
        on_chain: None,
        errors: Vec::new(),
    };
    match history {
        Ok((off_chain, on_chain)) => {
            report.off_chain = Some(off_chain);
            report.on_chain = Some(on_chain);
        }
        Err(CompositionError::OffChainFailed { source, on_chain }) => {
            report.on_chain = Some(on_chain);
            report.errors.push(format!("off-chain: {source}"));
        }
        Err(CompositionError::OnChainFailed { source, off_chain }) => {
            report.off_chain = Some(off_chain);
            report.errors.push(format!("on-chain: {source}"));
        }
        Err(CompositionError::BothFailed { source, on_chain }) => {
            report.errors.push(format!("off-chain: {source}"));
            report.errors.push(format!("on-chain: {on_chain}"));
        }
    }
    report
}

async fn load_signer(path: &str) -> Result<PrivateKeySigner> {
    let hex_string = tokio::fs::read_to_string(path)
        .await
        .context(KeyFileReadSnafu { path })?;
    PrivateKeySigner::from_str(hex_string.trim()).context(KeyParseSnafu)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context(JsonSnafu)?
    );
    Ok(())
}
