use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::*;
use env_logger::Builder;
use log::{debug, LevelFilter};
use prettytable::{row, Table};

use gnusdao_core::config::{AppConfig, DEFAULT_CONFIG_FILE};
use gnusdao_core::errors::{DaoError, Result};
use gnusdao_core::governance::quadratic::{self, QuadraticQuote};
use gnusdao_core::governance::{infer_state_local, Proposal, ProposalState};
use gnusdao_core::ipfs::{get_ipfs_url, is_valid_ipfs_hash, normalize_hash, IpfsClient};
use gnusdao_core::registry::{self, abi, Address, GOVERNANCE_ABI};
use gnusdao_core::state::SettingsStore;
use gnusdao_core::utils::{
    current_time, format_file_size, format_time_diff, format_time_remaining, format_timestamp, format_token_amount,
    parse_token_amount, shorten_address,
};

#[derive(Parser)]
#[clap(author, version, about)]
/// Command line client for GNUS DAO governance
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./gnusdao.toml when present)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Log level for output; overrides the configured level
    #[clap(short, long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer a proposal's state from its timing and tallies
    State {
        #[clap(long)]
        start: u64,
        #[clap(long)]
        end: u64,
        #[clap(long = "for", default_value = "0")]
        for_votes: u128,
        #[clap(long, default_value = "0")]
        against: u128,
        #[clap(long, default_value = "0")]
        abstain: u128,
        /// Votes required for quorum
        #[clap(long, default_value = "0")]
        quorum: u128,
        #[clap(long)]
        executed: bool,
        #[clap(long)]
        cancelled: bool,
        /// Evaluation time in unix seconds (defaults to now)
        #[clap(long)]
        now: Option<u64>,
    },

    /// Quadratic voting math
    #[clap(subcommand)]
    Quadratic(QuadraticCommand),

    /// Upload, fetch and check IPFS content
    #[clap(subcommand)]
    Ipfs(IpfsCommand),

    /// Networks, contract addresses and ABI selectors
    #[clap(subcommand)]
    Registry(RegistryCommand),

    /// Inspect and create configuration
    #[clap(subcommand)]
    Config(ConfigCommand),

    /// Convert between raw and decimal token amounts
    #[clap(subcommand)]
    Token(TokenCommand),

    /// Show stored settings for an address
    Settings { address: Address },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Render a raw amount, e.g. `format 1500000000000000000` -> 1.5
    Format {
        raw: u128,
        #[clap(short, long, default_value = "18")]
        decimals: u8,
    },
    /// Parse a decimal amount into its raw integer form
    Parse {
        amount: String,
        #[clap(short, long, default_value = "18")]
        decimals: u8,
    },
}

#[derive(Subcommand)]
enum QuadraticCommand {
    /// Credits needed to cast `votes`
    Cost { votes: u128 },
    /// Votes bought by `cost` credits
    Weight { cost: u128 },
    /// Largest vote count `credits` can afford
    Max { credits: u128 },
    /// Even split of credits across several proposals
    Optimal { credits: u128, proposals: u128 },
    /// Cost, weight and affordability in one table
    Quote { votes: u128, credits: u128 },
}

#[derive(Subcommand)]
enum IpfsCommand {
    /// Validate and pin a file
    Upload { file: PathBuf },
    /// Fetch content through the configured gateways
    Fetch {
        hash: String,
        /// Write content here instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch and validate a proposal metadata document
    Metadata { hash: String },
    /// Pin content already on the network
    Pin { hash: String },
    /// Check that a string is a CID
    Validate { hash: String },
    /// Print gateway URLs for a hash
    Url { hash: String },
}

#[derive(Subcommand)]
enum RegistryCommand {
    /// Supported networks and Diamond deployments
    #[clap(alias = "ls")]
    Networks,
    /// Function selectors of the governance ABI
    Selectors,
    /// Encode calldata, e.g. `calldata "castVote(uint256,uint8)" 1 1`
    Calldata { signature: String, args: Vec<String> },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Write a default configuration file
    Init {
        #[clap(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
    /// Validate the effective configuration
    Validate,
}

fn level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// `--log-level` wins over the configured level, which wins over `info`
fn resolve_level(cli_level: Option<&str>, config: Option<&AppConfig>) -> LevelFilter {
    cli_level
        .or_else(|| config.map(|c| c.log_level.as_str()))
        .map(level_filter)
        .unwrap_or(LevelFilter::Info)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Filtering goes through the global max level so it can change once config is loaded
    Builder::new()
        .filter_level(LevelFilter::Trace)
        .format_timestamp_millis()
        .init();
    log::set_max_level(resolve_level(cli.log_level.as_deref(), None));

    let config = AppConfig::load(cli.config.as_deref());
    log::set_max_level(resolve_level(cli.log_level.as_deref(), config.as_ref().ok()));

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::State {
            start,
            end,
            for_votes,
            against,
            abstain,
            quorum,
            executed,
            cancelled,
            now,
        } => {
            let proposal = Proposal {
                start_time: start,
                end_time: end,
                for_votes,
                against_votes: against,
                abstain_votes: abstain,
                total_votes: for_votes.saturating_add(against).saturating_add(abstain),
                executed,
                cancelled,
                ..Default::default()
            };
            show_state(&proposal, quorum, now.unwrap_or_else(current_time));
            Ok(())
        }
        Commands::Quadratic(cmd) => run_quadratic(cmd),
        Commands::Ipfs(cmd) => run_ipfs(cmd, &config).await,
        Commands::Registry(cmd) => run_registry(cmd, &config),
        Commands::Config(cmd) => run_config(cmd, &config),
        Commands::Token(TokenCommand::Format { raw, decimals }) => {
            println!("{}", format_token_amount(raw, decimals));
            Ok(())
        }
        Commands::Token(TokenCommand::Parse { amount, decimals }) => {
            println!("{}", parse_token_amount(&amount, decimals)?);
            Ok(())
        }
        Commands::Settings { address } => {
            let store = SettingsStore::open(&config.settings_path);
            println!("Settings for {}", shorten_address(&address.to_string()).bold());
            println!("{}", serde_json::to_string_pretty(&store.user_settings(&address))?);
            if let Some(connector) = store.cached_connector() {
                println!("Cached connector: {}", connector);
            }
            Ok(())
        }
    }
}

fn colored_state(state: ProposalState) -> ColoredString {
    let label = state.to_string();
    match state {
        ProposalState::Active | ProposalState::Pending => label.yellow(),
        s if s.is_passed() => label.green(),
        _ => label.red(),
    }
}

fn show_state(proposal: &Proposal, quorum: u128, now: u64) {
    let state = infer_state_local(proposal, quorum, now);
    debug!("Inferred {:?} at {}", state, now);

    let mut table = Table::new();
    table.add_row(row!["State", colored_state(state)]);
    if now >= proposal.start_time {
        table.add_row(row![
            "Started",
            format!("{} ({})", format_timestamp(proposal.start_time), format_time_diff(proposal.start_time, now, false))
        ]);
    } else {
        table.add_row(row!["Starts", format_timestamp(proposal.start_time)]);
    }
    table.add_row(row!["Ends", format_timestamp(proposal.end_time)]);
    table.add_row(row!["Remaining", format_time_remaining(proposal.end_time, now)]);
    table.add_row(row!["For / Against / Abstain", format!(
        "{} / {} / {}",
        proposal.for_votes, proposal.against_votes, proposal.abstain_votes
    )]);
    table.add_row(row!["Total votes", proposal.total_votes]);
    table.add_row(row!["Quorum", quorum]);
    table.add_row(row!["Approval", format!("{:.2}%", proposal.approval_bps() as f64 / 100.0)]);
    table.printstd();
}

fn print_quote(quote: &QuadraticQuote) {
    let mut table = Table::new();
    table.set_titles(row!["Votes", "Cost", "Weight", "Available", "Remaining", "Affordable"]);
    let affordable = if quote.affordable { "yes".green() } else { "no".red() };
    table.add_row(row![
        quote.votes,
        quote.cost,
        quote.weight,
        quote.available_credits,
        quote.remaining_credits,
        affordable
    ]);
    table.printstd();
}

fn run_quadratic(cmd: QuadraticCommand) -> Result<()> {
    match cmd {
        QuadraticCommand::Cost { votes } => {
            let cost = quadratic::quadratic_cost(votes).ok_or(DaoError::Overflow("quadratic cost"))?;
            println!("{}", cost);
        }
        QuadraticCommand::Weight { cost } => println!("{}", quadratic::quadratic_weight(cost)),
        QuadraticCommand::Max { credits } => println!("{}", quadratic::max_votes(credits)),
        QuadraticCommand::Optimal { credits, proposals } => {
            println!("{}", quadratic::optimal_votes(credits, proposals))
        }
        QuadraticCommand::Quote { votes, credits } => {
            let cost = quadratic::quadratic_cost(votes).ok_or(DaoError::Overflow("quadratic cost"))?;
            let quote = QuadraticQuote::new(votes, cost, quadratic::quadratic_weight(cost), credits);
            print_quote(&quote);
        }
    }
    Ok(())
}

async fn run_ipfs(cmd: IpfsCommand, config: &AppConfig) -> Result<()> {
    match cmd {
        IpfsCommand::Validate { hash } => {
            let normalized = normalize_hash(&hash);
            if is_valid_ipfs_hash(normalized) {
                println!("{} {}", "valid".green().bold(), normalized);
                Ok(())
            } else {
                Err(DaoError::Validation(format!("Not a valid IPFS hash: {}", hash)))
            }
        }
        IpfsCommand::Url { hash } => {
            for gateway in config.ipfs.gateways() {
                println!("{}", get_ipfs_url(&hash, gateway));
            }
            Ok(())
        }
        IpfsCommand::Upload { file } => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| DaoError::Validation(format!("Invalid file name: {}", file.display())))?;
            let bytes = std::fs::read(&file)?;
            let client = IpfsClient::new(config.ipfs.clone())?;
            let result = client.upload_file(&name, bytes).await?;

            let mut table = Table::new();
            table.add_row(row!["Hash", result.hash.green()]);
            table.add_row(row!["URL", result.url]);
            table.add_row(row!["Size", format_file_size(result.size)]);
            table.printstd();
            Ok(())
        }
        IpfsCommand::Fetch { hash, output } => {
            let client = IpfsClient::new(config.ipfs.clone())?;
            let bytes = client.fetch(&hash).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)?;
                    println!("Wrote {} to {}", format_file_size(bytes.len() as u64), path.display());
                }
                None => println!("{}", String::from_utf8_lossy(&bytes)),
            }
            Ok(())
        }
        IpfsCommand::Metadata { hash } => {
            let client = IpfsClient::new(config.ipfs.clone())?;
            let metadata = client.fetch_metadata(&hash).await?;
            println!("{}", metadata.title.bold());
            println!(
                "Created {} ({})",
                format_timestamp(metadata.created_at),
                format_time_diff(metadata.created_at, current_time(), false)
            );
            if let Some(author) = &metadata.author {
                println!("Author {}", author);
            }
            println!();
            println!("{}", metadata.description);
            for attachment in &metadata.attachments {
                println!(
                    "  - {} ({}, {}) {}",
                    attachment.name,
                    attachment.mime_type,
                    format_file_size(attachment.size),
                    client.url_for(&attachment.hash)
                );
            }
            Ok(())
        }
        IpfsCommand::Pin { hash } => {
            let client = IpfsClient::new(config.ipfs.clone())?;
            client.pin_by_hash(&hash).await?;
            println!("{} {}", "pinned".green().bold(), normalize_hash(&hash));
            Ok(())
        }
    }
}

fn run_registry(cmd: RegistryCommand, config: &AppConfig) -> Result<()> {
    match cmd {
        RegistryCommand::Networks => {
            let contracts = config.registry()?;
            let mut table = Table::new();
            table.set_titles(row!["Chain", "Name", "Symbol", "Testnet", "Diamond"]);
            for network in registry::supported_networks() {
                let diamond = contracts
                    .diamond_address(network.chain_id)
                    .map(|a| shorten_address(&a.to_string()))
                    .unwrap_or_else(|| "-".to_string());
                let name = if network.chain_id == config.network.chain_id {
                    network.name.green().bold()
                } else {
                    network.name.normal()
                };
                table.add_row(row![network.chain_id, name, network.currency_symbol, network.testnet, diamond]);
            }
            table.printstd();
        }
        RegistryCommand::Selectors => {
            let mut table = Table::new();
            table.set_titles(row!["Selector", "Kind", "Signature"]);
            for function in GOVERNANCE_ABI {
                table.add_row(row![function.selector_hex(), format!("{:?}", function.kind), function.signature]);
            }
            table.printstd();
        }
        RegistryCommand::Calldata { signature, args } => {
            let tokens = abi::parse_args(&signature, &args)?;
            println!("0x{}", hex::encode(abi::encode_call(&signature, &tokens)?));
        }
    }
    Ok(())
}

fn run_config(cmd: ConfigCommand, config: &AppConfig) -> Result<()> {
    match cmd {
        ConfigCommand::Show => print!("{}", config.to_toml()?),
        ConfigCommand::Init { path } => {
            AppConfig::default().write_new(&path)?;
            println!("{} {}", "created".green().bold(), path.display());
        }
        ConfigCommand::Validate => {
            let result = config.validate();
            let summary = result.get_summary();
            if result.is_valid {
                println!("{}", summary.green());
            } else {
                println!("{}", summary.red());
                return Err(DaoError::Validation("configuration is invalid".to_string()));
            }
        }
    }
    Ok(())
}
