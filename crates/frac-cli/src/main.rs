use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "frac")]
#[command(about = "Fractional share purchase CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> override...)
        #[arg(required = true)]
        paths: Vec<String>,

        /// Fail instead of warning when config carries keys nothing reads.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Evaluate a purchase request against a ledger JSON file (no chain access)
    Evaluate {
        /// RawLedger JSON (holders, shares, total_shares, creator, current_owner, share_price_wei)
        #[arg(long)]
        ledger: String,

        /// Buyer address
        #[arg(long)]
        buyer: String,

        /// Buyer's spendable balance in wei
        #[arg(long)]
        balance_wei: u128,

        /// Requested share count (zero or negative is reported as invalid)
        #[arg(long, allow_negative_numbers = true)]
        shares: i64,
    },

    /// Run a full purchase flow against an in-memory chain
    #[cfg(feature = "testkit")]
    Simulate {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Initial RawLedger JSON for the in-memory chain
        #[arg(long)]
        ledger: String,

        /// Buyer's starting balance in wei
        #[arg(long)]
        balance_wei: u128,

        /// Requested share count
        #[arg(long, allow_negative_numbers = true)]
        shares: i64,

        /// Make the purchase transaction revert with this reason
        #[arg(long)]
        revert: Option<String>,

        /// Keep full consolidation from moving contract and NFT ownership
        #[arg(long, default_value_t = false)]
        suppress_transfer: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience).
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths, strict } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            commands::config_hash(&path_refs, strict)?;
        }

        Commands::Evaluate {
            ledger,
            buyer,
            balance_wei,
            shares,
        } => {
            commands::evaluate::run(&ledger, &buyer, balance_wei, shares)?;
        }

        #[cfg(feature = "testkit")]
        Commands::Simulate {
            config_paths,
            ledger,
            balance_wei,
            shares,
            revert,
            suppress_transfer,
        } => {
            let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
            commands::simulate::run(commands::simulate::SimulateArgs {
                config_paths: &path_refs,
                ledger_path: &ledger,
                balance_wei,
                shares,
                revert,
                suppress_transfer,
            })
            .await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
