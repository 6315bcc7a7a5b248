//! CLI entry point for the sleevebook rebalancer.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use sleevebook::{AddAsset, AssetType, RebalanceMode, Ticker};
use sleevebook_rebalancer::commands::{self, RunOptions, StrategyCommand};
use sleevebook_rebalancer::config::{
    Config, ConfigPaths, DEFAULT_ACCOUNTS_PATH, DEFAULT_POLICY_PATH, DEFAULT_UNIVERSE_PATH,
};
use sleevebook_rebalancer::error::Error;
use sleevebook_rebalancer::store::{DEFAULT_STORE_PATH, FileTargetStore};

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Tax-aware portfolio planner: init, rebalance and growth-sleeve edits")]
#[command(version)]
struct Cli {
    /// Path to policy.toml
    #[arg(long, global = true, default_value = DEFAULT_POLICY_PATH)]
    policy: PathBuf,

    /// Path to accounts.toml
    #[arg(long, global = true, default_value = DEFAULT_ACCOUNTS_PATH)]
    accounts: PathBuf,

    /// Path to universe.toml
    #[arg(long, global = true, default_value = DEFAULT_UNIVERSE_PATH)]
    universe: PathBuf,

    /// Where target overrides are saved
    #[arg(long, global = true, default_value = DEFAULT_STORE_PATH)]
    targets_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan the initial funding of empty accounts
    Init {
        /// Total dollars to invest
        #[arg(long)]
        total: f64,

        /// Cash per account as id=amount (repeatable)
        #[arg(long = "account-cash", value_name = "ID=AMOUNT")]
        account_cash: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Show the reason for each trade
        #[arg(long)]
        explain: bool,
    },

    /// Recommend trades to bring drifted holdings back to target
    Rebalance {
        /// strict or conservative
        #[arg(long, default_value = "strict")]
        mode: RebalanceMode,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Show the reason for each trade
        #[arg(long)]
        explain: bool,
    },

    /// Inspect or edit the growth sleeve
    Strategy {
        #[command(subcommand)]
        action: StrategyAction,
    },
}

#[derive(Subcommand)]
enum StrategyAction {
    /// Show the growth-sleeve composition
    Show,

    /// Add a growth position, or resize an existing one
    Add {
        #[arg(long)]
        ticker: Ticker,

        /// Target weight as a fraction (0.05 = 5%)
        #[arg(long)]
        weight: f64,

        #[arg(long, value_enum, default_value = "stock")]
        asset_type: AssetTypeArg,

        #[command(flatten)]
        save: SaveFlags,
    },

    /// Remove a growth position
    Remove {
        #[arg(long)]
        ticker: Ticker,

        #[command(flatten)]
        save: SaveFlags,
    },

    /// Move weight from one growth position to another
    Rotate {
        #[arg(long)]
        from: Ticker,

        #[arg(long)]
        to: Ticker,

        /// Weight to move as a fraction
        #[arg(long)]
        weight: f64,

        #[command(flatten)]
        save: SaveFlags,
    },
}

#[derive(clap::Args)]
struct SaveFlags {
    /// Show the edit without saving
    #[arg(long)]
    dry_run: bool,

    /// Skip confirmation prompt
    #[arg(long)]
    force: bool,
}

impl SaveFlags {
    fn options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            force: self.force,
            ..RunOptions::default()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AssetTypeArg {
    Stock,
    Etf,
}

impl From<AssetTypeArg> for AssetType {
    fn from(arg: AssetTypeArg) -> Self {
        match arg {
            AssetTypeArg::Stock => AssetType::Stock,
            AssetTypeArg::Etf => AssetType::Etf,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let paths = ConfigPaths {
        policy: cli.policy,
        accounts: cli.accounts,
        universe: cli.universe,
    };
    let config = match Config::load(&paths) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };
    let mut store = FileTargetStore::new(cli.targets_file);

    let result = match cli.command {
        Command::Init {
            total,
            account_cash,
            json,
            explain,
        } => {
            let opts = RunOptions {
                json,
                explain,
                ..RunOptions::default()
            };
            let cash = if account_cash.is_empty() {
                Ok(None)
            } else {
                commands::parse_account_cash(&account_cash).map(Some)
            };
            cash.and_then(|cash| commands::run_init(&config, &store, total, cash, &opts))
                .map(drop)
        }
        Command::Rebalance {
            mode,
            json,
            explain,
        } => {
            let opts = RunOptions {
                json,
                explain,
                ..RunOptions::default()
            };
            commands::run_rebalance(&config, &store, mode, &opts).map(drop)
        }
        Command::Strategy { action } => {
            let (command, opts) = match action {
                StrategyAction::Show => {
                    let result = commands::strategy_show(&config, &store).map(drop);
                    exit_on_error(result);
                    return;
                }
                StrategyAction::Add {
                    ticker,
                    weight,
                    asset_type,
                    save,
                } => (
                    StrategyCommand::Add(AddAsset::new(ticker, weight).asset_type(asset_type.into())),
                    save.options(),
                ),
                StrategyAction::Remove { ticker, save } => {
                    (StrategyCommand::Remove(ticker), save.options())
                }
                StrategyAction::Rotate {
                    from,
                    to,
                    weight,
                    save,
                } => (StrategyCommand::Rotate { from, to, weight }, save.options()),
            };
            commands::run_strategy(&config, &mut store, &command, &opts).map(drop)
        }
    };

    exit_on_error(result);
}

fn exit_on_error(result: sleevebook_rebalancer::error::Result<()>) {
    if let Err(e) = result {
        match &e {
            Error::ChecksFailed(msg) => {
                eprintln!("\nPlan rejected: {msg}");
                process::exit(2);
            }
            Error::Aborted(msg) => {
                eprintln!("Aborted: {msg}");
                process::exit(0);
            }
            Error::Strategy(err) => {
                eprintln!("Strategy error: {err}");
                process::exit(2);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
