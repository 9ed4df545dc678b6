//! Command line front end for the expense ledger.
use std::{
    fs::File,
    io::{self, BufWriter},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use expense_core::{constants::DEFAULT_LEDGER_FILE, LedgerError};
use expense_storage::open_ledger;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod render;
mod report;

#[derive(Parser, Debug)]
#[command(name = "expense")]
#[command(about = "Record expenses in a tamper-evident, hash-chained ledger")]
struct Cli {
    /// Ledger file
    #[arg(long, global = true, env = "EXPENSE_LEDGER", default_value = DEFAULT_LEDGER_FILE)]
    ledger: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record one expense in a new block
    Add {
        /// User id (e.g. john123)
        #[arg(long)]
        user: String,
        /// Date as YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Food, Transportation, Entertainment or Others
        #[arg(long)]
        category: String,
        /// Amount spent
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show every block in the ledger
    Blocks {
        #[arg(long)]
        json: bool,
    },
    /// List recorded transactions
    Transactions {
        /// Only this user's transactions
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List distinct user ids
    Users,
    /// Totals per user and category
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Export transactions as CSV
    Export {
        #[arg(long)]
        user: Option<String>,
        /// Output file, stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Check every hash and link in the chain
    Verify,
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Distinct exit status per failure kind, so scripts can tell them apart.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<LedgerError>() {
        Some(LedgerError::Validation(_)) => 2,
        Some(LedgerError::Persistence { .. }) => 3,
        Some(LedgerError::CorruptLedger { .. }) => 4,
        Some(LedgerError::Integrity(_)) => 5,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    let ledger = open_ledger(&cli.ledger)
        .with_context(|| format!("opening ledger {}", cli.ledger.display()))?;

    match cli.cmd {
        Command::Add {
            user,
            date,
            category,
            amount,
            description,
        } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive().to_string());
            let block = ledger.append_transaction(&user, &date, &category, amount, &description)?;
            info!(index = block.index(), "expense recorded");
            println!("recorded in block #{} ({})", block.index(), block.hash());
        }
        Command::Blocks { json } => {
            let blocks = ledger.list_blocks();
            if json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else {
                print!("{}", render::blocks(&blocks));
            }
        }
        Command::Transactions { user, json } => {
            let txs = ledger.list_transactions();
            let rows = report::filter_by_user(&txs, user.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{}", render::transactions(rows));
            }
        }
        Command::Users => {
            for user in report::users(&ledger.list_transactions()) {
                println!("{user}");
            }
        }
        Command::Summary { json } => {
            let totals = report::summarize(&ledger.list_transactions());
            if json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else {
                println!("{}", render::summary(&totals));
            }
        }
        Command::Export { user, output } => {
            let txs = ledger.list_transactions();
            let rows = report::filter_by_user(&txs, user.as_deref());
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    report::write_csv(BufWriter::new(file), rows)?;
                    info!(path = %path.display(), "csv exported");
                }
                None => report::write_csv(io::stdout().lock(), rows)?,
            }
        }
        Command::Verify => {
            ledger.verify().map_err(LedgerError::from)?;
            println!("ok ({} blocks)", ledger.len());
        }
    }
    Ok(())
}
