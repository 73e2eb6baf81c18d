use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use household_ledger_lib::{
    balance_table_csv, settlement_csv, Error, ErrorKind, ExpenseDraft, HouseholdService,
    JsonFileStore,
};
use serde::Serialize;
use thiserror::Error;

mod settings;

#[derive(Debug, Parser)]
#[command(name = "household-ledger")]
#[command(about = "Track shared household expenses and work out who owes whom")]
struct Cli {
    /// Settings file, defaults to `household.toml` when present
    #[arg(long, global = true, env = "HOUSEHOLD_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List households and their members
    List,
    /// Create a household; every member starts with a zero balance
    Create {
        name: String,
        #[arg(required = true)]
        members: Vec<String>,
    },
    /// Record an expense paid by one member and split among participants
    Add {
        household: String,
        #[arg(long)]
        payer: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, num_args = 1.., required = true)]
        participants: Vec<String>,
    },
    /// Delete the expense at a journal position and reverse its balances
    Delete { household: String, index: usize },
    /// Show balances, settlement transactions and recent expenses
    Balances {
        household: String,
        /// Print the balance table and settlement as CSV
        #[arg(long)]
        csv: bool,
    },
    /// Show whom a member owes and who owes them
    Member { household: String, member: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Household(#[from] Error),
    #[error("failed to render output: {0}")]
    Render(String),
}

impl CliError {
    fn kind(&self) -> ErrorKind {
        match self {
            CliError::Household(e) => e.kind(),
            CliError::Render(_) => ErrorKind::Internal,
        }
    }

    fn public_message(&self) -> String {
        match self {
            CliError::Household(e) => e.public_message(),
            CliError::Render(_) => String::from("An internal error occurred"),
        }
    }
}

fn json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))
}

fn run(service: &HouseholdService<JsonFileStore>, command: Command) -> Result<String, CliError> {
    match command {
        Command::List => json(&service.list_households()?),
        Command::Create { name, members } => json(&service.create_household(&name, &members)?),
        Command::Add {
            household,
            payer,
            amount,
            description,
            participants,
        } => {
            let draft = ExpenseDraft {
                payer,
                description,
                amount,
                participants,
            };
            json(&service.add_expense(&household, &draft)?)
        }
        Command::Delete { household, index } => json(&service.delete_expense(&household, index)?),
        Command::Balances { household, csv } => {
            let report = service.balances(&household)?;
            if csv {
                let table = balance_table_csv(&report.balances)
                    .map_err(|e| CliError::Render(e.to_string()))?;
                let plan = settlement_csv(&report.transactions)
                    .map_err(|e| CliError::Render(e.to_string()))?;
                Ok(format!("{table}\n{plan}"))
            } else {
                json(&report)
            }
        }
        Command::Member { household, member } => {
            json(&service.member_balances(&household, &member)?)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let settings = match settings::Settings::new(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "household_ledger_lib={level},household_ledger_bin={level}",
            level = settings.log_level
        ))
        .init();

    let service = HouseholdService::new(JsonFileStore::new(&settings.data_file))
        .with_recent_expenses(settings.recent_expenses);

    match run(&service, cli.command) {
        Ok(output) => {
            println!("{output}");
            process::exit(0);
        }
        Err(e) => {
            if e.kind() == ErrorKind::Internal {
                tracing::error!(error = %e, "command failed");
            }
            eprintln!("{}", e.public_message());
            process::exit(e.kind().exit_code());
        }
    }
}
