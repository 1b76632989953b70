use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::error;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::application::{BankError, BankService, NewAccount};
use crate::domain::{AccountType, format_cents, parse_amount};
use crate::io::Exporter;
use crate::storage::SqliteStore;

/// Bankledger - accounts, deposits, withdrawals and transfers
#[derive(Parser)]
#[command(name = "bankledger")]
#[command(about = "A small banking ledger backed by SQLite")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "BANKLEDGER_DATABASE", default_value = "bankledger.db")]
    pub database: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Open a new account
    Open {
        /// Account number (must be unique)
        account_no: String,

        /// Account holder name
        #[arg(short, long)]
        name: String,

        /// Contact email
        #[arg(short, long)]
        email: String,

        /// Contact phone number
        #[arg(short, long)]
        phone: String,

        /// Account type: savings, checking
        #[arg(short = 't', long = "type")]
        account_type: String,

        /// Initial deposit (e.g., "100.00" or "100")
        #[arg(long, default_value = "0")]
        deposit: String,
    },

    /// Deposit money into an account
    Deposit {
        account_no: String,

        /// Amount to deposit (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Withdraw money from an account
    Withdraw {
        account_no: String,

        /// Amount to withdraw (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Transfer money between two accounts
    Transfer {
        /// Amount to transfer (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Source account number
        #[arg(long)]
        from: String,

        /// Destination account number
        #[arg(long)]
        to: String,
    },

    /// Show the balance of an account
    Balance { account_no: String },

    /// Delete an account (its history is kept)
    Close { account_no: String },

    /// List all accounts
    Accounts,

    /// Show the transaction history of an account
    History { account_no: String },

    /// Export data to CSV or JSON
    Export {
        /// What to export: accounts, history
        export_type: String,

        /// Account number (required for history)
        #[arg(short, long)]
        account: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let service = match self.command {
            Commands::Init => BankService::init(&self.database).await?,
            _ => BankService::connect(&self.database)
                .await
                .with_context(|| {
                    format!("Cannot open '{}'. Run 'bankledger init' first", self.database)
                })?,
        };

        let outcome = run_command(&service, &self.database, self.command).await;
        service.store().close().await;
        outcome.map_err(report_failure)
    }
}

/// Rule rejections are reported as such; anything else is a store failure
/// and gets logged before it reaches `main`.
fn report_failure(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<BankError>() {
        Some(rejection) if rejection.is_rejection() => {
            anyhow::anyhow!("Operation rejected: {}", rejection)
        }
        _ => {
            error!(error = %err, "operation failed");
            err
        }
    }
}

async fn run_command(
    service: &BankService<SqliteStore>,
    database: &str,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Database initialized: {}", database);
        }

        Commands::Open {
            account_no,
            name,
            email,
            phone,
            account_type,
            deposit,
        } => {
            let account_type: AccountType = account_type.parse().map_err(|e| {
                anyhow::anyhow!("{}. Valid types: savings, checking", e)
            })?;
            let initial_deposit = parse_amount(&deposit)?;

            let account = service
                .create_account(NewAccount {
                    account_no,
                    holder_name: name,
                    email,
                    phone,
                    initial_deposit,
                    account_type,
                })
                .await?;
            println!(
                "Account created: {} ({}, balance {})",
                account.account_no,
                account.account_type,
                format_cents(account.balance)
            );
        }

        Commands::Deposit { account_no, amount } => {
            let amount = parse_amount(&amount)?;
            let balance = service.deposit(&account_no, amount).await?;
            println!(
                "Deposited {} | New Balance: {}",
                format_cents(amount),
                format_cents(balance)
            );
        }

        Commands::Withdraw { account_no, amount } => {
            let amount = parse_amount(&amount)?;
            let balance = service.withdraw(&account_no, amount).await?;
            println!(
                "Withdrawn {} | New Balance: {}",
                format_cents(amount),
                format_cents(balance)
            );
        }

        Commands::Transfer { amount, from, to } => {
            let amount = parse_amount(&amount)?;
            let receipt = service.transfer(&from, &to, amount).await?;
            println!(
                "Transferred {} from {} to {}",
                format_cents(receipt.amount),
                receipt.from_account,
                receipt.to_account
            );
        }

        Commands::Balance { account_no } => {
            let account = service.check_balance(&account_no).await?;
            println!(
                "Balance for {} ({}): {}",
                account.holder_name,
                account.account_no,
                format_cents(account.balance)
            );
        }

        Commands::Close { account_no } => {
            if service.delete_account(&account_no).await? {
                println!("Account deleted.");
            } else {
                println!("Account not found.");
            }
        }

        Commands::Accounts => {
            let accounts = service.list_all_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                for account in accounts {
                    println!("{}\n", account);
                }
            }
        }

        Commands::History { account_no } => {
            let records = service.transaction_history(&account_no).await?;
            if records.is_empty() {
                println!("No transactions found for {}.", account_no);
            } else {
                println!("Transaction history for {}", account_no);
                println!(
                    "{:<19} | {:<10} | {:>12} | {}",
                    "TIMESTAMP", "KIND", "AMOUNT", "DESCRIPTION"
                );
                println!("{}", "-".repeat(64));
                for record in records {
                    println!("{}", record);
                }
            }
        }

        Commands::Export {
            export_type,
            account,
            output,
            format,
        } => {
            run_export_command(service, &export_type, account, output, &format).await?;
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &BankService<SqliteStore>,
    export_type: &str,
    account: Option<String>,
    output: Option<String>,
    format: &str,
) -> Result<()> {
    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let exporter = Exporter::new(service);
    let count = match (export_type, format) {
        ("accounts", "csv") => exporter.export_accounts_csv(writer).await?,
        ("accounts", "json") => exporter.export_accounts_json(writer).await?,
        ("history", format) => {
            let account_no = account.context("--account is required for history export")?;
            match format {
                "csv" => exporter.export_history_csv(&account_no, writer).await?,
                "json" => exporter.export_history_json(&account_no, writer).await?,
                other => bail!("Unknown format '{}'. Use csv or json", other),
            }
        }
        ("accounts", other) => bail!("Unknown format '{}'. Use csv or json", other),
        (other, _) => bail!("Unknown export type '{}'. Use accounts or history", other),
    };

    if let Some(path) = output {
        println!("Exported {} record(s) to {}", count, path);
    }
    Ok(())
}
