use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::BankService;
use crate::domain::{Account, TransactionRecord, format_cents};
use crate::storage::LedgerStore;

/// Statement of one account's history for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStatement {
    pub account_no: String,
    pub exported_at: DateTime<Utc>,
    pub records: Vec<TransactionRecord>,
}

/// Exporter for converting ledger data to CSV or JSON
pub struct Exporter<'a, S> {
    service: &'a BankService<S>,
}

impl<'a, S: LedgerStore> Exporter<'a, S> {
    pub fn new(service: &'a BankService<S>) -> Self {
        Self { service }
    }

    /// Export all accounts to CSV format
    pub async fn export_accounts_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let accounts = self.service.list_all_accounts().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "account_no",
            "holder_name",
            "email",
            "phone",
            "account_type",
            "balance",
            "opened_at",
        ])?;

        for account in &accounts {
            csv_writer.write_record([
                account.account_no.clone(),
                account.holder_name.clone(),
                account.email.clone(),
                account.phone.clone(),
                account.account_type.to_string(),
                format_cents(account.balance),
                account.opened_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(accounts.len())
    }

    /// Export all accounts as a JSON array
    pub async fn export_accounts_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let accounts: Vec<Account> = self.service.list_all_accounts().await?;
        serde_json::to_writer_pretty(&mut writer, &accounts)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(accounts.len())
    }

    /// Export one account's transaction history to CSV format
    pub async fn export_history_csv<W: Write>(&self, account_no: &str, writer: W) -> Result<usize> {
        let records = self.service.transaction_history(account_no).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "timestamp", "kind", "amount", "description"])?;

        for record in &records {
            csv_writer.write_record([
                record.id.to_string(),
                record.timestamp.to_rfc3339(),
                record.kind.to_string(),
                format_cents(record.amount),
                record.description.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(records.len())
    }

    /// Export one account's transaction history as a JSON statement
    pub async fn export_history_json<W: Write>(
        &self,
        account_no: &str,
        mut writer: W,
    ) -> Result<usize> {
        let statement = HistoryStatement {
            account_no: account_no.to_string(),
            exported_at: Utc::now(),
            records: self.service.transaction_history(account_no).await?,
        };
        serde_json::to_writer_pretty(&mut writer, &statement)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(statement.records.len())
    }
}
