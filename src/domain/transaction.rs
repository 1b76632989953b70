use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountNo, Cents, format_cents};

/// Store-assigned, increases with every write.
pub type RecordId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    /// Used for both legs of a transfer; the description carries the direction
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::Transfer => "TRANSFER",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "WITHDRAWAL" => Ok(TransactionKind::Withdrawal),
            "TRANSFER" => Ok(TransactionKind::Transfer),
            other => Err(format!("unknown transaction kind '{}'", other)),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An audit entry for one balance change on one account.
/// Records are append-only: they outlive the account they reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: RecordId,
    pub account_no: AccountNo,
    pub kind: TransactionKind,
    pub amount: Cents,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record stamped with the current time. The id is assigned by the store.
    pub fn new(
        account_no: impl Into<AccountNo>,
        kind: TransactionKind,
        amount: Cents,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            account_no: account_no.into(),
            kind,
            amount,
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn opening(account_no: &str, amount: Cents) -> Self {
        Self::new(account_no, TransactionKind::Deposit, amount, "Initial deposit")
    }

    pub fn deposit(account_no: &str, amount: Cents) -> Self {
        Self::new(account_no, TransactionKind::Deposit, amount, "Cash deposit")
    }

    pub fn withdrawal(account_no: &str, amount: Cents) -> Self {
        Self::new(account_no, TransactionKind::Withdrawal, amount, "Cash withdrawal")
    }

    /// The two legs of a transfer: (source record, destination record).
    pub fn transfer_pair(from: &str, to: &str, amount: Cents) -> (Self, Self) {
        (
            Self::new(from, TransactionKind::Transfer, amount, format!("Transfer to {}", to)),
            Self::new(to, TransactionKind::Transfer, amount, format!("Transfer from {}", from)),
        )
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:<10} | {:>12} | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            format_cents(self.amount),
            self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("DEPOSIT".parse(), Ok(TransactionKind::Deposit));
        assert_eq!("WITHDRAWAL".parse(), Ok(TransactionKind::Withdrawal));
        assert_eq!("TRANSFER".parse(), Ok(TransactionKind::Transfer));
        assert!("deposit".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_transfer_pair_tags_counterparty() {
        let (out, incoming) = TransactionRecord::transfer_pair("A-1", "B-2", 3000);

        assert_eq!(out.account_no, "A-1");
        assert_eq!(out.kind, TransactionKind::Transfer);
        assert_eq!(out.description, "Transfer to B-2");

        assert_eq!(incoming.account_no, "B-2");
        assert_eq!(incoming.kind, TransactionKind::Transfer);
        assert_eq!(incoming.description, "Transfer from A-1");

        assert_eq!(out.amount, 3000);
        assert_eq!(incoming.amount, 3000);
    }

    #[test]
    fn test_cash_records_descriptions() {
        assert_eq!(TransactionRecord::opening("A", 100).description, "Initial deposit");
        assert_eq!(TransactionRecord::deposit("A", 100).description, "Cash deposit");
        let w = TransactionRecord::withdrawal("A", 100);
        assert_eq!(w.kind, TransactionKind::Withdrawal);
        assert_eq!(w.description, "Cash withdrawal");
    }

    #[test]
    fn test_kind_honours_width() {
        assert_eq!(format!("{:<10}", TransactionKind::Deposit), "DEPOSIT   ");
        assert_eq!(format!("{:>10}", TransactionKind::Transfer), "  TRANSFER");
    }

    #[test]
    fn test_record_rows_line_up() {
        let deposit = TransactionRecord::deposit("A", 100).to_string();
        let withdrawal = TransactionRecord::withdrawal("A", 123456).to_string();
        let column = |row: &str| row.match_indices('|').map(|(i, _)| i).collect::<Vec<_>>();
        assert_eq!(column(&deposit), column(&withdrawal));
    }

    #[test]
    fn test_serializes_kind_uppercase() {
        let json = serde_json::to_string(&TransactionKind::Withdrawal).unwrap();
        assert_eq!(json, "\"WITHDRAWAL\"");
    }
}
