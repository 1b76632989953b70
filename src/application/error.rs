use thiserror::Error;

use crate::domain::{AccountNo, Cents, format_cents};

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountNo),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(AccountNo),

    #[error("Account number {0} belonged to a deleted account and cannot be reused")]
    AccountNumberRetired(AccountNo),

    #[error("Invalid account number: {0:?}")]
    InvalidAccountNumber(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error(
        "Insufficient balance in account {account_no}: balance {}, required {}",
        decimal(.balance),
        decimal(.required)
    )]
    InsufficientFunds {
        account_no: AccountNo,
        balance: Cents,
        required: Cents,
    },

    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(AccountNo),

    #[error("Database error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

fn decimal(cents: &Cents) -> String {
    format_cents(*cents)
}

impl BankError {
    /// True when the operation was refused by a business rule rather than
    /// failing in the store.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, BankError::Storage(_))
    }
}
