//! Persistence port for the ledger.
//!
//! Business rules talk to storage only through these two traits. A
//! [`UnitOfWork`] is one transactional scope: everything written through it
//! becomes visible on [`UnitOfWork::commit`], and dropping it without
//! committing discards those writes.

use anyhow::Result;

use crate::domain::{Account, Cents, TransactionRecord};

/// A store that can open units of work.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    type Unit<'a>: UnitOfWork
    where
        Self: 'a;

    /// Open a new unit of work.
    async fn begin(&self) -> Result<Self::Unit<'_>>;
}

/// Data operations available inside a unit of work.
#[allow(async_fn_in_trait)]
pub trait UnitOfWork {
    async fn get_account(&mut self, account_no: &str) -> Result<Option<Account>>;

    /// Insert a new account. Returns `false` if the account number is taken.
    async fn insert_account(&mut self, account: &Account) -> Result<bool>;

    /// Overwrite the stored balance of an existing account.
    async fn update_balance(&mut self, account_no: &str, balance: Cents) -> Result<()>;

    /// Remove an account. Returns `false` if it did not exist.
    async fn delete_account(&mut self, account_no: &str) -> Result<bool>;

    /// All accounts, ordered by account number.
    async fn list_accounts(&mut self) -> Result<Vec<Account>>;

    /// Append a record, returning the id the store assigned to it.
    async fn log_transaction(&mut self, record: &TransactionRecord) -> Result<i64>;

    /// Records for one account in write order.
    async fn transaction_history(&mut self, account_no: &str) -> Result<Vec<TransactionRecord>>;

    /// True if any record was ever written for this account number,
    /// including records of a deleted account.
    async fn has_history(&mut self, account_no: &str) -> Result<bool>;

    /// Make every write of this unit durable.
    async fn commit(self) -> Result<()>;
}
