use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};

use crate::domain::{Account, AccountNo, Cents, TransactionRecord};

use super::{LedgerStore, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: BTreeMap<AccountNo, Account>,
    records: Vec<TransactionRecord>,
    next_record_id: i64,
}

/// In-memory ledger store.
///
/// Each unit of work edits a private copy of the ledger and swaps it in on
/// commit, so an abandoned unit leaves no trace.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<LedgerState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<LedgerState> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| anyhow!("Ledger state lock poisoned"))
    }

    fn publish(&self, state: LedgerState) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| anyhow!("Ledger state lock poisoned"))?;
        *guard = state;
        Ok(())
    }
}

impl LedgerStore for MemoryStore {
    type Unit<'a> = MemoryUnit<'a>;

    async fn begin(&self) -> Result<MemoryUnit<'_>> {
        Ok(MemoryUnit {
            store: self,
            working: self.snapshot()?,
        })
    }
}

pub struct MemoryUnit<'a> {
    store: &'a MemoryStore,
    working: LedgerState,
}

impl UnitOfWork for MemoryUnit<'_> {
    async fn get_account(&mut self, account_no: &str) -> Result<Option<Account>> {
        Ok(self.working.accounts.get(account_no).cloned())
    }

    async fn insert_account(&mut self, account: &Account) -> Result<bool> {
        if self.working.accounts.contains_key(&account.account_no) {
            return Ok(false);
        }
        self.working
            .accounts
            .insert(account.account_no.clone(), account.clone());
        Ok(true)
    }

    async fn update_balance(&mut self, account_no: &str, balance: Cents) -> Result<()> {
        if balance < 0 {
            bail!("Balance of {} would become negative", account_no);
        }
        match self.working.accounts.get_mut(account_no) {
            Some(account) => {
                account.balance = balance;
                Ok(())
            }
            None => bail!("Account {} disappeared during update", account_no),
        }
    }

    async fn delete_account(&mut self, account_no: &str) -> Result<bool> {
        Ok(self.working.accounts.remove(account_no).is_some())
    }

    async fn list_accounts(&mut self) -> Result<Vec<Account>> {
        Ok(self.working.accounts.values().cloned().collect())
    }

    async fn log_transaction(&mut self, record: &TransactionRecord) -> Result<i64> {
        self.working.next_record_id += 1;
        let id = self.working.next_record_id;
        self.working.records.push(TransactionRecord {
            id,
            ..record.clone()
        });
        Ok(id)
    }

    async fn transaction_history(&mut self, account_no: &str) -> Result<Vec<TransactionRecord>> {
        Ok(self
            .working
            .records
            .iter()
            .filter(|r| r.account_no == account_no)
            .cloned()
            .collect())
    }

    async fn has_history(&mut self, account_no: &str) -> Result<bool> {
        Ok(self
            .working
            .records
            .iter()
            .any(|r| r.account_no == account_no))
    }

    async fn commit(self) -> Result<()> {
        self.store.publish(self.working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountType;

    fn sample_account(account_no: &str, balance: Cents) -> Account {
        Account::new(account_no, "Holder", "h@example.com", "555", balance, AccountType::Savings)
    }

    #[tokio::test]
    async fn test_committed_unit_is_visible() -> Result<()> {
        let store = MemoryStore::new();

        let mut unit = store.begin().await?;
        assert!(unit.insert_account(&sample_account("A", 100)).await?);
        unit.log_transaction(&TransactionRecord::opening("A", 100)).await?;
        unit.commit().await?;

        let mut unit = store.begin().await?;
        assert_eq!(unit.get_account("A").await?.map(|a| a.balance), Some(100));
        assert_eq!(unit.transaction_history("A").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_dropped_unit_leaves_no_trace() -> Result<()> {
        let store = MemoryStore::new();
        {
            let mut unit = store.begin().await?;
            unit.insert_account(&sample_account("A", 100)).await?;
            unit.log_transaction(&TransactionRecord::opening("A", 100)).await?;
        }

        let mut unit = store.begin().await?;
        assert!(unit.get_account("A").await?.is_none());
        assert!(unit.transaction_history("A").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_refused() -> Result<()> {
        let store = MemoryStore::new();
        let mut unit = store.begin().await?;
        assert!(unit.insert_account(&sample_account("A", 100)).await?);
        assert!(!unit.insert_account(&sample_account("A", 999)).await?);
        assert_eq!(unit.get_account("A").await?.map(|a| a.balance), Some(100));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_ids_increase() -> Result<()> {
        let store = MemoryStore::new();
        let mut unit = store.begin().await?;
        let first = unit.log_transaction(&TransactionRecord::deposit("A", 1)).await?;
        let second = unit.log_transaction(&TransactionRecord::deposit("A", 2)).await?;
        assert!(second > first);
        Ok(())
    }

    #[tokio::test]
    async fn test_has_history_sees_records_of_deleted_accounts() -> Result<()> {
        let store = MemoryStore::new();
        let mut unit = store.begin().await?;
        assert!(!unit.has_history("A").await?);

        unit.insert_account(&sample_account("A", 100)).await?;
        unit.log_transaction(&TransactionRecord::opening("A", 100)).await?;
        unit.delete_account("A").await?;

        assert!(unit.has_history("A").await?);
        assert!(!unit.has_history("B").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_unknown_account_fails() -> Result<()> {
        let store = MemoryStore::new();
        let mut unit = store.begin().await?;
        assert!(unit.update_balance("missing", 10).await.is_err());
        Ok(())
    }
}
