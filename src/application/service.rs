use tracing::{debug, info, warn};

use crate::domain::{Account, AccountType, Cents, TransactionRecord};
use crate::storage::{LedgerStore, SqliteStore, UnitOfWork};

use super::BankError;

/// Application service enforcing the ledger's business rules.
/// This is the primary interface for any client (CLI, tests, ...).
pub struct BankService<S> {
    store: S,
}

/// Details of a new account to open.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account_no: String,
    pub holder_name: String,
    pub email: String,
    pub phone: String,
    pub initial_deposit: Cents,
    pub account_type: AccountType,
}

/// Result of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from_account: String,
    pub to_account: String,
    pub amount: Cents,
    pub from_balance: Cents,
    pub to_balance: Cents,
}

impl BankService<SqliteStore> {
    /// Create the database at the given path if needed and bring its schema up to date.
    pub async fn init(database_path: &str) -> Result<Self, BankError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let store = SqliteStore::init(&db_url).await?;
        Ok(Self::new(store))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, BankError> {
        let db_url = format!("sqlite:{}", database_path);
        let store = SqliteStore::connect(&db_url).await?;
        Ok(Self::new(store))
    }
}

impl<S: LedgerStore> BankService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================
    // Account lifecycle
    // ========================

    /// Open an account funded with its initial deposit.
    pub async fn create_account(&self, new: NewAccount) -> Result<Account, BankError> {
        if new.account_no.trim().is_empty() {
            warn!("rejected account with blank number");
            return Err(BankError::InvalidAccountNumber(new.account_no));
        }
        if new.initial_deposit < 0 {
            warn!(account_no = %new.account_no, "rejected negative initial deposit");
            return Err(BankError::InvalidAmount(
                "Initial deposit cannot be negative".to_string(),
            ));
        }

        let account = Account::new(
            new.account_no,
            new.holder_name,
            new.email,
            new.phone,
            new.initial_deposit,
            new.account_type,
        );

        let mut unit = self.store.begin().await?;
        let taken = unit.get_account(&account.account_no).await?.is_some();
        if !taken && unit.has_history(&account.account_no).await? {
            // Records outlive their account, so a used number stays retired
            warn!(account_no = %account.account_no, "account number belonged to a deleted account");
            return Err(BankError::AccountNumberRetired(account.account_no));
        }
        if taken || !unit.insert_account(&account).await? {
            warn!(account_no = %account.account_no, "account number already taken");
            return Err(BankError::AccountAlreadyExists(account.account_no));
        }
        unit.log_transaction(&TransactionRecord::opening(
            &account.account_no,
            account.balance,
        ))
        .await?;
        unit.commit().await?;

        info!(
            account_no = %account.account_no,
            balance = account.balance,
            "account created"
        );
        Ok(account)
    }

    /// Delete an account. Returns `false` if there was nothing to delete.
    pub async fn delete_account(&self, account_no: &str) -> Result<bool, BankError> {
        let mut unit = self.store.begin().await?;
        let existed = unit.delete_account(account_no).await?;
        unit.commit().await?;

        if existed {
            info!(account_no, "account deleted");
        } else {
            debug!(account_no, "delete requested for unknown account");
        }
        Ok(existed)
    }

    // ========================
    // Balance operations
    // ========================

    /// Add money to an account. Returns the new balance.
    pub async fn deposit(&self, account_no: &str, amount: Cents) -> Result<Cents, BankError> {
        let mut unit = self.store.begin().await?;
        let account = Self::require_account(&mut unit, account_no).await?;
        Self::require_positive(amount)?;

        let new_balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| BankError::InvalidAmount("Balance would overflow".to_string()))?;

        unit.update_balance(account_no, new_balance).await?;
        unit.log_transaction(&TransactionRecord::deposit(account_no, amount))
            .await?;
        unit.commit().await?;

        info!(account_no, amount, new_balance, "deposit booked");
        Ok(new_balance)
    }

    /// Take money out of an account. Returns the new balance.
    pub async fn withdraw(&self, account_no: &str, amount: Cents) -> Result<Cents, BankError> {
        let mut unit = self.store.begin().await?;
        let account = Self::require_account(&mut unit, account_no).await?;
        Self::require_positive(amount)?;
        Self::require_funds(&account, amount)?;

        let new_balance = account.balance - amount;
        unit.update_balance(account_no, new_balance).await?;
        unit.log_transaction(&TransactionRecord::withdrawal(account_no, amount))
            .await?;
        unit.commit().await?;

        info!(account_no, amount, new_balance, "withdrawal booked");
        Ok(new_balance)
    }

    /// Look up an account for its holder and current balance.
    pub async fn check_balance(&self, account_no: &str) -> Result<Account, BankError> {
        let mut unit = self.store.begin().await?;
        Self::require_account(&mut unit, account_no).await
    }

    // ========================
    // Transfer
    // ========================

    /// Move money between two accounts in one unit of work.
    ///
    /// Both balance updates and both TRANSFER records are committed together;
    /// returning early on any error drops the unit, which rolls everything back.
    pub async fn transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: Cents,
    ) -> Result<TransferReceipt, BankError> {
        if from_account == to_account {
            warn!(account_no = from_account, "rejected transfer to same account");
            return Err(BankError::SameAccount(from_account.to_string()));
        }

        let mut unit = self.store.begin().await?;
        debug!(from_account, to_account, amount, "transfer unit opened");

        let source = Self::require_account(&mut unit, from_account).await?;
        let destination = Self::require_account(&mut unit, to_account).await?;
        Self::require_positive(amount)?;
        Self::require_funds(&source, amount)?;

        let from_balance = source.balance - amount;
        let to_balance = destination
            .balance
            .checked_add(amount)
            .ok_or_else(|| BankError::InvalidAmount("Balance would overflow".to_string()))?;

        unit.update_balance(from_account, from_balance).await?;
        unit.update_balance(to_account, to_balance).await?;

        let (outgoing, incoming) = TransactionRecord::transfer_pair(from_account, to_account, amount);
        unit.log_transaction(&outgoing).await?;
        unit.log_transaction(&incoming).await?;

        unit.commit().await?;
        debug!(from_account, to_account, "transfer unit committed");
        info!(from_account, to_account, amount, "transfer committed");

        Ok(TransferReceipt {
            from_account: from_account.to_string(),
            to_account: to_account.to_string(),
            amount,
            from_balance,
            to_balance,
        })
    }

    // ========================
    // Reporting
    // ========================

    /// All accounts, ordered by account number.
    pub async fn list_all_accounts(&self) -> Result<Vec<Account>, BankError> {
        let mut unit = self.store.begin().await?;
        Ok(unit.list_accounts().await?)
    }

    /// Every record written for an account, oldest first.
    /// History is kept after the account is deleted.
    pub async fn transaction_history(
        &self,
        account_no: &str,
    ) -> Result<Vec<TransactionRecord>, BankError> {
        let mut unit = self.store.begin().await?;
        Ok(unit.transaction_history(account_no).await?)
    }

    // ========================
    // Rule helpers
    // ========================

    async fn require_account(
        unit: &mut S::Unit<'_>,
        account_no: &str,
    ) -> Result<Account, BankError> {
        match unit.get_account(account_no).await? {
            Some(account) => Ok(account),
            None => {
                warn!(account_no, "account not found");
                Err(BankError::AccountNotFound(account_no.to_string()))
            }
        }
    }

    fn require_positive(amount: Cents) -> Result<(), BankError> {
        if amount <= 0 {
            warn!(amount, "rejected non-positive amount");
            return Err(BankError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn require_funds(account: &Account, amount: Cents) -> Result<(), BankError> {
        if !account.can_cover(amount) {
            warn!(
                account_no = %account.account_no,
                balance = account.balance,
                amount,
                "insufficient balance"
            );
            return Err(BankError::InsufficientFunds {
                account_no: account.account_no.clone(),
                balance: account.balance,
                required: amount,
            });
        }
        Ok(())
    }
}
