use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{Account, AccountType, Cents, TransactionKind, TransactionRecord};

use super::{LedgerStore, MIGRATION_001_INITIAL, UnitOfWork};

/// SQLite-backed ledger store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    ///
    /// The ledger serves one operation at a time, so a single connection is
    /// enough and keeps every unit of work strictly ordered.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let store = Self::connect(database_url).await?;
        store.migrate().await?;
        Ok(store)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl LedgerStore for SqliteStore {
    type Unit<'a> = SqliteUnit;

    async fn begin(&self) -> Result<SqliteUnit> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(SqliteUnit { tx })
    }
}

/// A unit of work backed by a SQLite transaction.
/// `sqlx` rolls the transaction back when it is dropped uncommitted.
pub struct SqliteUnit {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork for SqliteUnit {
    async fn get_account(&mut self, account_no: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT account_no, holder_name, email, phone, balance, account_type, opened_at
            FROM accounts
            WHERE account_no = ?
            "#,
        )
        .bind(account_no)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn insert_account(&mut self, account: &Account) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (account_no, holder_name, email, phone, balance, account_type, opened_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (account_no) DO NOTHING
            "#,
        )
        .bind(&account.account_no)
        .bind(&account.holder_name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(account.balance)
        .bind(account.account_type.as_str())
        .bind(account.opened_at.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .context("Failed to save account")?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_balance(&mut self, account_no: &str, balance: Cents) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET balance = ? WHERE account_no = ?")
            .bind(balance)
            .bind(account_no)
            .execute(&mut *self.tx)
            .await
            .context("Failed to update balance")?;

        if result.rows_affected() == 0 {
            bail!("Account {} disappeared during update", account_no);
        }
        Ok(())
    }

    async fn delete_account(&mut self, account_no: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE account_no = ?")
            .bind(account_no)
            .execute(&mut *self.tx)
            .await
            .context("Failed to delete account")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_accounts(&mut self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT account_no, holder_name, email, phone, balance, account_type, opened_at
            FROM accounts
            ORDER BY account_no
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(row_to_account).collect()
    }

    async fn log_transaction(&mut self, record: &TransactionRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (account_no, kind, amount, description, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.account_no)
        .bind(record.kind.as_str())
        .bind(record.amount)
        .bind(&record.description)
        .bind(record.timestamp.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .context("Failed to log transaction")?;

        Ok(result.last_insert_rowid())
    }

    async fn transaction_history(&mut self, account_no: &str) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_no, kind, amount, description, timestamp
            FROM transactions
            WHERE account_no = ?
            ORDER BY id
            "#,
        )
        .bind(account_no)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to fetch transaction history")?;

        rows.iter().map(row_to_record).collect()
    }

    async fn has_history(&mut self, account_no: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE account_no = ?) as used",
        )
        .bind(account_no)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to check account history")?;

        Ok(row.get::<i64, _>("used") != 0)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await.context("Failed to commit transaction")
    }
}

fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
    let account_type_str: String = row.get("account_type");
    let opened_at_str: String = row.get("opened_at");

    Ok(Account {
        account_no: row.get("account_no"),
        holder_name: row.get("holder_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        balance: row.get("balance"),
        account_type: account_type_str
            .parse::<AccountType>()
            .map_err(|e| anyhow::anyhow!("Invalid account type: {}", e))?,
        opened_at: parse_timestamp(&opened_at_str).context("Invalid opened_at timestamp")?,
    })
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<TransactionRecord> {
    let kind_str: String = row.get("kind");
    let timestamp_str: String = row.get("timestamp");

    Ok(TransactionRecord {
        id: row.get("id"),
        account_no: row.get("account_no"),
        kind: kind_str
            .parse::<TransactionKind>()
            .map_err(|e| anyhow::anyhow!("Invalid transaction kind: {}", e))?,
        amount: row.get("amount"),
        description: row.get("description"),
        timestamp: parse_timestamp(&timestamp_str).context("Invalid transaction timestamp")?,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
