// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use bankledger::application::NewAccount;
use bankledger::domain::{AccountType, Cents};
use bankledger::{BankService, SqliteStore};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BankService<SqliteStore>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BankService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Account details with predictable contact data
pub fn new_account(account_no: &str, initial_deposit: Cents) -> NewAccount {
    NewAccount {
        account_no: account_no.to_string(),
        holder_name: format!("Holder {}", account_no),
        email: format!("{}@example.com", account_no.to_lowercase()),
        phone: "555-0100".to_string(),
        initial_deposit,
        account_type: AccountType::Checking,
    }
}

/// Test fixture: open each (account number, initial deposit) pair
pub async fn open_accounts(
    service: &BankService<SqliteStore>,
    accounts: &[(&str, Cents)],
) -> Result<()> {
    for (account_no, deposit) in accounts {
        service.create_account(new_account(account_no, *deposit)).await?;
    }
    Ok(())
}

pub async fn balance(service: &BankService<SqliteStore>, account_no: &str) -> Result<Cents> {
    Ok(service.check_balance(account_no).await?.balance)
}
