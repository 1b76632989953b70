mod common;

use anyhow::Result;
use bankledger::BankError;
use bankledger::domain::TransactionKind;
use bankledger::io::{Exporter, HistoryStatement};
use common::{new_account, open_accounts, test_service};

#[tokio::test]
async fn test_history_is_in_write_order() -> Result<()> {
    let (service, _temp) = test_service().await?;
    open_accounts(&service, &[("A", 10000), ("B", 0)]).await?;

    service.deposit("A", 500).await?;
    service.withdraw("A", 200).await?;
    service.transfer("A", "B", 300).await?;

    let history = service.transaction_history("A").await?;
    let kinds: Vec<TransactionKind> = history.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TransactionKind::Deposit,
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::Transfer,
        ]
    );
    let descriptions: Vec<&str> = history.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec!["Initial deposit", "Cash deposit", "Cash withdrawal", "Transfer to B"]
    );
    assert!(history.windows(2).all(|w| w[0].id < w[1].id));

    Ok(())
}

#[tokio::test]
async fn test_history_outlives_deleted_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    open_accounts(&service, &[("A", 10000)]).await?;
    service.withdraw("A", 10000).await?;

    assert!(service.delete_account("A").await?);

    let history = service.transaction_history("A").await?;
    assert_eq!(history.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_list_all_accounts_sorted() -> Result<()> {
    let (service, _temp) = test_service().await?;
    assert!(service.list_all_accounts().await?.is_empty());

    open_accounts(&service, &[("C-3", 3), ("A-1", 1), ("B-2", 2)]).await?;

    let numbers: Vec<String> = service
        .list_all_accounts()
        .await?
        .into_iter()
        .map(|a| a.account_no)
        .collect();
    assert_eq!(numbers, vec!["A-1", "B-2", "C-3"]);

    Ok(())
}

#[tokio::test]
async fn test_export_history_from_sqlite() -> Result<()> {
    let (service, _temp) = test_service().await?;
    open_accounts(&service, &[("A", 10000), ("B", 0)]).await?;
    service.transfer("A", "B", 1250).await?;

    let mut json = Vec::new();
    Exporter::new(&service)
        .export_history_json("B", &mut json)
        .await?;
    let statement: HistoryStatement = serde_json::from_slice(&json)?;
    assert_eq!(statement.records.len(), 2);
    assert_eq!(statement.records[1].description, "Transfer from A");

    let mut csv = Vec::new();
    let count = Exporter::new(&service).export_accounts_csv(&mut csv).await?;
    assert_eq!(count, 2);
    let text = String::from_utf8(csv)?;
    assert!(text.contains(",87.50,"));
    assert!(text.contains(",12.50,"));

    Ok(())
}

#[tokio::test]
async fn test_deleted_account_number_is_not_reused() -> Result<()> {
    let (service, _temp) = test_service().await?;
    open_accounts(&service, &[("A", 10000)]).await?;
    service.withdraw("A", 2500).await?;
    assert!(service.delete_account("A").await?);

    let err = service
        .create_account(new_account("A", 500))
        .await
        .unwrap_err();
    assert!(matches!(err, BankError::AccountNumberRetired(ref n) if n == "A"));
    assert!(matches!(
        service.deposit("A", 100).await,
        Err(BankError::AccountNotFound(_))
    ));

    // Only the deleted account's own records remain under that number
    let history = service.transaction_history("A").await?;
    let amounts: Vec<i64> = history.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![10000, 2500]);

    // A fresh number behaves normally: opening plus two deposits is three records
    open_accounts(&service, &[("A2", 500)]).await?;
    service.deposit("A2", 100).await?;
    service.deposit("A2", 200).await?;
    assert_eq!(service.transaction_history("A2").await?.len(), 3);

    Ok(())
}
