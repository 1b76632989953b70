use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, format_cents};

/// Account numbers are caller-chosen and unique across the ledger.
pub type AccountNo = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Savings,
    Checking,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "savings",
            AccountType::Checking => "checking",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Ok(AccountType::Savings),
            "checking" => Ok(AccountType::Checking),
            other => Err(format!("unknown account type '{}'", other)),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_no: AccountNo,
    pub holder_name: String,
    pub email: String,
    pub phone: String,
    /// Current balance in cents, never negative
    pub balance: Cents,
    pub account_type: AccountType,
    pub opened_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        account_no: impl Into<AccountNo>,
        holder_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        balance: Cents,
        account_type: AccountType,
    ) -> Self {
        Self {
            account_no: account_no.into(),
            holder_name: holder_name.into(),
            email: email.into(),
            phone: phone.into(),
            balance,
            account_type,
            opened_at: Utc::now(),
        }
    }

    pub fn can_cover(&self, amount: Cents) -> bool {
        self.balance >= amount
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account: {}", self.account_no)?;
        writeln!(f, "  Holder:  {}", self.holder_name)?;
        writeln!(f, "  Email:   {}", self.email)?;
        writeln!(f, "  Phone:   {}", self.phone)?;
        writeln!(f, "  Type:    {}", self.account_type)?;
        writeln!(f, "  Opened:  {}", self.opened_at.format("%Y-%m-%d %H:%M:%S"))?;
        write!(f, "  Balance: {}", format_cents(self.balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_parsing() {
        assert_eq!("savings".parse::<AccountType>(), Ok(AccountType::Savings));
        assert_eq!("Checking".parse::<AccountType>(), Ok(AccountType::Checking));
        assert_eq!(" SAVINGS ".parse::<AccountType>(), Ok(AccountType::Savings));
        assert!("current".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_account_type_honours_width() {
        assert_eq!(format!("{:<10}|", AccountType::Savings), "savings   |");
    }

    #[test]
    fn test_can_cover() {
        let account = Account::new("A-1", "Ada", "ada@example.com", "555", 10000, AccountType::Savings);
        assert!(account.can_cover(10000));
        assert!(account.can_cover(1));
        assert!(!account.can_cover(10001));
    }

    #[test]
    fn test_display_shows_holder_and_balance() {
        let account = Account::new("A-1", "Ada", "ada@example.com", "555", 12345, AccountType::Checking);
        let text = account.to_string();
        assert!(text.starts_with("Account: A-1"));
        assert!(text.contains("Holder:  Ada"));
        assert!(text.contains("Type:    checking"));
        assert!(text.ends_with("Balance: 123.45"));
    }
}
