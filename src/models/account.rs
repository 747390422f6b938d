//! Bank account model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AccountType;

/// A customer's bank account as reported by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Display name (e.g. "Smart Access").
    pub name: String,
    /// Account number as displayed by the bank. The layout depends on the
    /// account type; credit cards carry a card number, deposit accounts
    /// usually carry `BSB ACCOUNT`.
    pub number: String,
    /// Branch (routing) code, when the account has one.
    pub bsb: Option<String>,
    /// Type of account.
    #[serde(rename = "type", default)]
    pub kind: AccountType,
    /// Current balance.
    pub balance: Option<Decimal>,
    /// Available funds.
    pub available: Option<Decimal>,
}

impl Account {
    /// Creates an account with the given name and number and no balance
    /// information.
    #[inline]
    #[must_use]
    pub fn new<N: Into<String>, U: Into<String>>(name: N, number: U) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            bsb: None,
            kind: AccountType::Other,
            balance: None,
            available: None,
        }
    }

    /// Sets the branch code.
    #[inline]
    #[must_use]
    pub fn with_bsb<T: Into<String>>(mut self, bsb: T) -> Self {
        self.bsb = Some(bsb.into());
        self
    }

    /// Sets the account type.
    #[inline]
    #[must_use]
    pub const fn with_kind(mut self, kind: AccountType) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the current and available balances.
    #[inline]
    #[must_use]
    pub const fn with_balances(mut self, balance: Decimal, available: Option<Decimal>) -> Self {
        self.balance = Some(balance);
        self.available = available;
        self
    }

    /// Returns `true` if the name contains `pattern` (case-insensitive) or
    /// the number contains `pattern` verbatim.
    #[inline]
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        self.name.to_lowercase().contains(&pattern.to_lowercase()) || self.number.contains(pattern)
    }

    /// Returns the branch code with separators removed, if any.
    #[inline]
    #[must_use]
    pub fn bank_id(&self) -> Option<String> {
        self.bsb
            .as_deref()
            .map(compact)
            .filter(|bsb| !bsb.is_empty())
    }

    /// Returns the account identifier without separators or branch prefix.
    ///
    /// `"06 2000 1234 5678"` with BSB `"062-000"` yields `"12345678"`.
    #[inline]
    #[must_use]
    pub fn account_id(&self) -> String {
        let number = compact(&self.number);
        match self.bank_id() {
            Some(bsb) => number
                .strip_prefix(bsb.as_str())
                .map_or_else(|| number.clone(), ToOwned::to_owned),
            None => number,
        }
    }
}

/// Strips whitespace and dashes from an identifier.
fn compact(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-')
        .collect()
}
