//! Transaction model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TransactionStatus;

/// A single movement of money on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Calendar date (yyyy-MM-dd in JSON).
    pub date: NaiveDate,
    /// Signed amount; negative is a debit.
    pub amount: Decimal,
    /// Free-text description as shown by the bank.
    pub description: String,
    /// Running balance after this transaction, when reported.
    pub balance: Option<Decimal>,
    /// Settlement state.
    #[serde(default)]
    pub status: TransactionStatus,
}

impl Transaction {
    /// Creates a posted transaction without a running balance.
    #[inline]
    #[must_use]
    pub fn posted<T: Into<String>>(date: NaiveDate, amount: Decimal, description: T) -> Self {
        Self {
            date,
            amount,
            description: description.into(),
            balance: None,
            status: TransactionStatus::Posted,
        }
    }

    /// Creates a pending transaction.
    #[inline]
    #[must_use]
    pub fn pending<T: Into<String>>(date: NaiveDate, amount: Decimal, description: T) -> Self {
        Self {
            status: TransactionStatus::Pending,
            ..Self::posted(date, amount, description)
        }
    }

    /// Sets the running balance.
    #[inline]
    #[must_use]
    pub const fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Returns `true` for money leaving the account.
    #[inline]
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Returns `true` if the transaction has not settled yet.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, TransactionStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deserialize_posted_transaction() {
        let json = r#"{
            "date": "2024-01-15",
            "amount": "-4.50",
            "description": "COFFEE SHOP SYDNEY",
            "balance": "1519.90"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(tx.amount, dec!(-4.50));
        assert_eq!(tx.balance, Some(dec!(1519.90)));
        assert_eq!(tx.status, TransactionStatus::Posted);
        assert!(tx.is_debit());
    }

    #[test]
    fn deserialize_rejects_unparseable_date() {
        let json = r#"{ "date": "15/01/2024", "amount": "1.00", "description": "x" }"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn pending_constructor_sets_status() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let tx = Transaction::pending(date, dec!(20.00), "REFUND");
        assert!(tx.is_pending());
        assert!(!tx.is_debit());
    }

    #[test]
    fn zero_amount_is_not_debit() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let tx = Transaction::posted(date, dec!(-0.00), "ADJUSTMENT");
        assert!(!tx.is_debit());
    }

    #[test]
    fn serialize_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let tx = Transaction::posted(date, dec!(-120.35), "ELECTRICITY BILL")
            .with_balance(dec!(880.00));
        let json = serde_json::to_string(&tx).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, tx);
    }
}
