//! Enumeration types for constrained record values.

use serde::{Deserialize, Serialize};

/// Kind of bank account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountType {
    /// Everyday transaction account.
    Checking,
    /// Savings or deposit account.
    Savings,
    /// Credit card.
    CreditCard,
    /// Loan or line of credit.
    Loan,
    /// Anything the session could not classify.
    #[default]
    Other,
}

/// Settlement state of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    /// Settled, with a final balance impact.
    #[default]
    Posted,
    /// Authorized but not yet settled; may still change or disappear.
    Pending,
}

impl TransactionStatus {
    /// Returns the lowercase label used in tabular exports.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posted => "posted",
            Self::Pending => "pending",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_serde_credit_card() {
        let json = serde_json::to_string(&AccountType::CreditCard).unwrap();
        assert_eq!(json, r#""creditCard""#);
        let deserialized: AccountType = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, AccountType::CreditCard);
    }

    #[test]
    fn account_type_defaults_to_other() {
        assert_eq!(AccountType::default(), AccountType::Other);
    }

    #[test]
    fn status_serde_roundtrip() {
        let variants = [
            (TransactionStatus::Posted, r#""posted""#),
            (TransactionStatus::Pending, r#""pending""#),
        ];
        for (variant, expected_json) in variants {
            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, expected_json);
            assert_eq!(format!(r#""{}""#, variant.as_str()), expected_json);
        }
    }

    #[test]
    fn invalid_account_type_fails() {
        let result = serde_json::from_str::<AccountType>(r#""brokerage""#);
        assert!(result.is_err());
    }
}
