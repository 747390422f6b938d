//! Quicken Interchange Format ledger.
//!
//! QIF carries no locale tag, so importers infer the date order from their
//! own configuration. [`QifRegion`] picks the `D` line layout the target
//! application expects; nothing else in the output changes with it.

use super::format_amount;
use crate::models::{AccountType, Transaction};

/// Type header for bank accounts.
pub const BANK_HEADER: &str = "!Type:Bank";

/// Type header for credit card accounts.
pub const CREDIT_CARD_HEADER: &str = "!Type:CCard";

/// Record terminator line.
const END_OF_RECORD: &str = "^";

/// Cleared-status marker for settled transactions.
const CLEARED: &str = "C*";

/// Date layout variant of a QIF file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QifRegion {
    /// `DD/MM/YYYY`.
    #[default]
    Generic,
    /// `MM/DD/YY`.
    Us,
    /// `DD/MM/YY`.
    Aus,
}

impl QifRegion {
    /// Returns the `chrono` format string for the `D` line.
    #[inline]
    #[must_use]
    pub const fn date_format(self) -> &'static str {
        match self {
            Self::Generic => "%d/%m/%Y",
            Self::Us => "%m/%d/%y",
            Self::Aus => "%d/%m/%y",
        }
    }
}

/// Encodes transactions as a bank-account QIF ledger.
///
/// The type header is always present, so an empty slice still yields a
/// valid, empty ledger.
#[inline]
#[must_use]
pub fn encode(transactions: &[Transaction], region: QifRegion) -> String {
    encode_with_header(BANK_HEADER, transactions, region)
}

/// Encodes transactions using the type header matching the account kind.
#[inline]
#[must_use]
pub fn encode_for(kind: AccountType, transactions: &[Transaction], region: QifRegion) -> String {
    let header = match kind {
        AccountType::CreditCard => CREDIT_CARD_HEADER,
        AccountType::Checking | AccountType::Savings | AccountType::Loan | AccountType::Other => {
            BANK_HEADER
        }
    };
    encode_with_header(header, transactions, region)
}

/// Renders the header line followed by one block per transaction.
#[tracing::instrument(skip_all, fields(header = %header, region = ?region, count = transactions.len()))]
fn encode_with_header(header: &str, transactions: &[Transaction], region: QifRegion) -> String {
    let mut lines = Vec::with_capacity(1 + transactions.len() * 5);
    lines.push(header.to_owned());

    for tx in transactions {
        lines.push(format!("D{}", tx.date.format(region.date_format())));
        lines.push(format!("T{}", format_amount(tx.amount)));
        lines.push(format!("M{}", single_line(&tx.description)));
        // Pending records keep the cleared flag unset.
        if !tx.is_pending() {
            lines.push(CLEARED.to_owned());
        }
        lines.push(END_OF_RECORD.to_owned());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Replaces line breaks so free text cannot terminate a record early.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::posted(day(2024, 3, 5), dec!(-42.10), "GROCERIES"),
            Transaction::posted(day(2024, 3, 15), dec!(2500), "SALARY"),
        ]
    }

    #[test]
    fn empty_list_is_header_only() {
        assert_eq!(encode(&[], QifRegion::Generic), "!Type:Bank\n");
    }

    #[test]
    fn renders_generic_blocks() {
        let out = encode(&sample(), QifRegion::Generic);
        let expected = "!Type:Bank\n\
                        D05/03/2024\nT-42.10\nMGROCERIES\nC*\n^\n\
                        D15/03/2024\nT2500.00\nMSALARY\nC*\n^\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn block_count_matches_transactions() {
        let out = encode(&sample(), QifRegion::Aus);
        assert!(out.starts_with("!Type:Bank\n"));
        assert_eq!(out.lines().filter(|line| *line == "^").count(), 2);
    }

    #[test]
    fn region_changes_only_date_lines() {
        let us = encode(&sample(), QifRegion::Us);
        let aus = encode(&sample(), QifRegion::Aus);
        assert!(us.contains("D03/05/24\n"));
        assert!(aus.contains("D05/03/24\n"));
        for (us_line, aus_line) in us.lines().zip(aus.lines()) {
            if us_line.starts_with('D') {
                continue;
            }
            assert_eq!(us_line, aus_line);
        }
        assert_eq!(us.lines().count(), aus.lines().count());
    }

    #[test]
    fn pending_transactions_are_uncleared_not_omitted() {
        let txs = [Transaction::pending(day(2024, 3, 20), dec!(-9.95), "STREAMING")];
        let out = encode(&txs, QifRegion::Generic);
        assert_eq!(out, "!Type:Bank\nD20/03/2024\nT-9.95\nMSTREAMING\n^\n");
    }

    #[test]
    fn credit_card_uses_ccard_header() {
        let out = encode_for(AccountType::CreditCard, &[], QifRegion::Generic);
        assert_eq!(out, "!Type:CCard\n");
        let out = encode_for(AccountType::Savings, &[], QifRegion::Generic);
        assert_eq!(out, "!Type:Bank\n");
    }

    #[test]
    fn memo_newlines_are_flattened() {
        let txs = [Transaction::posted(day(2024, 3, 5), dec!(1), "A\r\nB\nC")];
        let out = encode(&txs, QifRegion::Generic);
        assert!(out.contains("\nMA B C\n"));
    }
}
