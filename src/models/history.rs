//! Retrieved account history and date ranges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Transaction, TransactionStatus};
use crate::error::{NetbankError, Result};

/// Transaction history retrieved for one account.
///
/// Posted and pending transactions are kept in two disjoint sequences and
/// are never merged implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResult {
    /// Posted transactions, in the order returned by the bank.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Pending transactions, as retrieved.
    #[serde(default)]
    pub pendings: Vec<Transaction>,
}

impl HistoryResult {
    /// Creates a history from posted and pending sequences.
    #[inline]
    #[must_use]
    pub const fn new(transactions: Vec<Transaction>, pendings: Vec<Transaction>) -> Self {
        Self {
            transactions,
            pendings,
        }
    }

    /// Returns the pending sequence with every record marked
    /// [`TransactionStatus::Pending`], regardless of what the session set.
    #[inline]
    #[must_use]
    pub fn pending_tagged(&self) -> Vec<Transaction> {
        self.pendings
            .iter()
            .map(|tx| Transaction {
                status: TransactionStatus::Pending,
                ..tx.clone()
            })
            .collect()
    }

    /// Keeps only posted transactions whose date falls inside the given
    /// bounds. Pending transactions are left untouched.
    #[inline]
    #[must_use]
    pub fn restricted_to(self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        let Self {
            transactions,
            pendings,
        } = self;
        let transactions = transactions
            .into_iter()
            .filter(|tx| from.is_none_or(|start| tx.date >= start))
            .filter(|tx| to.is_none_or(|end| tx.date <= end))
            .collect();
        Self {
            transactions,
            pendings,
        }
    }
}

/// An inclusive calendar date range with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// First day of the range.
    from: NaiveDate,
    /// Last day of the range.
    to: NaiveDate,
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`NetbankError::InvalidRange`] if `from` is after `to`.
    #[inline]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(NetbankError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Returns the smallest range covering every transaction date, or a
    /// single-day range on `fallback` when the slice is empty.
    #[inline]
    #[must_use]
    pub fn spanning(transactions: &[Transaction], fallback: NaiveDate) -> Self {
        let from = transactions.iter().map(|tx| tx.date).min();
        let to = transactions.iter().map(|tx| tx.date).max();
        match from.zip(to) {
            Some((start, end)) => Self {
                from: start,
                to: end,
            },
            None => Self {
                from: fallback,
                to: fallback,
            },
        }
    }

    /// Returns the first day of the range.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.from
    }

    /// Returns the last day of the range.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.to
    }

    /// Returns `true` if `date` lies inside the range.
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}
