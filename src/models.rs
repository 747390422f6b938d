//! Canonical record model consumed by every encoder.
//!
//! These shapes are produced by a bank session and are read-only to the
//! export engine. Monetary values are [`Decimal`] so no precision is lost
//! between the session and the rendered file.

mod account;
mod enums;
mod history;
mod transaction;

pub use account::Account;
pub use enums::{AccountType, TransactionStatus};
pub use history::{DateRange, HistoryResult};
pub use transaction::Transaction;

pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
