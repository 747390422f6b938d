//! Export bank account history to personal finance interchange formats.
//!
//! A bank session (see [`session`]) yields accounts and their posted and
//! pending transactions. The [`export`] engine turns them into byte-exact
//! CSV, QIF (generic, US and Australian date layouts), OFX 1.02 or JSON,
//! and resolves the output file name from a template.
//!
//! # Example
//!
//! ```rust
//! use netbank_export::config::OfxConfig;
//! use netbank_export::export::{self, ExportFormat, QifRegion};
//! use netbank_export::models::{Account, DateRange, Decimal, NaiveDate, Transaction};
//!
//! # fn main() -> netbank_export::error::Result<()> {
//! let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default();
//! let account = Account::new("Smart Access", "06 2000 1234 5678");
//! let txs = [Transaction::posted(day, Decimal::new(-4550, 2), "WOOLWORTHS")];
//! let range = DateRange::new(day, day)?;
//!
//! let qif = export::encode(
//!     ExportFormat::Qif(QifRegion::Aus),
//!     &txs,
//!     &account,
//!     range,
//!     &OfxConfig::default(),
//! )?;
//! assert!(qif.contains("D15/01/24\nT-45.50\nMWOOLWORTHS\n"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
