//! Transaction serialization engine.
//!
//! Each encoder is a pure function of its inputs and returns the whole
//! payload in memory. [`ExportDescriptor::write`] persists it atomically,
//! so a failure never leaves a truncated ledger on disk.

pub mod csv;
pub mod filename;
pub mod json;
pub mod ofx;
pub mod qif;

use core::fmt;
use core::str::FromStr;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use rust_decimal::RoundingStrategy;

pub use qif::QifRegion;

use crate::config::OfxConfig;
use crate::error::{NetbankError, Result};
use crate::models::{Account, DateRange, Decimal, NaiveDate, Transaction};

/// ISO 8601 calendar date layout.
const ISO_DATE: &str = "%Y-%m-%d";

/// Target file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// JSON array of transactions.
    #[default]
    Json,
    /// Comma-separated values.
    Csv,
    /// Quicken Interchange Format with the given date layout.
    Qif(QifRegion),
    /// Open Financial Exchange statement.
    Ofx,
}

impl ExportFormat {
    /// Every supported format, in the order shown to users.
    pub const ALL: [Self; 6] = [
        Self::Json,
        Self::Csv,
        Self::Qif(QifRegion::Generic),
        Self::Qif(QifRegion::Aus),
        Self::Qif(QifRegion::Us),
        Self::Ofx,
    ];

    /// Returns the format identifier, also used as the file extension.
    #[inline]
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Qif(QifRegion::Generic) => "qif",
            Self::Qif(QifRegion::Aus) => "aus.qif",
            Self::Qif(QifRegion::Us) => "us.qif",
            Self::Ofx => "ofx",
        }
    }
}

impl fmt::Display for ExportFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = NetbankError;

    #[inline]
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| NetbankError::UnsupportedFormat(s.to_owned()))
    }
}

/// Encodes `transactions` in the requested format.
///
/// `account` and `range` are only consulted by formats that carry
/// statement metadata (OFX, and the QIF type header).
///
/// # Errors
///
/// Returns [`NetbankError::Encoding`] or [`NetbankError::Serialization`]
/// if the selected encoder fails. Nothing is returned on failure, so no
/// partial document can be persisted.
#[inline]
#[tracing::instrument(skip_all, fields(format = %format, count = transactions.len()))]
pub fn encode(
    format: ExportFormat,
    transactions: &[Transaction],
    account: &Account,
    range: DateRange,
    config: &OfxConfig,
) -> Result<String> {
    match format {
        ExportFormat::Json => json::encode(transactions),
        ExportFormat::Csv => csv::encode(transactions),
        ExportFormat::Qif(region) => Ok(qif::encode_for(account.kind, transactions, region)),
        ExportFormat::Ofx => ofx::encode(transactions, account, range, config),
    }
}

/// Resolved format and destination of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDescriptor {
    /// Selected format.
    format: ExportFormat,
    /// Resolved output path.
    path: PathBuf,
}

impl ExportDescriptor {
    /// Resolves `template` for the account and range.
    #[inline]
    #[must_use]
    pub fn new(
        format: ExportFormat,
        template: &str,
        account: &Account,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        let path = filename::resolve(template, account, from, to, format.extension());
        Self {
            format,
            path: PathBuf::from(path),
        }
    }

    /// Returns the selected format.
    #[inline]
    #[must_use]
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Returns the resolved output path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `content` to the resolved path, replacing any existing file.
    ///
    /// The payload goes to a sibling temporary file first and is renamed
    /// into place.
    ///
    /// # Errors
    ///
    /// Returns [`NetbankError::Write`] if either step fails.
    #[inline]
    #[tracing::instrument(skip_all, fields(path = %self.path.display(), bytes = content.len()))]
    pub fn write(&self, content: &str) -> Result<()> {
        let tmp_path = temp_path(&self.path);
        let written = fs::write(&tmp_path, content).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(source) = written {
            let _cleanup = fs::remove_file(&tmp_path);
            return Err(NetbankError::Write {
                path: self.path.clone(),
                source,
            });
        }
        tracing::debug!("export written");
        Ok(())
    }
}

/// Returns `<path>.<pid>.tmp` in the same directory as `path`.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(OsString::new);
    name.push(format!(".{}.tmp", process::id()));
    path.with_file_name(name)
}

/// Renders an amount with exactly two fraction digits and its sign.
pub(crate) fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return format!("{:.2}", Decimal::ZERO);
    }
    format!("{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, HistoryResult};
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> (Account, HistoryResult, DateRange) {
        let account = Account::new("Smart Access", "06 2000 1234 5678")
            .with_bsb("062000")
            .with_kind(AccountType::Checking);
        let history = HistoryResult::new(
            vec![
                Transaction::posted(day(2024, 1, 10), dec!(-25.00), "FUEL"),
                Transaction::posted(day(2024, 1, 31), dec!(1800.00), "PAY"),
            ],
            vec![Transaction::pending(day(2024, 2, 2), dec!(-7.25), "LUNCH")],
        );
        let range = DateRange::new(day(2024, 1, 1), day(2024, 2, 1)).unwrap();
        (account, history, range)
    }

    #[test]
    fn format_parse_all_identifiers() {
        for format in ExportFormat::ALL {
            let parsed: ExportFormat = format.extension().parse().unwrap();
            assert_eq!(parsed, format);
        }
        assert_eq!(
            "aus.qif".parse::<ExportFormat>().unwrap(),
            ExportFormat::Qif(QifRegion::Aus)
        );
        assert_eq!(" OFX ".parse::<ExportFormat>().unwrap(), ExportFormat::Ofx);
    }

    #[test]
    fn format_parse_rejects_unknown() {
        let result = "xlsx".parse::<ExportFormat>();
        assert!(matches!(result, Err(NetbankError::UnsupportedFormat(ref s)) if s == "xlsx"));
    }

    #[test]
    fn format_default_is_json() {
        assert_eq!(ExportFormat::default(), ExportFormat::Json);
        assert_eq!(ExportFormat::Qif(QifRegion::Us).to_string(), "us.qif");
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(dec!(1)), "1.00");
        assert_eq!(format_amount(dec!(-4.5)), "-4.50");
        assert_eq!(format_amount(dec!(1234567.891)), "1234567.89");
        assert_eq!(format_amount(dec!(0.005)), "0.01");
        assert_eq!(format_amount(dec!(-0.001)), "0.00");
    }

    #[test]
    fn encode_dispatches_each_format() {
        let (account, history, range) = fixture();
        let config = OfxConfig::default();
        let txs = &history.transactions;

        let csv_out = encode(ExportFormat::Csv, txs, &account, range, &config).unwrap();
        assert!(csv_out.starts_with("Date,Amount"));

        let qif_out = encode(ExportFormat::Qif(QifRegion::Us), txs, &account, range, &config).unwrap();
        assert!(qif_out.contains("D01/10/24\n"));

        let ofx_out = encode(ExportFormat::Ofx, txs, &account, range, &config).unwrap();
        assert!(ofx_out.starts_with("OFXHEADER:100\n"));

        let json_out = encode(ExportFormat::Json, txs, &account, range, &config).unwrap();
        assert!(json_out.starts_with('['));
    }

    #[test]
    fn negative_amount_is_debit_everywhere() {
        let (account, history, range) = fixture();
        let config = OfxConfig::default();
        let debit = &history.transactions[..1];
        let ofx_out = encode(ExportFormat::Ofx, debit, &account, range, &config).unwrap();
        assert!(ofx_out.contains("<TRNTYPE>DEBIT\n"));
        let csv_out = encode(ExportFormat::Csv, debit, &account, range, &config).unwrap();
        assert!(csv_out.contains(",-25.00,"));
        let qif_out = encode(ExportFormat::Qif(QifRegion::Generic), debit, &account, range, &config)
            .unwrap();
        assert!(qif_out.contains("\nT-25.00\n"));
    }

    #[test]
    fn descriptor_resolves_path() {
        let (account, _, _) = fixture();
        let descriptor = ExportDescriptor::new(
            ExportFormat::Ofx,
            "<number>_<from>.<ext>",
            &account,
            Some(day(2024, 1, 1)),
            None,
        );
        assert_eq!(descriptor.format(), ExportFormat::Ofx);
        assert_eq!(descriptor.path(), Path::new("06 2000 1234 5678_20240101.ofx"));
    }

    #[test]
    fn descriptor_write_creates_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("<name>.<ext>");
        let (account, _, _) = fixture();
        let descriptor = ExportDescriptor::new(
            ExportFormat::Csv,
            template.to_str().unwrap(),
            &account,
            None,
            None,
        );

        descriptor.write("a much longer first payload\n").unwrap();
        descriptor.write("short\n").unwrap();

        let written = fs::read_to_string(descriptor.path()).unwrap();
        assert_eq!(written, "short\n");
        assert!(!temp_path(descriptor.path()).exists());
    }

    #[test]
    fn descriptor_write_leaves_plain_tmp_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let (account, _, _) = fixture();
        let descriptor = ExportDescriptor::new(
            ExportFormat::Json,
            dir.path().join("<name>.<ext>").to_str().unwrap(),
            &account,
            None,
            None,
        );
        let neighbour = dir.path().join("Smart Access.json.tmp");
        fs::write(&neighbour, "keep me").unwrap();

        descriptor.write("[]").unwrap();

        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "keep me");
        assert_eq!(fs::read_to_string(descriptor.path()).unwrap(), "[]");
        let tmp = temp_path(descriptor.path());
        assert_ne!(tmp, neighbour);
        assert!(tmp.to_string_lossy().contains(&process::id().to_string()));
    }

    #[test]
    fn descriptor_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("missing-dir").join("<name>.<ext>");
        let (account, _, _) = fixture();
        let descriptor = ExportDescriptor::new(
            ExportFormat::Csv,
            template.to_str().unwrap(),
            &account,
            None,
            None,
        );
        let result = descriptor.write("data");
        assert!(matches!(result, Err(NetbankError::Write { .. })));
        assert!(!descriptor.path().exists());
    }
}
