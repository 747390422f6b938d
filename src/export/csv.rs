//! Flat CSV projection of transactions.

use csv::{Terminator, WriterBuilder};

use super::{ISO_DATE, format_amount};
use crate::error::{NetbankError, Result};
use crate::models::Transaction;

/// Column names, in output order.
pub const HEADER: [&str; 5] = ["Date", "Amount", "Description", "Balance", "Status"];

/// Encodes transactions as CSV with a header row.
///
/// Fields containing a comma, quote or newline are quoted with embedded
/// quotes doubled. Dates are ISO 8601, amounts carry exactly two fraction
/// digits, and a missing balance is an empty cell.
///
/// # Errors
///
/// Returns [`NetbankError::Encoding`] if the CSV writer fails.
#[inline]
#[tracing::instrument(skip_all, fields(count = transactions.len()))]
pub fn encode(transactions: &[Transaction]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADER).map_err(encoding_error)?;

    for tx in transactions {
        writer
            .write_record([
                tx.date.format(ISO_DATE).to_string(),
                format_amount(tx.amount),
                tx.description.clone(),
                tx.balance.map(format_amount).unwrap_or_default(),
                tx.status.as_str().to_owned(),
            ])
            .map_err(encoding_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| NetbankError::Encoding(err.to_string()))?;
    tracing::debug!(bytes = bytes.len(), "encoded csv");
    String::from_utf8(bytes).map_err(|err| NetbankError::Encoding(err.to_string()))
}

/// Wraps a CSV writer failure.
fn encoding_error(err: csv::Error) -> NetbankError {
    NetbankError::Encoding(err.to_string())
}
