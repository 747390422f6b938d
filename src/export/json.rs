//! Pass-through JSON serialization of a transaction array.

use crate::error::Result;
use crate::models::Transaction;

/// Serializes transactions as a compact JSON array.
///
/// # Errors
///
/// Returns [`crate::error::NetbankError::Serialization`] if serialization
/// fails.
#[inline]
pub fn encode(transactions: &[Transaction]) -> Result<String> {
    Ok(serde_json::to_string(transactions)?)
}
