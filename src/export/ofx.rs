//! Open Financial Exchange (OFX 1.02, SGML) statements.
//!
//! The document is an offline export rather than a live bank response:
//! the sign-on status is always success and the server date is pinned to
//! the end of the statement range, so identical inputs always produce
//! identical bytes.
//!
//! # Transaction ids
//!
//! Importers deduplicate by `FITID` across repeated imports. Each id is
//! the first 32 hex digits of SHA-256 over `YYYYMMDD|amount|description`.
//! When the same key occurs more than once in a single export (two equal
//! purchases on one day) the later occurrences get `-1`, `-2`, ...
//! appended in input order.

use std::collections::HashMap;

use chrono::NaiveDate;
use sha2::{Digest as _, Sha256};

use super::format_amount;
use crate::config::OfxConfig;
use crate::error::{NetbankError, Result};
use crate::models::{Account, AccountType, DateRange, Decimal, Transaction};

/// Fixed header block preceding the SGML body.
const HEADER: [&str; 9] = [
    "OFXHEADER:100",
    "DATA:OFXSGML",
    "VERSION:102",
    "SECURITY:NONE",
    "ENCODING:UTF-8",
    "CHARSET:NONE",
    "COMPRESSION:NONE",
    "OLDFILEUID:NONE",
    "NEWFILEUID:NONE",
];

/// Maximum length of the `NAME` element.
const NAME_MAX_CHARS: usize = 32;

/// Number of hex digits kept from the digest for a `FITID`.
const FITID_HEX_CHARS: usize = 32;

/// `BANKID` used when the account has no branch code.
const UNKNOWN_BANK_ID: &str = "000000";

/// Encodes a complete OFX statement for one account.
///
/// # Errors
///
/// Returns [`NetbankError::Encoding`] if the account has no usable
/// account number.
#[inline]
#[tracing::instrument(skip_all, fields(count = transactions.len(), kind = ?account.kind))]
pub fn encode(
    transactions: &[Transaction],
    account: &Account,
    range: DateRange,
    config: &OfxConfig,
) -> Result<String> {
    let account_id = account.account_id();
    if account_id.is_empty() {
        return Err(NetbankError::Encoding(format!(
            "account '{}' has no account number",
            account.name
        )));
    }

    let stamp = |date: NaiveDate| {
        format!(
            "{}000000{}",
            date.format("%Y%m%d"),
            config.timezone_suffix()
        )
    };
    let aggregates = Aggregates::for_kind(account.kind);
    let mut doc = Document::default();

    for line in HEADER {
        doc.raw(line);
    }
    doc.raw("");
    doc.open("OFX");

    doc.open("SIGNONMSGSRSV1");
    doc.open("SONRS");
    doc.status();
    doc.element("DTSERVER", &stamp(range.end()));
    doc.element("LANGUAGE", "ENG");
    doc.close("SONRS");
    doc.close("SIGNONMSGSRSV1");

    doc.open(aggregates.messages);
    doc.open(aggregates.transaction_response);
    doc.element("TRNUID", "1");
    doc.status();
    doc.open(aggregates.statement);
    doc.text("CURDEF", config.currency_code());

    doc.open(aggregates.account_from);
    if let Some(account_type) = aggregates.account_type {
        let bank_id = account.bank_id();
        doc.text("BANKID", bank_id.as_deref().unwrap_or(UNKNOWN_BANK_ID));
        doc.text("ACCTID", &account_id);
        doc.element("ACCTTYPE", account_type);
    } else {
        doc.text("ACCTID", &account_id);
    }
    doc.close(aggregates.account_from);

    doc.open("BANKTRANLIST");
    doc.element("DTSTART", &stamp(range.start()));
    doc.element("DTEND", &stamp(range.end()));
    let mut fitids = FitIds::default();
    for tx in transactions {
        doc.open("STMTTRN");
        doc.element("TRNTYPE", if tx.is_debit() { "DEBIT" } else { "CREDIT" });
        doc.element("DTPOSTED", &stamp(tx.date));
        doc.element("TRNAMT", &format_amount(tx.amount));
        doc.element("FITID", &fitids.next_for(tx));
        if !tx.description.is_empty() {
            let name: String = tx.description.chars().take(NAME_MAX_CHARS).collect();
            doc.text("NAME", &name);
            doc.text("MEMO", &tx.description);
        }
        doc.close("STMTTRN");
    }
    doc.close("BANKTRANLIST");

    doc.open("LEDGERBAL");
    doc.element("BALAMT", &format_amount(ledger_balance(account, transactions)));
    doc.element("DTASOF", &stamp(range.end()));
    doc.close("LEDGERBAL");
    if let Some(available) = account.available {
        doc.open("AVAILBAL");
        doc.element("BALAMT", &format_amount(available));
        doc.element("DTASOF", &stamp(range.end()));
        doc.close("AVAILBAL");
    }

    doc.close(aggregates.statement);
    doc.close(aggregates.transaction_response);
    doc.close(aggregates.messages);
    doc.close("OFX");

    let out = doc.finish();
    tracing::debug!(bytes = out.len(), "encoded ofx");
    Ok(out)
}

/// Balance reported in `LEDGERBAL`: the account balance, else the running
/// balance of the last transaction that carries one, else zero.
fn ledger_balance(account: &Account, transactions: &[Transaction]) -> Decimal {
    account
        .balance
        .or_else(|| transactions.iter().rev().find_map(|tx| tx.balance))
        .unwrap_or(Decimal::ZERO)
}

/// Message-set aggregate names, which differ between bank and credit card
/// statements.
#[derive(Debug, Clone, Copy)]
struct Aggregates {
    /// Message set wrapper.
    messages: &'static str,
    /// Transaction response wrapper.
    transaction_response: &'static str,
    /// Statement response.
    statement: &'static str,
    /// Account identification aggregate.
    account_from: &'static str,
    /// `ACCTTYPE` value; credit card statements carry none.
    account_type: Option<&'static str>,
}

impl Aggregates {
    /// Selects the aggregate layout for an account kind.
    const fn for_kind(kind: AccountType) -> Self {
        let account_type = match kind {
            AccountType::CreditCard => {
                return Self {
                    messages: "CREDITCARDMSGSRSV1",
                    transaction_response: "CCSTMTTRNRS",
                    statement: "CCSTMTRS",
                    account_from: "CCACCTFROM",
                    account_type: None,
                };
            }
            AccountType::Savings => "SAVINGS",
            AccountType::Loan => "CREDITLINE",
            AccountType::Checking | AccountType::Other => "CHECKING",
        };
        Self {
            messages: "BANKMSGSRSV1",
            transaction_response: "STMTTRNRS",
            statement: "STMTRS",
            account_from: "BANKACCTFROM",
            account_type: Some(account_type),
        }
    }
}

/// Deterministic `FITID` allocator for one document.
#[derive(Debug, Default)]
struct FitIds {
    /// Occurrences seen so far, keyed by digest.
    seen: HashMap<String, usize>,
}

impl FitIds {
    /// Returns the id for the next transaction in document order.
    fn next_for(&mut self, tx: &Transaction) -> String {
        let key = format!(
            "{}|{}|{}",
            tx.date.format("%Y%m%d"),
            format_amount(tx.amount),
            tx.description
        );
        let mut digest = hex::encode(Sha256::digest(key.as_bytes()));
        digest.truncate(FITID_HEX_CHARS);

        let count = self.seen.entry(digest.clone()).or_insert(0);
        let id = if *count == 0 {
            digest
        } else {
            format!("{digest}-{count}")
        };
        *count += 1;
        id
    }
}

/// Line-oriented SGML writer.
#[derive(Debug, Default)]
struct Document {
    /// Rendered lines.
    lines: Vec<String>,
}

impl Document {
    /// Appends a line verbatim.
    fn raw(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }

    /// Opens an aggregate.
    fn open(&mut self, tag: &str) {
        self.lines.push(format!("<{tag}>"));
    }

    /// Closes an aggregate.
    fn close(&mut self, tag: &str) {
        self.lines.push(format!("</{tag}>"));
    }

    /// Appends an element whose value needs no escaping.
    fn element(&mut self, tag: &str, value: &str) {
        self.lines.push(format!("<{tag}>{value}"));
    }

    /// Appends an element with free-text content.
    fn text(&mut self, tag: &str, value: &str) {
        self.element(tag, &escape(value));
    }

    /// Appends the synthetic success status aggregate.
    fn status(&mut self) {
        self.open("STATUS");
        self.element("CODE", "0");
        self.element("SEVERITY", "INFO");
        self.close("STATUS");
    }

    /// Joins the lines with a trailing newline.
    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Escapes SGML special characters and flattens line breaks.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' | '\n' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}
