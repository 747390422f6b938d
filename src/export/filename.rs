//! Output filename templating.
//!
//! A template is a plain string with optional markers from a fixed token
//! set. Substitution is a single left-to-right pass, so text inserted for
//! one token (an account name containing `<to>`, say) is never expanded
//! again.

use chrono::NaiveDate;

use crate::models::Account;

/// Replaced with the account display name.
pub const NAME_TOKEN: &str = "<name>";
/// Replaced with the account number.
pub const NUMBER_TOKEN: &str = "<number>";
/// Replaced with the range start as `YYYYMMDD`.
pub const FROM_TOKEN: &str = "<from>";
/// Replaced with the range end as `YYYYMMDD`.
pub const TO_TOKEN: &str = "<to>";
/// Replaced with the format identifier.
pub const EXT_TOKEN: &str = "<ext>";

/// Default template for a history download.
pub const DEFAULT_TEMPLATE: &str = "[<name>](<number>) [<from> to <to>].<ext>";

/// Default template for a pending-transactions download.
pub const PENDING_TEMPLATE: &str = "[<name>](<number>) [pending].<ext>";

/// Filesystem-sortable date layout.
const SORTABLE_DATE: &str = "%Y%m%d";

/// Recognized placeholder.
#[derive(Debug, Clone, Copy)]
enum Token {
    /// `<name>`.
    Name,
    /// `<number>`.
    Number,
    /// `<from>`.
    From,
    /// `<to>`.
    To,
    /// `<ext>`.
    Ext,
}

/// Token texts and their meaning.
const TOKENS: [(&str, Token); 5] = [
    (NAME_TOKEN, Token::Name),
    (NUMBER_TOKEN, Token::Number),
    (FROM_TOKEN, Token::From),
    (TO_TOKEN, Token::To),
    (EXT_TOKEN, Token::Ext),
];

/// Resolves `template` into a concrete file name.
///
/// Every occurrence of a token is replaced. `<from>`/`<to>` are left as-is
/// when the corresponding date is `None`; unknown `<...>` text is copied
/// through.
///
/// # Examples
///
/// ```
/// use netbank_export::export::filename::resolve;
/// use netbank_export::models::{Account, NaiveDate};
///
/// let account = Account::new("Smith", "123");
/// let name = resolve(
///     "<name>-<number>-<from>-<to>.<ext>",
///     &account,
///     NaiveDate::from_ymd_opt(2024, 1, 1),
///     NaiveDate::from_ymd_opt(2024, 3, 1),
///     "csv",
/// );
/// assert_eq!(name, "Smith-123-20240101-20240301.csv");
/// ```
#[inline]
#[must_use]
pub fn resolve(
    template: &str,
    account: &Account,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    format: &str,
) -> String {
    let mut resolved = String::with_capacity(template.len() + account.name.len());
    let mut rest = template;

    while let Some(start) = rest.find('<') {
        let (literal, candidate) = rest.split_at(start);
        resolved.push_str(literal);

        let matched = TOKENS
            .iter()
            .find(|&&(text, _)| candidate.starts_with(text));
        let consumed = match matched {
            Some(&(text, token)) => {
                let value = match token {
                    Token::Name => Some(account.name.clone()),
                    Token::Number => Some(account.number.clone()),
                    Token::From => from.map(sortable),
                    Token::To => to.map(sortable),
                    Token::Ext => Some(format.to_owned()),
                };
                resolved.push_str(value.as_deref().unwrap_or(text));
                text.len()
            }
            None => {
                resolved.push('<');
                1
            }
        };
        rest = candidate.get(consumed..).unwrap_or_default();
    }

    resolved.push_str(rest);
    resolved
}

/// Renders a date as `YYYYMMDD`.
fn sortable(date: NaiveDate) -> String {
    date.format(SORTABLE_DATE).to_string()
}
