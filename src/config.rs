//! Export settings.
//!
//! OFX documents carry a currency code and a timezone suffix on every
//! date. Both depend on the bank the data came from, so they are
//! configurable with defaults matching an Australian institution.

use core::fmt;
use core::str::FromStr;

use crate::error::NetbankError;

/// Default ISO 4217 currency code for statements.
pub const DEFAULT_CURRENCY: &str = "AUD";

/// Environment variable overriding the statement currency.
pub const CURRENCY_ENV: &str = "NETBANK_CURRENCY";

/// Environment variable overriding the OFX timezone (e.g. `+10:AEST`).
pub const TIMEZONE_ENV: &str = "NETBANK_TIMEZONE";

/// Timezone suffix appended to OFX date-time tokens, rendered as
/// `[<offset>:<name>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfxTimezone {
    /// Whole-hour offset from UTC.
    offset_hours: i8,
    /// Abbreviated zone name.
    name: String,
}

impl OfxTimezone {
    /// Creates a timezone suffix.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(offset_hours: i8, name: T) -> Self {
        Self {
            offset_hours,
            name: name.into(),
        }
    }

    /// Returns the offset from UTC in hours.
    #[inline]
    #[must_use]
    pub const fn offset_hours(&self) -> i8 {
        self.offset_hours
    }

    /// Returns the zone abbreviation.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for OfxTimezone {
    #[inline]
    fn default() -> Self {
        Self::new(10, "AEST")
    }
}

impl fmt::Display for OfxTimezone {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset_hours > 0 {
            write!(f, "[+{}:{}]", self.offset_hours, self.name)
        } else {
            write!(f, "[{}:{}]", self.offset_hours, self.name)
        }
    }
}

impl FromStr for OfxTimezone {
    type Err = NetbankError;

    /// Parses `+10:AEST`, `-5:EST` or `0:UTC`. Surrounding brackets are
    /// accepted.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
        let (offset, name) = trimmed
            .split_once(':')
            .ok_or_else(|| NetbankError::Config(format!("timezone '{s}' is not <offset>:<name>")))?;
        let offset_hours = offset
            .trim_start_matches('+')
            .parse::<i8>()
            .map_err(|err| NetbankError::Config(format!("timezone offset '{offset}': {err}")))?;
        if !(-12_i8..=14_i8).contains(&offset_hours) {
            return Err(NetbankError::Config(format!(
                "timezone offset {offset_hours} is out of range"
            )));
        }
        if name.is_empty() || !name.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(NetbankError::Config(format!(
                "timezone name '{name}' must be alphabetic"
            )));
        }
        Ok(Self::new(offset_hours, name))
    }
}

/// Settings for the OFX encoder.
///
/// # Examples
///
/// ```
/// use netbank_export::config::{OfxConfig, OfxTimezone};
///
/// # fn main() -> netbank_export::error::Result<()> {
/// let config = OfxConfig::new()
///     .currency("NZD")?
///     .timezone(OfxTimezone::new(12, "NZST"));
/// assert_eq!(config.currency_code(), "NZD");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfxConfig {
    /// ISO 4217 currency code for `CURDEF`.
    currency: String,
    /// Suffix for every date-time token.
    timezone: OfxTimezone,
}

impl OfxConfig {
    /// Creates a configuration with the default currency and timezone.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the statement currency. The code is upper-cased.
    ///
    /// # Errors
    ///
    /// Returns [`NetbankError::Config`] unless the code is three ASCII
    /// letters.
    #[inline]
    pub fn currency<T: AsRef<str>>(mut self, code: T) -> Result<Self, NetbankError> {
        let code = code.as_ref().trim();
        if code.len() != 3 || !code.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(NetbankError::Config(format!(
                "currency '{code}' is not a three-letter code"
            )));
        }
        self.currency = code.to_ascii_uppercase();
        Ok(self)
    }

    /// Sets the timezone suffix.
    #[inline]
    #[must_use]
    pub fn timezone(mut self, timezone: OfxTimezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Returns the statement currency code.
    #[inline]
    #[must_use]
    pub fn currency_code(&self) -> &str {
        &self.currency
    }

    /// Returns the timezone suffix.
    #[inline]
    #[must_use]
    pub const fn timezone_suffix(&self) -> &OfxTimezone {
        &self.timezone
    }
}

impl Default for OfxConfig {
    #[inline]
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_owned(),
            timezone: OfxTimezone::default(),
        }
    }
}
