//! In-memory session for testing.
//!
//! Provides [`InMemoryBank`], a fixed set of accounts with their history
//! that implements both [`super::Bank`] (async) and [`super::BlockingBank`]
//! (blocking). Ideal for unit and integration tests where no captured
//! snapshot is available.

#[cfg(feature = "async")]
use core::future::{self, Future};

use super::Credentials;
use crate::error::{NetbankError, Result};
use crate::models::{Account, HistoryResult, NaiveDate};

/// Fixture-backed session.
///
/// Logon accepts any credentials with a non-empty client number.
///
/// # Example
///
/// ```rust
/// use netbank_export::models::{Account, HistoryResult};
/// use netbank_export::session::InMemoryBank;
///
/// let bank = InMemoryBank::new()
///     .with_account(Account::new("Smart Access", "06 2000 1234 5678"), HistoryResult::default());
/// assert_eq!(bank.len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBank {
    /// Accounts in logon order, each with its full history.
    accounts: Vec<(Account, HistoryResult)>,
}

impl InMemoryBank {
    /// Creates a session with no accounts.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account and the history it will serve.
    #[inline]
    #[must_use]
    pub fn with_account(mut self, account: Account, history: HistoryResult) -> Self {
        self.accounts.push((account, history));
        self
    }

    /// Returns the number of accounts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns `true` if the session holds no accounts.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Validates the client number and lists accounts.
    fn list_accounts(&self, credentials: &Credentials) -> Result<Vec<Account>> {
        if credentials.username().trim().is_empty() {
            return Err(NetbankError::Session("client number is required".into()));
        }
        tracing::debug!(accounts = self.accounts.len(), "in-memory logon");
        Ok(self
            .accounts
            .iter()
            .map(|(account, _)| account.clone())
            .collect())
    }

    /// Looks up history by account number.
    fn history_for(
        &self,
        account: &Account,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<HistoryResult> {
        self.accounts
            .iter()
            .find(|(known, _)| known.number == account.number)
            .map(|(_, history)| history.clone().restricted_to(from, to))
            .ok_or_else(|| {
                NetbankError::Session(format!("unknown account {}", account.number).into())
            })
    }
}

#[cfg(feature = "blocking")]
impl super::BlockingBank for InMemoryBank {
    #[inline]
    fn logon(&self, credentials: &Credentials) -> Result<Vec<Account>> {
        self.list_accounts(credentials)
    }

    #[inline]
    fn download_history(
        &self,
        account: &Account,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<HistoryResult> {
        self.history_for(account, from, to)
    }
}

#[cfg(feature = "async")]
impl super::Bank for InMemoryBank {
    #[inline]
    fn logon(&self, credentials: &Credentials) -> impl Future<Output = Result<Vec<Account>>> + Send {
        future::ready(self.list_accounts(credentials))
    }

    #[inline]
    fn download_history(
        &self,
        account: &Account,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl Future<Output = Result<HistoryResult>> + Send {
        future::ready(self.history_for(account, from, to))
    }
}
