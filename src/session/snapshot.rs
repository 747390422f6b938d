//! Captured-history session backend.
//!
//! Replays accounts and history previously saved to a directory (default:
//! `$XDG_DATA_HOME/netbank-export/`), so exports can be regenerated without
//! logging on to the bank again.

#[cfg(feature = "async")]
use core::future::{self, Future};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::Credentials;
use crate::error::{NetbankError, Result};
use crate::export::temp_path;
use crate::models::{Account, HistoryResult, NaiveDate};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "netbank-export";

/// File name for the account list.
const ACCOUNTS_FILE: &str = "accounts.json";

/// Directory holding one history file per account.
const HISTORY_DIR: &str = "history";

/// Session that reads captured JSON files.
///
/// # File layout
///
/// ```text
/// <dir>/
///   accounts.json
///   history/
///     <account id>.json
/// ```
///
/// A missing `accounts.json` fails the logon. A missing history file is
/// an empty history.
#[derive(Debug, Clone)]
pub struct SnapshotBank {
    /// Root directory of the snapshot.
    dir: PathBuf,
}

impl SnapshotBank {
    /// Creates a session rooted at `dir`. Nothing is read until logon.
    #[inline]
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the default XDG-compliant snapshot directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| NetbankError::Config("could not determine platform data directory".into()))
    }

    /// Returns the snapshot root.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves `history` for `account`, appending the account to
    /// `accounts.json` or replacing the entry with the same number.
    ///
    /// # Errors
    ///
    /// Returns [`NetbankError::Write`] if a file cannot be written, and
    /// leaves an existing `accounts.json` untouched if it cannot be read
    /// or parsed.
    #[inline]
    #[tracing::instrument(skip_all, fields(account = %account.name))]
    pub fn store(&self, account: &Account, history: &HistoryResult) -> Result<()> {
        let mut accounts = self.read_accounts_if_present()?.unwrap_or_default();
        match accounts.iter_mut().find(|known| known.number == account.number) {
            Some(known) => known.clone_from(account),
            None => accounts.push(account.clone()),
        }

        let history_dir = self.dir.join(HISTORY_DIR);
        fs::create_dir_all(&history_dir).map_err(|source| NetbankError::Write {
            path: history_dir.clone(),
            source,
        })?;
        write_json(&self.dir.join(ACCOUNTS_FILE), &accounts)?;
        write_json(&self.history_path(account), history)?;
        tracing::debug!(accounts = accounts.len(), "snapshot stored");
        Ok(())
    }

    /// Path of the history file for `account`.
    fn history_path(&self, account: &Account) -> PathBuf {
        self.dir
            .join(HISTORY_DIR)
            .join(format!("{}.json", account.account_id()))
    }

    /// Reads `accounts.json`, failing if there is no snapshot.
    fn read_accounts(&self) -> Result<Vec<Account>> {
        self.read_accounts_if_present()?.ok_or_else(|| {
            NetbankError::Session(format!("no snapshot at {}", self.dir.display()).into())
        })
    }

    /// Reads `accounts.json`. `None` only when the file does not exist.
    fn read_accounts_if_present(&self) -> Result<Option<Vec<Account>>> {
        match fs::read_to_string(self.dir.join(ACCOUNTS_FILE)) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(NetbankError::Session(Box::new(err))),
        }
    }

    /// Reads the history file for `account`, empty if absent.
    fn read_history(&self, account: &Account) -> Result<HistoryResult> {
        match fs::read_to_string(self.history_path(account)) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(HistoryResult::default()),
            Err(err) => Err(NetbankError::Session(Box::new(err))),
        }
    }

    /// Shared logon body.
    fn list_accounts(&self, credentials: &Credentials) -> Result<Vec<Account>> {
        if credentials.username().trim().is_empty() {
            return Err(NetbankError::Session("client number is required".into()));
        }
        let accounts = self.read_accounts()?;
        tracing::debug!(dir = %self.dir.display(), accounts = accounts.len(), "snapshot logon");
        Ok(accounts)
    }

    /// Shared history body.
    fn history_for(
        &self,
        account: &Account,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<HistoryResult> {
        Ok(self.read_history(account)?.restricted_to(from, to))
    }
}

/// Serializes `value` to `path` via a temporary file and rename.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, json)
        .and_then(|()| fs::rename(&tmp_path, path))
        .map_err(|source| {
            let _cleanup = fs::remove_file(&tmp_path);
            NetbankError::Write {
                path: path.to_path_buf(),
                source,
            }
        })
}

#[cfg(feature = "blocking")]
impl super::BlockingBank for SnapshotBank {
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
impl super::Bank for SnapshotBank {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("12345678", "secret")
    }

    fn account() -> Account {
        Account::new("Smart Access", "06 2000 1234 5678").with_bsb("062000")
    }

    fn history() -> HistoryResult {
        HistoryResult::new(
            vec![
                Transaction::posted(day(2024, 1, 3), dec!(-9.95), "STREAMING"),
                Transaction::posted(day(2024, 1, 20), dec!(250.00), "REFUND"),
            ],
            vec![Transaction::pending(day(2024, 1, 22), dec!(-3.50), "COFFEE")],
        )
    }

    #[test]
    fn history_file_uses_account_id() {
        let bank = SnapshotBank::new(PathBuf::from("/snap"));
        assert_eq!(
            bank.history_path(&account()),
            Path::new("/snap/history/12345678.json")
        );
    }

    #[test]
    fn corrupt_accounts_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ACCOUNTS_FILE), "not json").unwrap();
        let bank = SnapshotBank::new(dir.path().to_path_buf());
        assert!(matches!(
            bank.read_accounts(),
            Err(NetbankError::Serialization(_))
        ));
    }

    #[test]
    fn dir_is_reported() {
        let bank = SnapshotBank::new(PathBuf::from("/snap"));
        assert_eq!(bank.dir(), Path::new("/snap"));
    }

    #[cfg(feature = "blocking")]
    mod blocking {
        use super::*;
        use crate::session::BlockingBank;

        #[test]
        fn logon_without_snapshot_fails() {
            let dir = tempfile::tempdir().unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());
            let result = bank.logon(&credentials());
            assert!(matches!(result, Err(NetbankError::Session(_))));
        }

        #[test]
        fn store_then_replay() {
            let dir = tempfile::tempdir().unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());
            bank.store(&account(), &history()).unwrap();

            let accounts = bank.logon(&credentials()).unwrap();
            assert_eq!(accounts, vec![account()]);
            let replayed = bank.download_history(&accounts[0], None, None).unwrap();
            assert_eq!(replayed, history());
        }

        #[test]
        fn store_replaces_existing_account() {
            let dir = tempfile::tempdir().unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());
            bank.store(&account(), &HistoryResult::default()).unwrap();
            let updated = account().with_balances(dec!(100.00), None);
            bank.store(&updated, &history()).unwrap();

            let accounts = bank.logon(&credentials()).unwrap();
            assert_eq!(accounts.len(), 1);
            assert_eq!(accounts[0].balance, Some(dec!(100.00)));
        }

        #[test]
        fn store_keeps_unreadable_accounts_file() {
            let dir = tempfile::tempdir().unwrap();
            let accounts_path = dir.path().join(ACCOUNTS_FILE);
            fs::write(&accounts_path, b"\xff\xfe").unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());

            let result = bank.store(&Account::new("New", "9"), &HistoryResult::default());

            assert!(matches!(result, Err(NetbankError::Session(_))));
            assert_eq!(fs::read(&accounts_path).unwrap(), b"\xff\xfe");
            assert!(!dir.path().join(HISTORY_DIR).exists());
        }

        #[test]
        fn store_keeps_corrupt_accounts_file() {
            let dir = tempfile::tempdir().unwrap();
            let accounts_path = dir.path().join(ACCOUNTS_FILE);
            fs::write(&accounts_path, "[{ broken").unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());

            let result = bank.store(&account(), &history());

            assert!(matches!(result, Err(NetbankError::Serialization(_))));
            assert_eq!(fs::read_to_string(&accounts_path).unwrap(), "[{ broken");
        }

        #[test]
        fn download_history_filters_posted() {
            let dir = tempfile::tempdir().unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());
            bank.store(&account(), &history()).unwrap();

            let replayed = bank
                .download_history(&account(), Some(day(2024, 1, 10)), Some(day(2024, 1, 31)))
                .unwrap();
            assert_eq!(replayed.transactions.len(), 1);
            assert_eq!(replayed.transactions[0].description, "REFUND");
            assert_eq!(replayed.pendings.len(), 1);
        }

        #[test]
        fn missing_history_is_empty() {
            let dir = tempfile::tempdir().unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());
            bank.store(&account(), &HistoryResult::default()).unwrap();
            let other = Account::new("Goal Saver", "06 2000 9999 0000");
            let replayed = bank.download_history(&other, None, None).unwrap();
            assert_eq!(replayed, HistoryResult::default());
        }

        #[test]
        fn logon_requires_client_number() {
            let dir = tempfile::tempdir().unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());
            bank.store(&account(), &history()).unwrap();
            let result = bank.logon(&Credentials::new("", "secret"));
            assert!(matches!(result, Err(NetbankError::Session(_))));
        }
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use super::*;
        use crate::session::Bank;

        #[tokio::test]
        async fn replay_through_async_trait() {
            let dir = tempfile::tempdir().unwrap();
            let bank = SnapshotBank::new(dir.path().to_path_buf());
            bank.store(&account(), &history()).unwrap();

            let accounts = Bank::logon(&bank, &credentials()).await.unwrap();
            let replayed = Bank::download_history(&bank, &accounts[0], None, None)
                .await
                .unwrap();
            assert_eq!(replayed.pendings.len(), 1);
        }
    }
}
