//! Bank session collaborator interface.
//!
//! A session logs on with the customer's credentials and retrieves
//! accounts and transaction history. The export engine only consumes the
//! records it yields. This module defines the [`Bank`] (async) and
//! [`BlockingBank`] (blocking) traits via a shared macro, plus two
//! implementations that need no network access: [`InMemoryBank`] for
//! tests and fixtures, and `SnapshotBank` for history captured to disk.

mod memory;
#[cfg(feature = "snapshot")]
mod snapshot;

pub use memory::InMemoryBank;
#[cfg(feature = "snapshot")]
pub use snapshot::SnapshotBank;

use secrecy::SecretString;

use crate::error::{NetbankError, Result};
use crate::models::Account;

/// Environment variable holding the client number.
pub const USERNAME_ENV: &str = "NETBANK_USERNAME";

/// Environment variable holding the password.
pub const PASSWORD_ENV: &str = "NETBANK_PASSWORD";

/// Logon credentials. The password is never printed by `Debug`.
#[derive(Debug)]
pub struct Credentials {
    /// Client number.
    username: String,
    /// Account password.
    password: SecretString,
}

impl Credentials {
    /// Creates credentials from a client number and password.
    #[inline]
    #[must_use]
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns the client number.
    #[inline]
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password, still wrapped.
    #[inline]
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Returns the first account matching `pattern` by name or number.
///
/// # Errors
///
/// Returns [`NetbankError::AccountNotFound`] if no account matches.
#[inline]
pub fn select_account<'accounts>(
    accounts: &'accounts [Account],
    pattern: &str,
) -> Result<&'accounts Account> {
    accounts
        .iter()
        .find(|account| account.matches(pattern))
        .ok_or_else(|| NetbankError::AccountNotFound {
            pattern: pattern.to_owned(),
        })
}

/// Generates a session trait (async or blocking) with all methods.
///
/// Uses `@methods` to define the method list once, and `@method` to render
/// each method in async (`impl Future + Send`) or blocking (`fn`) style.
macro_rules! define_bank {
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_bank!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_bank!(@methods blocking);
        }
    };

    (@methods $mode:ident) => {
        define_bank!(@method $mode, logon,
            "Logs on and returns every account visible to the customer.\n\n# Errors\n\nReturns an error if the logon is rejected or the session fails.",
            credentials: &Credentials, -> Result<Vec<Account>>);
        define_bank!(@method $mode, download_history,
            "Retrieves posted and pending transactions for `account`.\n\nPosted transactions are limited to the inclusive `from`/`to` bounds when given; pending transactions are always returned in full.\n\n# Errors\n\nReturns an error if the account is unknown or the session fails.",
            account: &Account, from: Option<NaiveDate>, to: Option<NaiveDate>, -> Result<HistoryResult>);
    };

    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_bank {
    //! Async session trait definition.

    use super::Credentials;
    use crate::error::Result;
    use crate::models::{Account, HistoryResult, NaiveDate};

    define_bank! {
        trait_name: Bank,
        trait_doc: "Async bank session.\n\nAll methods take `&self`; implementations keep any session state behind interior mutability.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_bank {
    //! Blocking session trait definition.

    use super::Credentials;
    use crate::error::Result;
    use crate::models::{Account, HistoryResult, NaiveDate};

    define_bank! {
        trait_name: BlockingBank,
        trait_doc: "Blocking bank session.\n\nAll methods take `&self`; implementations keep any session state behind interior mutability.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_bank::Bank;
#[cfg(feature = "blocking")]
pub use blocking_bank::BlockingBank;
