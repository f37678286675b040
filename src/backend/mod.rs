use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::accounts::AccountClass;
use crate::normalize::NormalizedJournalLine;

#[cfg(test)]
pub mod testutils;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Could not reach the accounting backend: {0}")]
    Transport(String),

    #[error("The accounting backend rejected the request: {0}")]
    Rejected(String),

    #[error("Not authorized to access the accounting backend")]
    Unauthorized,

    #[error("No accounting backend is configured")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRequest {
    pub name: String,
    pub parent: String,
    pub class: AccountClass,
    /// Asset, Liability, Equity, Income or Expense (Unknown if the ledger root isn't one of them)
    pub root_type: AccountClass,
    /// Backend specific account type, e.g. "Bank" or "Receivable"
    pub account_type: Option<String>,
    pub currency: String,
    pub company: String,
    /// Other migrated accounts hang below this one
    pub is_group: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryRequest {
    pub date: NaiveDate,
    pub description: String,
    pub company: String,
    pub lines: Vec<NormalizedJournalLine>,
    pub multi_currency: bool,
}

/// The accounting system accounts and journal entries are migrated into.
///
/// Implementations map their transport failures onto [BackendError]. `account_exists` returns
/// `Ok(false)` only if the backend positively reported that the account doesn't exist.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn account_exists(&self, name: &str) -> Result<bool, BackendError>;

    /// Returns the identifier the backend assigned to the new account
    async fn create_account(&self, request: &AccountRequest) -> Result<String, BackendError>;

    /// Creates a draft journal entry and returns its identifier
    async fn create_journal_entry(
        &self,
        request: &JournalEntryRequest,
    ) -> Result<String, BackendError>;

    async fn submit_journal_entry(&self, entry: &str) -> Result<(), BackendError>;
}

/// A backend that isn't connected to anything. Only usable for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

#[async_trait]
impl Backend for OfflineBackend {
    async fn account_exists(&self, _name: &str) -> Result<bool, BackendError> {
        Err(BackendError::Unavailable)
    }

    async fn create_account(&self, _request: &AccountRequest) -> Result<String, BackendError> {
        Err(BackendError::Unavailable)
    }

    async fn create_journal_entry(
        &self,
        _request: &JournalEntryRequest,
    ) -> Result<String, BackendError> {
        Err(BackendError::Unavailable)
    }

    async fn submit_journal_entry(&self, _entry: &str) -> Result<(), BackendError> {
        Err(BackendError::Unavailable)
    }
}
