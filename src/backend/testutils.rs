use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AccountRequest, Backend, BackendError, JournalEntryRequest};
use crate::migration::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    AccountExists(String),
    CreateAccount(AccountRequest),
    CreateJournalEntry(JournalEntryRequest),
    SubmitJournalEntry(String),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<BackendCall>,
    accounts: BTreeSet<String>,
    journal_entries: usize,
    in_flight: usize,
    max_in_flight: usize,
}

/// In-memory backend that records every call and can be told to fail specific ones
#[derive(Debug, Default)]
pub struct RecordingBackend {
    state: Mutex<State>,
    failing_exists: BTreeSet<String>,
    failing_accounts: BTreeSet<String>,
    failing_entries: BTreeSet<String>,
    fail_submit: bool,
    cancel_after_entry: Option<CancellationToken>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing_accounts<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.state
            .lock()
            .unwrap()
            .accounts
            .extend(names.into_iter().map(str::to_string));
        self
    }

    pub fn failing_account_exists(mut self, name: &str) -> Self {
        self.failing_exists.insert(name.to_string());
        self
    }

    pub fn failing_create_account(mut self, name: &str) -> Self {
        self.failing_accounts.insert(name.to_string());
        self
    }

    pub fn failing_journal_entry(mut self, description: &str) -> Self {
        self.failing_entries.insert(description.to_string());
        self
    }

    pub fn failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    /// Cancels `token` as soon as the first journal entry was created
    pub fn cancelling_after_journal_entry(mut self, token: CancellationToken) -> Self {
        self.cancel_after_entry = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn created_accounts(&self) -> Vec<AccountRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::CreateAccount(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn created_journal_entries(&self) -> Vec<JournalEntryRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::CreateJournalEntry(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Highest number of `create_account` calls that were running at the same time
    pub fn max_concurrent_creations(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    fn record(&self, call: BackendCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn account_exists(&self, name: &str) -> Result<bool, BackendError> {
        self.record(BackendCall::AccountExists(name.to_string()));
        if self.failing_exists.contains(name) {
            return Err(BackendError::Transport("connection reset".to_string()));
        }
        Ok(self.state.lock().unwrap().accounts.contains(name))
    }

    async fn create_account(&self, request: &AccountRequest) -> Result<String, BackendError> {
        self.record(BackendCall::CreateAccount(request.clone()));
        {
            let mut state = self.state.lock().unwrap();
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.in_flight -= 1;
        if self.failing_accounts.contains(&request.name) {
            return Err(BackendError::Rejected(format!(
                "Could not create {}",
                request.name
            )));
        }
        state.accounts.insert(request.name.clone());
        Ok(request.name.clone())
    }

    async fn create_journal_entry(
        &self,
        request: &JournalEntryRequest,
    ) -> Result<String, BackendError> {
        self.record(BackendCall::CreateJournalEntry(request.clone()));
        if self.failing_entries.contains(&request.description) {
            return Err(BackendError::Rejected(format!(
                "Could not create entry {}",
                request.description
            )));
        }
        if let Some(token) = &self.cancel_after_entry {
            token.cancel();
        }
        let mut state = self.state.lock().unwrap();
        state.journal_entries += 1;
        Ok(format!("JV-{:04}", state.journal_entries))
    }

    async fn submit_journal_entry(&self, entry: &str) -> Result<(), BackendError> {
        self.record(BackendCall::SubmitJournalEntry(entry.to_string()));
        if self.fail_submit {
            return Err(BackendError::Rejected(format!("Could not submit {entry}")));
        }
        Ok(())
    }
}
