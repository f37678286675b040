use chrono::NaiveDate;

use crate::accounts::MappedAccount;
use crate::backend::BackendError;
use crate::error::TransactionError;
use crate::ledger::SkippedLine;
use crate::normalize::NormalizedJournalLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    /// Dry run, nothing was sent to the backend
    Planned,
    AlreadyExists,
    /// Created with the identifier assigned by the backend
    Created(String),
    /// Another account earlier in the ledger maps to the same target
    Duplicate,
    Failed(BackendError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountReport {
    pub account: MappedAccount,
    /// Depth in the account hierarchy, 0 for accounts without a migrated parent
    pub depth: usize,
    pub outcome: AccountOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Planned,
    Created { entry: String, submitted: bool },
    /// Never sent to the backend
    Rejected(TransactionError),
    Failed(BackendError),
    /// The draft entry exists but couldn't be submitted
    SubmitFailed { entry: String, error: BackendError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReport {
    pub date: NaiveDate,
    pub description: String,
    /// Empty if the transaction was rejected
    pub lines: Vec<NormalizedJournalLine>,
    pub multi_currency: bool,
    pub outcome: TransactionOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Journal entries created in the backend
    pub created_count: usize,
    pub accounts_created: usize,
    pub error_count: usize,
    pub skipped_lines: usize,
    pub unresolved_rates: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub accounts: Vec<AccountReport>,
    pub transactions: Vec<TransactionReport>,
    pub skipped_lines: Vec<SkippedLine>,
    pub summary: Summary,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.summary.error_count == 0 && !self.summary.cancelled
    }
}
