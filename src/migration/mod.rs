use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt as _};

use crate::accounts::{AccountMapper, AccountTree, Node, NodeId};
use crate::backend::{AccountRequest, Backend, JournalEntryRequest};
use crate::error::MigrationError;
use crate::ledger::{self, Ledger, Transaction};
use crate::normalize::normalize_transaction;
use crate::rates::PriceTable;

mod report;

pub use report::{
    AccountOutcome, AccountReport, MigrationReport, Summary, TransactionOutcome,
    TransactionReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Map and validate everything but don't talk to the backend
    DryRun,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    pub mode: Mode,
    /// Submit journal entries right after creating them instead of leaving drafts
    pub auto_submit: bool,
    /// Maximum number of account creations in flight at once
    pub concurrency: usize,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            mode: Mode::DryRun,
            auto_submit: false,
            concurrency: 4,
        }
    }
}

/// Stops a running migration before its next account level or transaction
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Idle,
    Parsed,
    AccountsSynced,
    TransactionsSynced,
    Done,
}

/// Bookkeeping for a single migration run
#[derive(Debug)]
struct MigrationRun {
    phase: Phase,
    targets_seen: HashSet<String>,
    summary: Summary,
}

impl MigrationRun {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            targets_seen: HashSet::new(),
            summary: Summary::default(),
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug_assert!(
            phase > self.phase,
            "Migration can't go from {:?} back to {phase:?}",
            self.phase
        );
        log::debug!("Migration phase {:?} -> {phase:?}", self.phase);
        self.phase = phase;
    }

    fn check_cancelled(&mut self, token: &CancellationToken) -> bool {
        if token.is_cancelled() && !self.summary.cancelled {
            log::warn!("Migration cancelled during phase {:?}", self.phase);
            self.summary.cancelled = true;
        }
        self.summary.cancelled
    }
}

/// Moves the accounts and transactions of a ledger into a [Backend].
///
/// Accounts are created first, parents before children, then every transaction becomes one
/// journal entry. Running it again against the same backend doesn't create accounts twice, but
/// journal entries would be duplicated.
pub struct Migrator<B: Backend> {
    backend: B,
    mapper: AccountMapper,
    company: String,
    base_currency: String,
    options: MigrationOptions,
    cancellation: CancellationToken,
}

impl<B: Backend> Migrator<B> {
    pub fn new(
        backend: B,
        mapper: AccountMapper,
        company: impl Into<String>,
        base_currency: impl Into<String>,
        options: MigrationOptions,
    ) -> Self {
        Self {
            backend,
            mapper,
            company: company.into(),
            base_currency: base_currency.into(),
            options: MigrationOptions {
                concurrency: options.concurrency.max(1),
                ..options
            },
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn migrate_file(&self, path: &Path) -> Result<MigrationReport, MigrationError> {
        log::info!("Reading {}...", path.display());
        let content = tokio::fs::read_to_string(path).await.map_err(|source| {
            MigrationError::SourceUnreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::info!("Reading {}...done", path.display());
        Ok(self.migrate_text(&content).await)
    }

    pub async fn migrate_text(&self, content: &str) -> MigrationReport {
        let ledger = ledger::parse(content);
        self.migrate(&ledger).await
    }

    pub async fn migrate(&self, ledger: &Ledger) -> MigrationReport {
        let mut run = MigrationRun::new();
        run.enter(Phase::Parsed);
        run.summary.skipped_lines = ledger.skipped.len();
        for account in ledger.undeclared_accounts() {
            log::warn!("Account {account} is used by a transaction but never opened");
        }

        let accounts = self.sync_accounts(ledger, &mut run).await;
        run.enter(Phase::AccountsSynced);
        let transactions = self.sync_transactions(ledger, &mut run).await;
        run.enter(Phase::TransactionsSynced);

        run.enter(Phase::Done);
        let summary = run.summary;
        log::info!(
            "Migration finished: {} journal entries and {} accounts created, {} errors, {} skipped lines",
            summary.created_count,
            summary.accounts_created,
            summary.error_count,
            summary.skipped_lines,
        );
        MigrationReport {
            accounts,
            transactions,
            skipped_lines: ledger.skipped.clone(),
            summary,
        }
    }

    async fn sync_accounts(&self, ledger: &Ledger, run: &mut MigrationRun) -> Vec<AccountReport> {
        log::info!("Syncing accounts...");
        let tree = AccountTree::build(
            ledger
                .accounts
                .iter()
                .map(|account| self.mapper.map_account(account, &self.base_currency)),
        );
        let tree = &tree;
        let mut outcomes: Vec<Option<AccountOutcome>> = tree.ids().map(|_| None).collect();

        for level in tree.levels() {
            if run.check_cancelled(&self.cancellation) {
                break;
            }
            let mut pending = vec![];
            for id in level {
                let target = &tree.node(id).account.target_identifier;
                if run.targets_seen.insert(target.clone()) {
                    pending.push(id);
                } else {
                    log::debug!(
                        "{} maps to {target}, which was already handled",
                        tree.node(id).account.source_name,
                    );
                    outcomes[id.index()] = Some(AccountOutcome::Duplicate);
                }
            }

            match self.options.mode {
                Mode::DryRun => {
                    for id in pending {
                        outcomes[id.index()] = Some(AccountOutcome::Planned);
                    }
                }
                Mode::Live => {
                    let results: Vec<(NodeId, AccountOutcome)> = stream::iter(pending)
                        .map(|id| async move { (id, self.sync_account(tree.node(id)).await) })
                        .buffered(self.options.concurrency)
                        .collect()
                        .await;
                    for (id, outcome) in results {
                        match &outcome {
                            AccountOutcome::Created(_) => run.summary.accounts_created += 1,
                            AccountOutcome::Failed(_) => run.summary.error_count += 1,
                            _ => {}
                        }
                        outcomes[id.index()] = Some(outcome);
                    }
                }
            }
        }
        log::info!("Syncing accounts...done");

        tree.ids()
            .zip(outcomes)
            .filter_map(|(id, outcome)| {
                Some(AccountReport {
                    account: tree.node(id).account.clone(),
                    depth: tree.depth(id),
                    outcome: outcome?,
                })
            })
            .collect()
    }

    /// Two steps: only an account the backend reports as missing gets created.
    async fn sync_account(&self, node: &Node) -> AccountOutcome {
        let account = &node.account;
        match self.backend.account_exists(&account.target_identifier).await {
            Err(error) => {
                log::warn!(
                    "Failed to check whether account {} exists: {error}",
                    account.target_identifier,
                );
                AccountOutcome::Failed(error)
            }
            Ok(true) => {
                log::debug!("Account {} already exists", account.target_identifier);
                AccountOutcome::AlreadyExists
            }
            Ok(false) => {
                let request = AccountRequest {
                    name: account.target_identifier.clone(),
                    parent: account.parent_target_identifier.clone(),
                    class: account.class,
                    root_type: account.class.root_class(),
                    account_type: account.class.backend_account_type().map(str::to_string),
                    currency: account.currency.clone(),
                    company: self.company.clone(),
                    is_group: !node.children.is_empty(),
                };
                match self.backend.create_account(&request).await {
                    Ok(id) => {
                        log::debug!("Created account {id}");
                        AccountOutcome::Created(id)
                    }
                    Err(error) => {
                        log::warn!("Failed to create account {}: {error}", request.name);
                        AccountOutcome::Failed(error)
                    }
                }
            }
        }
    }

    async fn sync_transactions(
        &self,
        ledger: &Ledger,
        run: &mut MigrationRun,
    ) -> Vec<TransactionReport> {
        log::info!("Syncing transactions...");
        let prices = PriceTable::from_declarations(&ledger.prices);
        let mut reports = Vec::with_capacity(ledger.transactions.len());
        for transaction in &ledger.transactions {
            if run.check_cancelled(&self.cancellation) {
                break;
            }
            reports.push(self.sync_transaction(transaction, &prices, run).await);
        }
        log::info!("Syncing transactions...done");
        reports
    }

    async fn sync_transaction(
        &self,
        transaction: &Transaction,
        prices: &PriceTable,
        run: &mut MigrationRun,
    ) -> TransactionReport {
        let normalized =
            match normalize_transaction(transaction, &self.mapper, &self.base_currency, prices) {
                Ok(normalized) => normalized,
                Err(error) => {
                    log::warn!(
                        "Skipping transaction {} {:?}: {error}",
                        transaction.date,
                        transaction.description,
                    );
                    run.summary.error_count += 1;
                    return TransactionReport {
                        date: transaction.date,
                        description: transaction.description.clone(),
                        lines: vec![],
                        multi_currency: false,
                        outcome: TransactionOutcome::Rejected(error),
                    };
                }
            };
        run.summary.unresolved_rates += normalized.unresolved_rates;

        let outcome = match self.options.mode {
            Mode::DryRun => TransactionOutcome::Planned,
            Mode::Live => {
                let request = JournalEntryRequest {
                    date: transaction.date,
                    description: transaction.description.clone(),
                    company: self.company.clone(),
                    lines: normalized.lines.clone(),
                    multi_currency: normalized.multi_currency,
                };
                self.create_journal_entry(&request, run).await
            }
        };
        TransactionReport {
            date: transaction.date,
            description: transaction.description.clone(),
            lines: normalized.lines,
            multi_currency: normalized.multi_currency,
            outcome,
        }
    }

    async fn create_journal_entry(
        &self,
        request: &JournalEntryRequest,
        run: &mut MigrationRun,
    ) -> TransactionOutcome {
        let entry = match self.backend.create_journal_entry(request).await {
            Ok(entry) => entry,
            Err(error) => {
                log::warn!(
                    "Failed to create journal entry for {} {:?}: {error}",
                    request.date,
                    request.description,
                );
                run.summary.error_count += 1;
                return TransactionOutcome::Failed(error);
            }
        };
        run.summary.created_count += 1;
        log::debug!("Created journal entry {entry}");

        if !self.options.auto_submit {
            return TransactionOutcome::Created {
                entry,
                submitted: false,
            };
        }
        match self.backend.submit_journal_entry(&entry).await {
            Ok(()) => TransactionOutcome::Created {
                entry,
                submitted: true,
            },
            Err(error) => {
                log::warn!("Failed to submit journal entry {entry}: {error}");
                run.summary.error_count += 1;
                TransactionOutcome::SubmitFailed { entry, error }
            }
        }
    }
}
