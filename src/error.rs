use std::fmt::{self, Display};
use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that abort a whole migration run
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Failed to read ledger file {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reasons a transaction can't become a journal entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction has {0} posting(s) but needs at least two")]
    TooFewPostings(usize),

    #[error("Transaction is not balanced: {}", display_imbalances(.0))]
    Unbalanced(Vec<Imbalance>),

    #[error("Transaction totals in {currency} exceed the representable range")]
    Overflow { currency: String },
}

/// Debit and credit totals of one currency that differ by more than the tolerance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imbalance {
    pub currency: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl Imbalance {
    pub fn difference(&self) -> Decimal {
        (self.debit - self.credit).abs()
    }
}

impl Display for Imbalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{currency} debit {debit} != credit {credit} (off by {difference})",
            currency = self.currency,
            debit = self.debit,
            credit = self.credit,
            difference = self.difference(),
        )
    }
}

fn display_imbalances(imbalances: &[Imbalance]) -> String {
    imbalances
        .iter()
        .map(Imbalance::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
