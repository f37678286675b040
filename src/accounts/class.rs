use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Accounting class of a ledger account, derived from its hierarchical name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccountClass {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
    Bank,
    Receivable,
    Payable,
    Unknown,
}

impl AccountClass {
    /// Classify an account path like `Assets:Cash:ICICI`.
    ///
    /// The root segment decides the family, keywords anywhere below the root refine it.
    pub fn classify(path: &str) -> Self {
        if let Some(rest) = path.strip_prefix("Assets:") {
            if rest.contains("Cash") || rest.contains("Bank") {
                Self::Bank
            } else if rest.contains("Receivable") {
                Self::Receivable
            } else {
                Self::Asset
            }
        } else if let Some(rest) = path.strip_prefix("Liabilities:") {
            if rest.contains("Payable") {
                Self::Payable
            } else {
                Self::Liability
            }
        } else if path.starts_with("Income:") {
            Self::Income
        } else if path.starts_with("Expenses:") {
            Self::Expense
        } else if path.starts_with("Equity:") {
            Self::Equity
        } else {
            Self::Unknown
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Bank => "Bank",
            Self::Receivable => "Receivable",
            Self::Payable => "Payable",
            Self::Unknown => "Unknown",
        }
    }

    /// The top-level category this class belongs to.
    pub fn root_class(&self) -> Self {
        match self {
            Self::Bank | Self::Receivable => Self::Asset,
            Self::Payable => Self::Liability,
            other => *other,
        }
    }

    /// Account type to send along when creating the account in the backend.
    ///
    /// Plain root classes don't carry an account type there, the backend infers it from the parent.
    pub fn backend_account_type(&self) -> Option<&'static str> {
        match self {
            Self::Asset | Self::Liability | Self::Equity => None,
            other => Some(other.name()),
        }
    }
}

impl Display for AccountClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
