use std::collections::BTreeSet;
use std::ops::Range;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::accounts::AccountClass;

pub mod parser;

pub use parser::{is_valid_account_name, is_valid_currency, parse};

/// Everything the parser extracted from a ledger file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    pub commodities: BTreeSet<String>,
    pub accounts: Vec<AccountDeclaration>,
    pub prices: Vec<PriceDeclaration>,
    pub transactions: Vec<Transaction>,
    /// Lines that didn't match any known directive and were ignored.
    pub skipped: Vec<SkippedLine>,
}

impl Ledger {
    /// Names of accounts referenced by postings that were never opened.
    pub fn undeclared_accounts(&self) -> BTreeSet<&str> {
        let declared: BTreeSet<&str> = self
            .accounts
            .iter()
            .map(|account| account.name.as_str())
            .collect();
        self.transactions
            .iter()
            .flat_map(|transaction| {
                transaction
                    .postings
                    .iter()
                    .map(|posting| posting.account.as_str())
            })
            .filter(|name| !declared.contains(name))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDeclaration {
    pub date: NaiveDate,
    pub name: String,
    pub declared_currency: Option<String>,
    pub class: AccountClass,
}

impl AccountDeclaration {
    pub fn new(date: NaiveDate, name: String, declared_currency: Option<String>) -> Self {
        let class = AccountClass::classify(&name);
        Self {
            date,
            name,
            declared_currency,
            class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDeclaration {
    pub date: NaiveDate,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub postings: Vec<Posting>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub account: String,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub explicit_rate: Option<Decimal>,
    pub explicit_target_currency: Option<String>,
}

impl Posting {
    pub fn currency_or<'a>(&'a self, base_currency: &'a str) -> &'a str {
        self.currency.as_deref().unwrap_or(base_currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based
    pub line_number: usize,
    /// Character offsets into the parsed text
    pub span: Range<usize>,
    pub content: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A top-level line that isn't a directive we understand
    Unrecognized,
    /// An indented line inside a transaction that isn't a valid posting. It ends the transaction.
    MalformedPosting,
    /// An indented line that doesn't belong to any transaction
    OrphanedLine,
}

impl SkipReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Unrecognized => "unrecognized directive",
            Self::MalformedPosting => "malformed posting, ends the transaction",
            Self::OrphanedLine => "indented line outside of a transaction",
        }
    }
}
