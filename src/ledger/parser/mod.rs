use chumsky::Parser as _;

mod directive;
mod posting;
mod utils;

use directive::{directive_line, Directive};
use posting::posting_line;

use super::{AccountDeclaration, Ledger, PriceDeclaration, SkipReason, SkippedLine, Transaction};

/// Parse ledger text.
///
/// Parsing never fails. Lines that aren't understood are collected in [Ledger::skipped] so the
/// caller can report them, everything else is extracted in file order.
pub fn parse(content: &str) -> Ledger {
    let (content, mut offset) = match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => (stripped, 1),
        None => (content, 0),
    };

    let mut builder = LedgerBuilder::default();
    for (index, raw_line) in content.split_inclusive('\n').enumerate() {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let line_info = LineInfo {
            line_number: index + 1,
            start: offset,
            content: line,
        };
        offset += raw_line.chars().count();
        builder.add_line(line_info);
    }
    builder.finish()
}

/// Whether `name` is a well-formed account name like `Assets:Cash:ICICI`
pub fn is_valid_account_name(name: &str) -> bool {
    utils::account_name()
        .then_ignore(chumsky::prelude::end())
        .parse(name)
        .is_ok()
}

pub fn is_valid_currency(name: &str) -> bool {
    utils::currency()
        .then_ignore(chumsky::prelude::end())
        .parse(name)
        .is_ok()
}

struct LineInfo<'a> {
    line_number: usize,
    start: usize,
    content: &'a str,
}

impl LineInfo<'_> {
    fn skipped(&self, reason: SkipReason) -> SkippedLine {
        SkippedLine {
            line_number: self.line_number,
            span: self.start..self.start + self.content.chars().count(),
            content: self.content.to_string(),
            reason,
        }
    }
}

#[derive(Default)]
enum Block {
    #[default]
    None,
    Transaction(Transaction),
    /// A transaction that was ended by a malformed posting
    Broken,
}

#[derive(Default)]
struct LedgerBuilder {
    ledger: Ledger,
    block: Block,
}

impl LedgerBuilder {
    fn add_line(&mut self, line: LineInfo<'_>) {
        let trimmed = line.content.trim();
        if trimmed.is_empty() {
            self.end_block();
            return;
        }
        if trimmed.starts_with(';') {
            // Comments neither start nor end a transaction
            return;
        }
        if line.content.starts_with([' ', '\t']) {
            self.add_indented_line(line, trimmed);
        } else {
            self.end_block();
            self.add_directive_line(line);
        }
    }

    fn add_indented_line(&mut self, line: LineInfo<'_>, trimmed: &str) {
        let Block::Transaction(transaction) = &mut self.block else {
            self.skip(line.skipped(SkipReason::OrphanedLine));
            return;
        };
        match posting_line().parse(trimmed) {
            Ok(posting) => transaction.postings.push(posting),
            Err(_) => {
                self.skip(line.skipped(SkipReason::MalformedPosting));
                self.end_block();
                self.block = Block::Broken;
            }
        }
    }

    fn add_directive_line(&mut self, line: LineInfo<'_>) {
        let Ok((date, directive)) = directive_line().parse(line.content) else {
            self.skip(line.skipped(SkipReason::Unrecognized));
            return;
        };
        match directive {
            Directive::Commodity(symbol) => {
                self.ledger.commodities.insert(symbol);
            }
            Directive::Open {
                account,
                currencies,
            } => {
                let declaration =
                    AccountDeclaration::new(date, account, currencies.into_iter().next());
                self.add_account(declaration, line.line_number);
            }
            Directive::Price {
                from_currency,
                rate,
                to_currency,
            } => self.ledger.prices.push(PriceDeclaration {
                date,
                from_currency,
                to_currency,
                rate,
            }),
            Directive::TransactionHeader { description } => {
                self.block = Block::Transaction(Transaction {
                    date,
                    description,
                    postings: vec![],
                });
            }
        }
    }

    fn add_account(&mut self, declaration: AccountDeclaration, line_number: usize) {
        let existing = self
            .ledger
            .accounts
            .iter_mut()
            .find(|account| account.name == declaration.name);
        match existing {
            Some(existing) => {
                log::warn!(
                    "Line {}: account {} is opened a second time, using the later declaration",
                    line_number,
                    declaration.name,
                );
                *existing = declaration;
            }
            None => self.ledger.accounts.push(declaration),
        }
    }

    fn skip(&mut self, skipped: SkippedLine) {
        log::warn!(
            "Skipping line {} ({}): {}",
            skipped.line_number,
            skipped.reason.describe(),
            skipped.content.trim(),
        );
        self.ledger.skipped.push(skipped);
    }

    fn end_block(&mut self) {
        if let Block::Transaction(transaction) = std::mem::take(&mut self.block) {
            self.ledger.transactions.push(transaction);
        }
    }

    fn finish(mut self) -> Ledger {
        self.end_block();
        self.ledger
    }
}
