use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::accounts::AccountMapper;
use crate::error::{Imbalance, TransactionError};
use crate::ledger::{Posting, Transaction};
use crate::rates::PriceTable;

/// Debits and credits of one currency may differ by at most this much
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// One line of a backend journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedJournalLine {
    pub target_account: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub currency: String,
    pub exchange_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTransaction {
    pub lines: Vec<NormalizedJournalLine>,
    /// Some line is in a currency other than the base currency
    pub multi_currency: bool,
    /// Number of foreign currency lines for which no exchange rate was found
    pub unresolved_rates: usize,
}

/// Turns a signed posting amount into a debit or credit on the mapped account.
///
/// Negative amounts are credits, everything else is a debit. The exchange rate comes from an
/// explicit `@ rate` annotation, or for foreign currencies from a price declared on the same day.
pub fn normalize_posting(
    posting: &Posting,
    date: NaiveDate,
    mapper: &AccountMapper,
    base_currency: &str,
    prices: &PriceTable,
) -> NormalizedJournalLine {
    let (debit, credit) = if posting.amount.is_sign_negative() && !posting.amount.is_zero() {
        (Decimal::ZERO, posting.amount.abs())
    } else {
        (posting.amount, Decimal::ZERO)
    };
    let currency = posting.currency_or(base_currency).to_string();
    let exchange_rate = match posting.explicit_rate {
        Some(rate) => Some(rate),
        None if currency != base_currency => {
            let rate = prices.rate(date, &currency);
            if rate.is_none() {
                log::warn!(
                    "No exchange rate for {currency} on {date} (posting to {account}), leaving it to the backend",
                    account = posting.account,
                );
            }
            rate
        }
        None => None,
    };
    NormalizedJournalLine {
        target_account: mapper.target(&posting.account),
        debit,
        credit,
        currency,
        exchange_rate,
    }
}

pub fn normalize_transaction(
    transaction: &Transaction,
    mapper: &AccountMapper,
    base_currency: &str,
    prices: &PriceTable,
) -> Result<NormalizedTransaction, TransactionError> {
    if transaction.postings.len() < 2 {
        return Err(TransactionError::TooFewPostings(transaction.postings.len()));
    }

    check_balance(&transaction.postings, base_currency)?;

    let lines: Vec<NormalizedJournalLine> = transaction
        .postings
        .iter()
        .map(|posting| {
            normalize_posting(posting, transaction.date, mapper, base_currency, prices)
        })
        .collect();
    let multi_currency = lines.iter().any(|line| line.currency != base_currency);
    let unresolved_rates = lines
        .iter()
        .filter(|line| line.currency != base_currency && line.exchange_rate.is_none())
        .count();
    Ok(NormalizedTransaction {
        lines,
        multi_currency,
        unresolved_rates,
    })
}

#[derive(Default)]
struct Totals {
    debit: Decimal,
    credit: Decimal,
}

/// Every currency has to balance on its own. A posting with `@ rate TARGET` counts in TARGET
/// with its converted amount.
fn check_balance(postings: &[Posting], base_currency: &str) -> Result<(), TransactionError> {
    let mut totals: BTreeMap<&str, Totals> = BTreeMap::new();
    for posting in postings {
        let (currency, weight) = match (&posting.explicit_rate, &posting.explicit_target_currency)
        {
            (Some(rate), Some(target)) => (
                target.as_str(),
                posting.amount.checked_mul(*rate).ok_or_else(|| overflow(target))?,
            ),
            _ => (posting.currency_or(base_currency), posting.amount),
        };
        let entry = totals.entry(currency).or_default();
        let total = if weight.is_sign_negative() {
            &mut entry.credit
        } else {
            &mut entry.debit
        };
        *total = total
            .checked_add(weight.abs())
            .ok_or_else(|| overflow(currency))?;
    }

    let imbalances: Vec<Imbalance> = totals
        .into_iter()
        .filter(|(_, totals)| (totals.debit - totals.credit).abs() > balance_tolerance())
        .map(|(currency, totals)| Imbalance {
            currency: currency.to_string(),
            debit: totals.debit,
            credit: totals.credit,
        })
        .collect();
    if imbalances.is_empty() {
        Ok(())
    } else {
        Err(TransactionError::Unbalanced(imbalances))
    }
}

fn overflow(currency: &str) -> TransactionError {
    TransactionError::Overflow {
        currency: currency.to_string(),
    }
}
