use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::ledger::PriceDeclaration;

/// Exchange rates declared with `price` directives, keyed by date and source currency.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<(NaiveDate, String), PriceDeclaration>,
}

impl PriceTable {
    /// Later declarations for the same date and currency replace earlier ones.
    pub fn from_declarations<'a>(
        declarations: impl IntoIterator<Item = &'a PriceDeclaration>,
    ) -> Self {
        let mut prices = HashMap::new();
        for declaration in declarations {
            prices.insert(
                (declaration.date, declaration.from_currency.clone()),
                declaration.clone(),
            );
        }
        Self { prices }
    }

    pub fn lookup(&self, date: NaiveDate, currency: &str) -> Option<&PriceDeclaration> {
        self.prices.get(&(date, currency.to_string()))
    }

    pub fn rate(&self, date: NaiveDate, currency: &str) -> Option<Decimal> {
        self.lookup(date, currency).map(|price| price.rate)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
