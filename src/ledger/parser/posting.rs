use chumsky::{error::Simple, prelude::just, prelude::one_of, Parser as _};

use super::utils::{account_name, amount, currency, line_end, positive_amount, whitespace};
use crate::ledger::Posting;

/// A posting line with its indentation already removed:
/// `Account:Path amount [CURRENCY] [@ rate TARGET]`
pub fn posting_line() -> impl chumsky::Parser<char, Posting, Error = Simple<char>> {
    let optional_whitespace = || one_of(" \t").repeated().ignored();
    let price_annotation = optional_whitespace()
        .ignore_then(just('@'))
        .ignore_then(optional_whitespace())
        .ignore_then(positive_amount())
        .then_ignore(whitespace())
        .then(currency());
    account_name()
        .then_ignore(whitespace())
        .then(amount())
        .then(whitespace().ignore_then(currency()).or_not())
        .then(price_annotation.or_not())
        .then_ignore(line_end())
        .map(|(((account, amount), currency), price)| {
            let (explicit_rate, explicit_target_currency) = match price {
                Some((rate, target)) => (Some(rate), Some(target)),
                None => (None, None),
            };
            Posting {
                account,
                amount,
                currency,
                explicit_rate,
                explicit_target_currency,
            }
        })
        .labelled("posting")
}

#[cfg(test)]
mod tests {
    use chumsky::Parser as _;
    use rstest::rstest;
    use rust_decimal::Decimal;

    use super::super::utils::test_parser;
    use super::*;

    fn posting(account: &str, amount: Decimal, currency: Option<&str>) -> Posting {
        Posting {
            account: account.to_string(),
            amount,
            currency: currency.map(str::to_string),
            explicit_rate: None,
            explicit_target_currency: None,
        }
    }

    #[test]
    fn simple() {
        test_parser(
            "Assets:Cash                 500000.00 INR",
            posting_line(),
            posting("Assets:Cash", Decimal::new(50000000, 2), Some("INR")),
            "",
        );
    }

    #[test]
    fn negative_with_thousands_separators() {
        test_parser(
            "Equity:Opening-Balances\t-5,00,000.00 INR",
            posting_line(),
            posting(
                "Equity:Opening-Balances",
                Decimal::new(-50000000, 2),
                Some("INR"),
            ),
            "",
        );
    }

    #[test]
    fn without_currency() {
        test_parser(
            "Expenses:Operations:General  1200",
            posting_line(),
            posting("Expenses:Operations:General", Decimal::new(1200, 0), None),
            "",
        );
    }

    #[rstest]
    #[case("Assets:AccountsReceivable   -20683.55 USD @ 78.20 INR")]
    #[case("Assets:AccountsReceivable -20683.55 USD@78.20 INR")]
    #[case("Assets:AccountsReceivable -20,683.55 USD @ 78.20 INR ; converted")]
    fn with_price_annotation(#[case] input: &str) {
        test_parser(
            input,
            posting_line(),
            Posting {
                account: "Assets:AccountsReceivable".to_string(),
                amount: Decimal::new(-2068355, 2),
                currency: Some("USD".to_string()),
                explicit_rate: Some(Decimal::new(7820, 2)),
                explicit_target_currency: Some("INR".to_string()),
            },
            "",
        );
    }

    #[rstest]
    #[case("Assets:Cash")]
    #[case("Assets:Cash INR")]
    #[case("Assets:Cash 100.00 INR @@ 8000 INR")]
    #[case("Assets:Cash 100.00 USD @ 83.50")]
    #[case("Assets:Cash 100.00 USD {83.50 INR}")]
    #[case("! Assets:Cash 100.00 INR")]
    #[case("memo: \"metadata\"")]
    fn rejected(#[case] input: &str) {
        assert!(posting_line().parse(input).is_err());
    }
}
