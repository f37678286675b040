use chrono::NaiveDate;
use chumsky::{
    error::Simple,
    prelude::{just, one_of},
    Parser as _,
};
use rust_decimal::Decimal;

use super::utils::{
    account_name, currency, date, line_end, positive_amount, quoted_string, whitespace,
};

/// A top-level ledger line, without its date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Commodity(String),
    Open {
        account: String,
        currencies: Vec<String>,
    },
    Price {
        from_currency: String,
        rate: Decimal,
        to_currency: String,
    },
    /// Start of a transaction. Its postings follow on indented lines.
    TransactionHeader { description: String },
}

pub fn directive_line(
) -> impl chumsky::Parser<char, (NaiveDate, Directive), Error = Simple<char>> {
    date()
        .then_ignore(whitespace())
        .then(
            commodity()
                .or(open())
                .or(price())
                .or(transaction_header()),
        )
        .then_ignore(line_end())
        .labelled("directive")
}

fn commodity() -> impl chumsky::Parser<char, Directive, Error = Simple<char>> {
    just("commodity")
        .ignore_then(whitespace())
        .ignore_then(currency())
        .map(Directive::Commodity)
}

fn open() -> impl chumsky::Parser<char, Directive, Error = Simple<char>> {
    let currencies = currency().separated_by(just(',')).at_least(1);
    just("open")
        .ignore_then(whitespace())
        .ignore_then(account_name())
        .then(whitespace().ignore_then(currencies).or_not())
        // Booking method, e.g. `"FIFO"`
        .then_ignore(whitespace().ignore_then(quoted_string()).or_not())
        .map(|(account, currencies)| Directive::Open {
            account,
            currencies: currencies.unwrap_or_default(),
        })
}

fn price() -> impl chumsky::Parser<char, Directive, Error = Simple<char>> {
    just("price")
        .ignore_then(whitespace())
        .ignore_then(currency())
        .then_ignore(whitespace())
        .then(positive_amount())
        .then_ignore(whitespace())
        .then(currency())
        .map(|((from_currency, rate), to_currency)| Directive::Price {
            from_currency,
            rate,
            to_currency,
        })
}

fn transaction_header() -> impl chumsky::Parser<char, Directive, Error = Simple<char>> {
    one_of("*!")
        .ignore_then(whitespace())
        .ignore_then(quoted_string())
        .then(whitespace().ignore_then(quoted_string()).or_not())
        .map(|(first, second)| {
            let description = match second {
                // `"payee" "narration"`
                Some(narration) => format!("{first} - {narration}"),
                None => first,
            };
            Directive::TransactionHeader { description }
        })
}

#[cfg(test)]
mod tests {
    use chumsky::Parser as _;
    use rstest::rstest;

    use super::super::utils::test_parser;
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn commodity_line() {
        test_parser(
            "1960-01-01 commodity INR",
            directive_line(),
            (day(1960, 1, 1), Directive::Commodity("INR".to_string())),
            "",
        );
    }

    #[test]
    fn open_with_currency() {
        test_parser(
            "1960-01-01 open Assets:Cash:ICICI INR",
            directive_line(),
            (
                day(1960, 1, 1),
                Directive::Open {
                    account: "Assets:Cash:ICICI".to_string(),
                    currencies: vec!["INR".to_string()],
                },
            ),
            "",
        );
    }

    #[test]
    fn open_without_currency() {
        test_parser(
            "1960-01-01 open Equity:Opening-Balances   ; no currency",
            directive_line(),
            (
                day(1960, 1, 1),
                Directive::Open {
                    account: "Equity:Opening-Balances".to_string(),
                    currencies: vec![],
                },
            ),
            "",
        );
    }

    #[test]
    fn open_with_multiple_currencies() {
        test_parser(
            "2020-01-01 open Assets:AccountsReceivable USD,INR",
            directive_line(),
            (
                day(2020, 1, 1),
                Directive::Open {
                    account: "Assets:AccountsReceivable".to_string(),
                    currencies: vec!["USD".to_string(), "INR".to_string()],
                },
            ),
            "",
        );
    }

    #[rstest]
    #[case("2020-01-01 open Assets:Investments VBMPX \"FIFO\"", vec!["VBMPX"])]
    #[case("2020-01-01 open Assets:Investments \"STRICT\"", vec![])]
    #[case("2020-01-01 open Assets:Investments USD,INR \"NONE\"  ; lots", vec!["USD", "INR"])]
    fn open_with_booking_method(#[case] input: &str, #[case] currencies: Vec<&str>) {
        test_parser(
            input,
            directive_line(),
            (
                day(2020, 1, 1),
                Directive::Open {
                    account: "Assets:Investments".to_string(),
                    currencies: currencies.into_iter().map(str::to_string).collect(),
                },
            ),
            "",
        );
    }

    #[test]
    fn price_line() {
        test_parser(
            "2025-07-31 price USD 84.20 INR",
            directive_line(),
            (
                day(2025, 7, 31),
                Directive::Price {
                    from_currency: "USD".to_string(),
                    rate: Decimal::new(8420, 2),
                    to_currency: "INR".to_string(),
                },
            ),
            "",
        );
    }

    #[rstest]
    #[case("2025-07-31 * \"Opening balance\"", "Opening balance")]
    #[case("2025-07-31 ! \"Needs review\"", "Needs review")]
    #[case("2025-07-31 * \"Acme\" \"Invoice 42\"", "Acme - Invoice 42")]
    #[case("2025-07-31 *  \"Spaced\"  ; trailing comment", "Spaced")]
    fn transaction_header_line(#[case] input: &str, #[case] description: &str) {
        test_parser(
            input,
            directive_line(),
            (
                day(2025, 7, 31),
                Directive::TransactionHeader {
                    description: description.to_string(),
                },
            ),
            "",
        );
    }

    #[rstest]
    #[case("2025-07-31 close Assets:Cash")]
    #[case("2025-07-31 price USD 0 INR")]
    #[case("2025-07-31 price USD -1.00 INR")]
    #[case("2025-07-31 open")]
    #[case("2025-07-31 * \"Tagged\" #trip")]
    #[case("2025-07-31 txn \"Keyword flag\"")]
    #[case("option \"operating_currency\" \"INR\"")]
    #[case("2025-13-01 commodity INR")]
    #[case("2025-07-31 commodity INR extra")]
    fn unsupported_lines(#[case] input: &str) {
        assert!(directive_line().parse(input).is_err());
    }
}
