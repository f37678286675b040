use chumsky::{
    error::Simple,
    prelude::{filter, just, one_of},
    Parser as _,
};
use rust_decimal::Decimal;

/// A signed decimal number like `-23,000.00`. Thousands separators are dropped.
pub fn amount() -> impl chumsky::Parser<char, Decimal, Error = Simple<char>> {
    one_of("+-")
        .or_not()
        .then(unsigned_number())
        .map(|(sign, value)| if sign == Some('-') { -value } else { value })
        .labelled("amount")
}

/// A strictly positive decimal number, used for exchange rates.
pub fn positive_amount() -> impl chumsky::Parser<char, Decimal, Error = Simple<char>> {
    unsigned_number()
        .try_map(|value, span| {
            if value > Decimal::ZERO {
                Ok(value)
            } else {
                Err(Simple::custom(span, "Rate must be positive"))
            }
        })
        .labelled("rate")
}

fn unsigned_number() -> impl chumsky::Parser<char, Decimal, Error = Simple<char>> {
    let digit = || filter(|c: &char| c.is_ascii_digit());
    let integer_part = digit().chain(digit().or(just(',')).repeated());
    let fractional_part = just('.').chain(digit().repeated().at_least(1));
    integer_part
        .chain::<char, Vec<char>, _>(fractional_part.or_not().map(Option::unwrap_or_default))
        .collect::<String>()
        .try_map(|content, span| {
            parse_number_content(&content).map_err(|msg| Simple::custom(span, msg))
        })
}

fn parse_number_content(content: &str) -> Result<Decimal, &'static str> {
    if content.ends_with(',') || content.contains(",,") || content.contains(",.") {
        return Err("Misplaced thousands separator");
    }
    let content = content.replace(',', "");
    Decimal::from_str_exact(&content).map_err(|_| "Failed to parse amount")
}

#[cfg(test)]
mod tests {
    use chumsky::prelude::end;
    use chumsky::Parser as _;
    use rstest::rstest;

    use super::super::testutils::test_parser;
    use super::*;

    #[rstest]
    #[case("500000.00", Decimal::new(50000000, 2))]
    #[case("-500000.00", Decimal::new(-50000000, 2))]
    #[case("+12.5", Decimal::new(125, 1))]
    #[case("23,000.00", Decimal::new(2300000, 2))]
    #[case("-1,617,453.61", Decimal::new(-161745361, 2))]
    #[case("42", Decimal::new(42, 0))]
    #[case("0.00", Decimal::new(0, 2))]
    #[case("1,000", Decimal::new(1000, 0))]
    fn valid_amount(#[case] input: &str, #[case] expected: Decimal) {
        test_parser(input, amount(), expected, "");
    }

    #[test]
    fn amount_with_rest() {
        test_parser("-23000.00 USD", amount(), Decimal::new(-2300000, 2), " USD");
    }

    #[rstest]
    #[case("")]
    #[case("-")]
    #[case(".5")]
    #[case("1.")]
    #[case(",100")]
    #[case("100,")]
    #[case("1,,000")]
    #[case("abc")]
    fn invalid_amount(#[case] input: &str) {
        assert!(amount().then_ignore(end()).parse(input).is_err());
    }

    #[test]
    fn rate() {
        test_parser("83.50", positive_amount(), Decimal::new(8350, 2), "");
        assert!(positive_amount().parse("0.00").is_err());
        assert!(positive_amount().parse("-1.5").is_err());
    }
}
