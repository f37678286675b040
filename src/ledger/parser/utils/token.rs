use chumsky::{
    error::Simple,
    prelude::{any, end, filter, just, none_of, one_of},
    Parser as _,
};

/// One or more spaces or tabs. Never crosses a line break.
pub fn whitespace() -> impl chumsky::Parser<char, (), Error = Simple<char>> {
    one_of(" \t")
        .repeated()
        .at_least(1)
        .ignored()
        .labelled("whitespace")
}

/// Hierarchical account name like `Assets:Cash:ICICI`
pub fn account_name() -> impl chumsky::Parser<char, String, Error = Simple<char>> {
    let segment = filter(|c: &char| c.is_alphanumeric())
        .chain(filter(|c: &char| c.is_alphanumeric() || *c == '-' || *c == '_').repeated())
        .collect::<String>();
    segment
        .separated_by(just(':'))
        .at_least(1)
        .map(|segments| segments.join(":"))
        .labelled("account name")
}

/// Commodity symbol like `USD` or `VBMPX`
pub fn currency() -> impl chumsky::Parser<char, String, Error = Simple<char>> {
    filter(|c: &char| c.is_ascii_uppercase())
        .chain(
            filter(|c: &char| c.is_ascii_uppercase() || c.is_ascii_digit() || "'._-".contains(*c))
                .repeated(),
        )
        .collect::<String>()
        .labelled("currency")
}

/// Double-quoted string, `\"` and `\\` are unescaped
pub fn quoted_string() -> impl chumsky::Parser<char, String, Error = Simple<char>> {
    let escaped = just('\\').ignore_then(any());
    escaped
        .or(none_of("\\\""))
        .repeated()
        .delimited_by(just('"'), just('"'))
        .collect::<String>()
        .labelled("quoted string")
}

/// End of the line content, optionally preceded by whitespace and a `;` comment
pub fn line_end() -> impl chumsky::Parser<char, (), Error = Simple<char>> {
    let comment = just(';').then(any().repeated()).ignored();
    one_of(" \t")
        .repeated()
        .ignore_then(comment.or_not())
        .ignore_then(end())
        .labelled("end of line")
}

#[cfg(test)]
mod tests {
    use chumsky::Parser as _;
    use rstest::rstest;

    use super::super::testutils::test_parser;
    use super::*;

    #[rstest]
    #[case("Assets:Cash:ICICI")]
    #[case("Equity:Opening-Balances")]
    #[case("Assets:Upwork:Escrow:Mainland:1851")]
    #[case("Expenses:Travel_2024")]
    #[case("Assets")]
    fn valid_account_name(#[case] input: &str) {
        test_parser(input, account_name(), input.to_string(), "");
    }

    #[test]
    fn account_name_stops_at_whitespace() {
        test_parser(
            "Assets:Cash  500.00 INR",
            account_name(),
            "Assets:Cash".to_string(),
            "  500.00 INR",
        );
    }

    #[rstest]
    #[case(":Assets")]
    #[case("-Assets")]
    #[case(" Assets")]
    fn invalid_account_name(#[case] input: &str) {
        assert!(account_name().parse(input).is_err());
    }

    #[rstest]
    #[case("INR")]
    #[case("USD")]
    #[case("VBMPX")]
    #[case("BRK.B")]
    fn valid_currency(#[case] input: &str) {
        test_parser(input, currency(), input.to_string(), "");
    }

    #[test]
    fn currency_stops_at_lowercase() {
        test_parser("USDollar", currency(), "USD".to_string(), "ollar");
        assert!(currency().parse("usd").is_err());
        assert!(currency().parse("1USD").is_err());
    }

    #[test]
    fn quoted() {
        test_parser(
            "\"Opening balance\"",
            quoted_string(),
            "Opening balance".to_string(),
            "",
        );
        test_parser(
            r#""Client \"Acme\" invoice" rest"#,
            quoted_string(),
            "Client \"Acme\" invoice".to_string(),
            " rest",
        );
        test_parser("\"\"", quoted_string(), String::new(), "");
        assert!(quoted_string().parse("\"unterminated").is_err());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t; a comment")]
    #[case("; a comment")]
    fn valid_line_end(#[case] input: &str) {
        test_parser(input, line_end(), (), "");
    }

    #[test]
    fn line_end_rejects_content() {
        assert!(line_end().parse("  INR").is_err());
    }
}
