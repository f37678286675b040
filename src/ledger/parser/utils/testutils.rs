use chumsky::{
    error::Simple,
    prelude::{end, just},
    Parser as _,
};

/// Run `parser` on `input` and check that it produces `expected` and leaves exactly `rest` unparsed.
#[track_caller]
pub fn test_parser<T>(
    input: &str,
    parser: impl chumsky::Parser<char, T, Error = Simple<char>>,
    expected: T,
    rest: &str,
) where
    T: std::fmt::Debug + PartialEq,
{
    let parser = parser.then_ignore(just(rest)).then_ignore(end());
    let parsed = parser.parse(input).unwrap();
    assert_eq!(expected, parsed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_without_rest() {
        let parser = just::<char, _, Simple<char>>('a');
        test_parser("a", parser, 'a', "");
    }

    #[test]
    fn success_with_rest() {
        let parser = just::<char, _, Simple<char>>('a');
        test_parser("abc", parser, 'a', "bc");
    }

    #[test]
    #[should_panic]
    fn parser_does_not_match() {
        let parser = just::<char, _, Simple<char>>('a');
        test_parser("b", parser, 'a', "");
    }

    #[test]
    #[should_panic]
    fn unexpected_rest() {
        let parser = just::<char, _, Simple<char>>('a');
        test_parser("abc", parser, 'a', "");
    }
}
