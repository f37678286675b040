use std::{ops::Range, str::FromStr};

use chrono::NaiveDate;
use chumsky::{error::Simple, prelude::filter, prelude::just, Parser as _};

/// ISO date, `YYYY-MM-DD`
pub fn date() -> impl chumsky::Parser<char, NaiveDate, Error = Simple<char>> {
    let digit = || filter(|c: &char| c.is_ascii_digit());
    let year = digit().repeated().exactly(4).try_map(parse_number::<i32>);
    let month = digit().repeated().exactly(2).try_map(parse_number::<u32>);
    let day = digit().repeated().exactly(2).try_map(parse_number::<u32>);
    year.then_ignore(just('-'))
        .then(month)
        .then_ignore(just('-'))
        .then(day)
        .try_map(|((year, month), day), span| {
            NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| Simple::custom(span, "Invalid date"))
        })
        .labelled("date")
}

fn parse_number<N: FromStr>(digits: Vec<char>, span: Range<usize>) -> Result<N, Simple<char>> {
    digits
        .into_iter()
        .collect::<String>()
        .parse()
        .map_err(|_err| Simple::custom(span, "Failed to parse number"))
}
