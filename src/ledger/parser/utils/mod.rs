mod amount;
mod date;
mod token;
#[cfg(test)]
mod testutils;

pub use amount::{amount, positive_amount};
pub use date::date;
pub use token::{account_name, currency, line_end, quoted_string, whitespace};
#[cfg(test)]
pub use testutils::test_parser;
