pub mod accounts;
pub mod args;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod normalize;
pub mod rates;
mod terminal;
