use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Migrate the accounts and transactions of a Beancount ledger into a double-entry accounting backend.
#[derive(Parser, Debug)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the accounts and journal entries a migration would create, without contacting the backend
    Plan {
        /// Path to the migration config file
        #[clap(short, long)]
        config: PathBuf,

        /// Path to the Beancount ledger
        ledger: PathBuf,
    },

    /// Print the backend account hierarchy the ledger's accounts map to
    Accounts {
        /// Path to the migration config file
        #[clap(short, long)]
        config: PathBuf,

        /// Path to the Beancount ledger
        ledger: PathBuf,
    },

    /// Report ledger lines that can't be migrated
    Check {
        /// Path to the Beancount ledger
        ledger: PathBuf,
    },

    /// Create a config file with a mapping entry for every account in the ledger
    InitConfig {
        /// Company the accounts belong to in the backend. Asked interactively if missing.
        #[clap(long)]
        company: Option<String>,

        /// Suffix appended to backend account names. Asked interactively if missing.
        #[clap(long)]
        suffix: Option<String>,

        /// Path to the Beancount ledger
        ledger: PathBuf,

        /// Where to write the config file
        output: PathBuf,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
