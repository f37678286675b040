use anyhow::{anyhow, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::accounts::{AccountClass, AccountMapper};
use crate::ledger::{self, Ledger};
use crate::migration::{MigrationOptions, Mode};

/// Placeholder in mapping targets and default parents that is replaced with the namespace suffix
pub const SUFFIX_PLACEHOLDER: &str = "{suffix}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub company: String,
    /// Appended to every derived backend account name, e.g. `PT` in `Assets - Cash - PT`
    pub namespace_suffix: String,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default)]
    pub auto_submit: bool,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Ledger account (or ancestor) to backend account name
    #[serde(default)]
    pub account_mappings: BTreeMap<String, String>,
    /// Parents for top-level accounts, per class
    #[serde(default)]
    pub default_parents: BTreeMap<AccountClass, String>,
}

fn default_base_currency() -> String {
    "INR".to_string()
}

fn default_dry_run() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

impl Config {
    /// Load a config file and replace the suffix placeholders
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| anyhow!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| anyhow!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config.resolve_placeholders())
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self)?;
        tokio::fs::write(path, serialized)
            .await
            .with_context(|| anyhow!("Failed to write config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.company.trim().is_empty(), "company must not be empty");
        ensure!(
            !self.namespace_suffix.trim().is_empty(),
            "namespace_suffix must not be empty"
        );
        ensure!(self.concurrency >= 1, "concurrency must be at least 1");
        ensure!(
            ledger::is_valid_currency(&self.base_currency),
            "base_currency {:?} is not a valid currency",
            self.base_currency
        );
        for (account, target) in &self.account_mappings {
            ensure!(
                ledger::is_valid_account_name(account),
                "Mapping key {:?} is not a valid account name",
                account
            );
            ensure!(
                !target.trim().is_empty(),
                "Mapping for {} must not be empty",
                account
            );
        }
        for (class, parent) in &self.default_parents {
            ensure!(
                !parent.trim().is_empty(),
                "Default parent for {} must not be empty",
                class
            );
        }
        Ok(())
    }

    fn resolve_placeholders(mut self) -> Self {
        let suffix = self.namespace_suffix.clone();
        let resolve = |value: &mut String| *value = value.replace(SUFFIX_PLACEHOLDER, &suffix);
        self.account_mappings.values_mut().for_each(resolve);
        self.default_parents.values_mut().for_each(resolve);
        self
    }

    /// An initial config that maps every account opened in the ledger to its derived name
    pub fn bootstrap(company: &str, namespace_suffix: &str, ledger: &Ledger) -> Self {
        let derive = AccountMapper::new(BTreeMap::new(), SUFFIX_PLACEHOLDER);
        Self {
            company: company.to_string(),
            namespace_suffix: namespace_suffix.to_string(),
            base_currency: default_base_currency(),
            dry_run: default_dry_run(),
            auto_submit: false,
            concurrency: default_concurrency(),
            account_mappings: ledger
                .accounts
                .iter()
                .map(|account| (account.name.clone(), derive.target(&account.name)))
                .collect(),
            default_parents: BTreeMap::new(),
        }
    }

    pub fn mapper(&self) -> AccountMapper {
        AccountMapper::new(self.account_mappings.clone(), &self.namespace_suffix)
            .with_default_parents(self.default_parents.clone())
    }

    pub fn migration_options(&self) -> MigrationOptions {
        MigrationOptions {
            mode: if self.dry_run { Mode::DryRun } else { Mode::Live },
            auto_submit: self.auto_submit,
            concurrency: self.concurrency,
        }
    }
}

/// Open `initial` in the user's editor and return the validated result
pub fn prompt_edit_config(initial: &Config) -> Result<Config> {
    let serialized = serde_yaml::to_string(initial)?;
    let Some(edited) = dialoguer::Editor::new().extension(".yaml").edit(&serialized)? else {
        return Err(anyhow!("You did not save the edits, please try again"));
    };
    let new_config: Config = serde_yaml::from_str(&edited)?;
    new_config.validate()?;

    Ok(new_config)
}
