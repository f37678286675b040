use std::collections::BTreeMap;

use super::AccountClass;
use crate::ledger::AccountDeclaration;

/// How a target account name was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    /// The mapping table has an entry for exactly this account
    Exact,
    /// Inherited from the mapping of the given ancestor account
    Prefix(String),
    /// Not in the mapping table, the name was derived from the account path
    Derived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub target: String,
    pub source: MappingSource,
}

/// An account declaration translated into the backend's naming scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedAccount {
    pub source_name: String,
    pub target_identifier: String,
    pub parent_target_identifier: String,
    pub class: AccountClass,
    pub currency: String,
    pub mapping_source: MappingSource,
}

/// Maps ledger account paths to backend account names.
///
/// The mapper is pure: the same path always maps to the same name.
#[derive(Debug, Clone)]
pub struct AccountMapper {
    mappings: BTreeMap<String, String>,
    suffix: String,
    default_parents: BTreeMap<AccountClass, String>,
}

impl AccountMapper {
    pub fn new(mappings: BTreeMap<String, String>, suffix: impl Into<String>) -> Self {
        Self {
            mappings,
            suffix: suffix.into(),
            default_parents: BTreeMap::new(),
        }
    }

    /// Parents to use for top-level accounts instead of `"<Class> - <suffix>"`
    pub fn with_default_parents(mut self, default_parents: BTreeMap<AccountClass, String>) -> Self {
        self.default_parents = default_parents;
        self
    }

    pub fn resolve(&self, path: &str) -> Mapping {
        if let Some(target) = self.mappings.get(path) {
            return Mapping {
                target: target.clone(),
                source: MappingSource::Exact,
            };
        }
        let longest_prefix = self
            .mappings
            .iter()
            .filter(|(key, _)| path.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len());
        if let Some((key, target)) = longest_prefix {
            return Mapping {
                target: target.clone(),
                source: MappingSource::Prefix(key.clone()),
            };
        }
        Mapping {
            target: format!("{} - {}", path.replace(':', " - "), self.suffix),
            source: MappingSource::Derived,
        }
    }

    pub fn target(&self, path: &str) -> String {
        self.resolve(path).target
    }

    /// Backend name of the parent of `path`. Top-level accounts hang below a per-class default.
    pub fn parent(&self, path: &str, class: AccountClass) -> String {
        match path.rsplit_once(':') {
            Some((parent_path, _)) => self.target(parent_path),
            None => self
                .default_parents
                .get(&class)
                .cloned()
                .unwrap_or_else(|| format!("{} - {}", class, self.suffix)),
        }
    }

    pub fn map_account(&self, account: &AccountDeclaration, base_currency: &str) -> MappedAccount {
        let mapping = self.resolve(&account.name);
        if mapping.source == MappingSource::Derived {
            log::info!(
                "No mapping configured for {}, using derived name {}",
                account.name,
                mapping.target,
            );
        }
        MappedAccount {
            source_name: account.name.clone(),
            parent_target_identifier: self.parent(&account.name, account.class),
            target_identifier: mapping.target,
            class: account.class,
            currency: account
                .declared_currency
                .clone()
                .unwrap_or_else(|| base_currency.to_string()),
            mapping_source: mapping.source,
        }
    }
}
