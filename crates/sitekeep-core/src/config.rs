//! Maintenance configuration
//!
//! Maps singleton tables to their canonical locale and role types to the
//! grants they must hold. Loaded from TOML:
//!
//! ```toml
//! canonical_locale = "en"
//!
//! [[singletons]]
//! table = "globals"
//!
//! [[singletons]]
//! table = "home-page"
//! locale = "en"
//!
//! [roles]
//! public = [
//!   { action = "api::global.global.find" },
//!   { action = "api::home-page.home-page.find" },
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::model::{GrantRequest, SingletonTable};

pub const DEFAULT_LOCALE: &str = "en";
pub const PUBLIC_ROLE: &str = "public";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Unknown singleton table: {value}")]
    UnknownTable { value: String },

    #[error("Singleton table listed twice: {table}")]
    DuplicateTable { table: SingletonTable },

    #[error("Locale for {target} must not be empty")]
    EmptyLocale { target: String },

    #[error("Invalid grant for role {role}: {reason}")]
    InvalidGrant { role: String, reason: String },
}

/// One configured singleton table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingletonEntry {
    pub table: String,
    /// Overrides `canonical_locale` for this table
    #[serde(default)]
    pub locale: Option<String>,
}

/// A singleton table resolved against the config's locale defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub table: SingletonTable,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    #[serde(default = "default_locale")]
    pub canonical_locale: String,

    #[serde(default = "default_singletons")]
    pub singletons: Vec<SingletonEntry>,

    /// Role type -> grants that role must hold
    #[serde(default = "default_roles")]
    pub roles: BTreeMap<String, Vec<GrantRequest>>,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_singletons() -> Vec<SingletonEntry> {
    SingletonTable::ALL
        .iter()
        .map(|t| SingletonEntry {
            table: t.table_name().to_string(),
            locale: None,
        })
        .collect()
}

fn default_roles() -> BTreeMap<String, Vec<GrantRequest>> {
    let mut grants: Vec<GrantRequest> = SingletonTable::ALL
        .iter()
        .map(|t| GrantRequest::new(format!("{}.find", t.uid())))
        .collect();

    for collection in ["event", "news-post", "program", "team-member", "partner"] {
        let uid = format!("api::{collection}.{collection}");
        grants.push(GrantRequest::new(format!("{uid}.find")));
        grants.push(GrantRequest::new(format!("{uid}.findOne")));
    }
    grants.push(GrantRequest::new(
        "api::contact-message.contact-message.create",
    ));

    let mut roles = BTreeMap::new();
    roles.insert(PUBLIC_ROLE.to_string(), grants);
    roles
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            canonical_locale: default_locale(),
            singletons: default_singletons(),
            roles: default_roles(),
        }
    }
}

impl MaintenanceConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: origin.clone(),
            source,
        })?;
        Self::from_toml_str(&text, &origin)
    }

    /// Parse and validate TOML text; `origin` names the source in errors
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: MaintenanceConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check table identifiers, locales and action ids
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tables()?;
        for (role, grants) in &self.roles {
            for grant in grants {
                grant.validate().map_err(|reason| ConfigError::InvalidGrant {
                    role: role.clone(),
                    reason,
                })?;
            }
        }
        Ok(())
    }

    /// Configured singleton tables with their effective locale, in order
    pub fn tables(&self) -> Result<Vec<TableTarget>, ConfigError> {
        if self.canonical_locale.trim().is_empty() {
            return Err(ConfigError::EmptyLocale {
                target: "canonical_locale".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(self.singletons.len());
        for entry in &self.singletons {
            let table: SingletonTable =
                entry
                    .table
                    .parse()
                    .map_err(|_| ConfigError::UnknownTable {
                        value: entry.table.clone(),
                    })?;
            if !seen.insert(table) {
                return Err(ConfigError::DuplicateTable { table });
            }
            let locale = entry
                .locale
                .clone()
                .unwrap_or_else(|| self.canonical_locale.clone());
            if locale.trim().is_empty() {
                return Err(ConfigError::EmptyLocale {
                    target: table.to_string(),
                });
            }
            targets.push(TableTarget { table, locale });
        }
        Ok(targets)
    }

    /// Effective locale for `table`, falling back to `canonical_locale`
    pub fn locale_for(&self, table: SingletonTable) -> String {
        self.singletons
            .iter()
            .find(|e| e.table.parse::<SingletonTable>().ok() == Some(table))
            .and_then(|e| e.locale.clone())
            .unwrap_or_else(|| self.canonical_locale.clone())
    }

    /// Grants configured for `role_type`; empty when the role is not listed
    pub fn grants_for(&self, role_type: &str) -> &[GrantRequest] {
        self.roles
            .get(role_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
