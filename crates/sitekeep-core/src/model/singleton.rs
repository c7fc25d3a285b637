use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The singleton content types whose tables must hold exactly one row
///
/// Table names are only ever produced from this closed set, which is what
/// makes it safe for the store layer to splice them into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SingletonTable {
    Globals,
    HomePage,
    OrganizationInfo,
    DonationsPage,
}

impl SingletonTable {
    /// Every singleton table, in default reconciliation order
    pub const ALL: [SingletonTable; 4] = [
        SingletonTable::Globals,
        SingletonTable::HomePage,
        SingletonTable::OrganizationInfo,
        SingletonTable::DonationsPage,
    ];

    /// Physical table name in the CMS store
    pub fn table_name(&self) -> &'static str {
        match self {
            SingletonTable::Globals => "globals",
            SingletonTable::HomePage => "home_pages",
            SingletonTable::OrganizationInfo => "organization_infos",
            SingletonTable::DonationsPage => "donations_pages",
        }
    }

    /// Content-type uid as the CMS names it
    pub fn uid(&self) -> &'static str {
        match self {
            SingletonTable::Globals => "api::global.global",
            SingletonTable::HomePage => "api::home-page.home-page",
            SingletonTable::OrganizationInfo => "api::organization-info.organization-info",
            SingletonTable::DonationsPage => "api::donations-page.donations-page",
        }
    }

    /// Tables whose emptiness after a restore indicates a bad dump
    pub fn is_load_bearing(&self) -> bool {
        matches!(self, SingletonTable::Globals | SingletonTable::HomePage)
    }
}

impl fmt::Display for SingletonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for SingletonTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "global" | "globals" => Ok(SingletonTable::Globals),
            "home_page" | "home_pages" => Ok(SingletonTable::HomePage),
            "organization_info" | "organization_infos" => Ok(SingletonTable::OrganizationInfo),
            "donations_page" | "donations_pages" => Ok(SingletonTable::DonationsPage),
            other => Err(format!("unknown singleton table '{}'", other)),
        }
    }
}

impl TryFrom<String> for SingletonTable {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SingletonTable> for String {
    fn from(table: SingletonTable) -> Self {
        table.table_name().to_string()
    }
}

/// A timestamp column as the store holds it
///
/// Rows written by this tool carry epoch milliseconds, but restored dumps
/// often carry ISO text (`'2025-01-01'`). Both are kept as found; only
/// presence matters to reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredTime {
    Millis(i64),
    Text(String),
}

impl StoredTime {
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            StoredTime::Millis(ms) => Some(*ms),
            StoredTime::Text(_) => None,
        }
    }
}

impl fmt::Display for StoredTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredTime::Millis(ms) => write!(f, "{}", ms),
            StoredTime::Text(text) => f.write_str(text),
        }
    }
}

/// One stored row of a singleton table
///
/// Only the bookkeeping columns are loaded; content columns are never read
/// or written by maintenance passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingletonRow {
    pub id: i64,
    pub document_id: Option<String>,
    pub locale: Option<String>,
    /// `None` marks a draft
    pub published_at: Option<StoredTime>,
    pub created_at: Option<StoredTime>,
    pub updated_at: Option<StoredTime>,
}

impl SingletonRow {
    /// Minimal row, handy for planning and tests
    pub fn new(id: i64, published_at: Option<i64>) -> Self {
        Self {
            id,
            document_id: None,
            locale: None,
            published_at: published_at.map(StoredTime::Millis),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}
