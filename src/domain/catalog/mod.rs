//! Catalog domain: the bulk coin listing used to resolve search input.
//!
//! The catalog maps human-readable coin names to the stable identifiers the
//! markets endpoint filters on. It is loaded once and read-only afterwards.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::shared::CoinId;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── CatalogEntry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub identifier: CoinId,
    pub display_name: String,
    pub symbol: String,
}

impl CatalogEntry {
    pub fn new(identifier: impl Into<CoinId>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            symbol: String::new(),
        }
    }
}

/// How display names are compared during lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    CaseInsensitive,
    CaseSensitive,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Ordered, read-only name → identifier table.
///
/// Lookups return the first match in catalog order, so duplicate display names
/// resolve deterministically.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    /// `entries[i].display_name` case-folded, computed once at load.
    folded_names: Vec<String>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let folded_names = entries
            .iter()
            .map(|e| e.display_name.to_lowercase())
            .collect();
        Self {
            entries,
            folded_names,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier of the first entry whose display name equals `name`, ignoring case.
    pub fn find_by_exact_name(&self, name: &str) -> Option<&CoinId> {
        self.find_by_exact_name_with(name, MatchMode::CaseInsensitive)
    }

    pub fn find_by_exact_name_with(&self, name: &str, mode: MatchMode) -> Option<&CoinId> {
        match mode {
            MatchMode::CaseSensitive => self
                .entries
                .iter()
                .find(|e| e.display_name == name)
                .map(|e| &e.identifier),
            MatchMode::CaseInsensitive => {
                let folded = name.to_lowercase();
                self.folded_names
                    .iter()
                    .position(|n| *n == folded)
                    .map(|i| &self.entries[i].identifier)
            }
        }
    }

    /// All entries whose display name starts with `prefix`, ignoring case.
    ///
    /// An empty prefix matches nothing: the suggestion list stays empty until
    /// the user types.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&CatalogEntry> {
        self.find_by_prefix_with(prefix, MatchMode::CaseInsensitive)
    }

    pub fn find_by_prefix_with(&self, prefix: &str, mode: MatchMode) -> Vec<&CatalogEntry> {
        if prefix.is_empty() {
            return Vec::new();
        }
        match mode {
            MatchMode::CaseSensitive => self
                .entries
                .iter()
                .filter(|e| e.display_name.starts_with(prefix))
                .collect(),
            MatchMode::CaseInsensitive => {
                let folded = prefix.to_lowercase();
                self.folded_names
                    .iter()
                    .zip(&self.entries)
                    .filter(|(name, _)| name.starts_with(&folded))
                    .map(|(_, entry)| entry)
                    .collect()
            }
        }
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// A catalog row that cannot be used for search resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntryError {
    MissingIdentifier,
    MissingName(String),
}

impl fmt::Display for CatalogEntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogEntryError::MissingIdentifier => write!(f, "Missing identifier"),
            CatalogEntryError::MissingName(id) => write!(f, "Missing name for {id}"),
        }
    }
}

impl std::error::Error for CatalogEntryError {}
