//! Closed catalog of launcher icons and their per-platform alias identifiers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of the icon shipped as the app's primary launcher entry.
pub const DEFAULT_ICON_ID: &str = "default";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Catalog construction and lookup errors.
pub enum CatalogError {
    /// The icon name was empty or whitespace.
    #[error("icon name must not be empty")]
    EmptyName,
    /// The icon name is not part of the catalog.
    #[error("unknown icon `{0}`")]
    UnknownIcon(String),
    /// Two catalog entries normalize to the same identifier.
    #[error("duplicate icon `{0}` in catalog")]
    DuplicateIcon(String),
    /// The catalog has no `default` entry.
    #[error("catalog is missing the `default` icon")]
    MissingDefault,
    /// A catalog entry has no Android component alias.
    #[error("icon `{0}` has an empty Android component")]
    EmptyComponent(String),
}

/// Case-normalized logical icon identifier.
///
/// Construction trims surrounding whitespace and lowercases the name, so `Red`, `red`, and
/// ` RED ` compare equal. Membership in a particular [`IconCatalog`] is checked separately by
/// [`IconCatalog::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IconIdentifier(String);

impl IconIdentifier {
    /// Normalizes `name` into an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptyName`] when `name` is empty after trimming.
    pub fn new(name: &str) -> Result<Self, CatalogError> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        Ok(Self(normalized))
    }

    /// Returns the identifier of the primary launcher icon.
    pub fn default_icon() -> Self {
        Self(DEFAULT_ICON_ID.to_string())
    }

    /// Returns whether this is the primary launcher icon.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ICON_ID
    }

    /// Returns the normalized identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IconIdentifier {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<IconIdentifier> for String {
    fn from(value: IconIdentifier) -> Self {
        value.0
    }
}

impl std::fmt::Display for IconIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One icon and the OS identifiers that present it.
pub struct IconEntry {
    /// Logical identifier used by callers.
    pub id: IconIdentifier,
    /// Activity or activity-alias class, relative (`.Red`) or fully qualified.
    pub android_component: String,
    /// Alternate icon name registered in the iOS bundle. Ignored for the default icon, which
    /// always maps to "no alternate icon".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios_alternate_name: Option<String>,
}

impl IconEntry {
    /// Returns the iOS alternate icon name, `None` meaning the primary icon.
    pub fn ios_name(&self) -> Option<&str> {
        if self.id.is_default() {
            None
        } else {
            self.ios_alternate_name.as_deref()
        }
    }
}

/// Ordered, closed set of icons with `default` always first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<IconEntry>", into = "Vec<IconEntry>")]
pub struct IconCatalog {
    entries: Vec<IconEntry>,
}

impl IconCatalog {
    /// Starts a catalog whose default icon is backed by `default_android_component`.
    pub fn builder(default_android_component: impl Into<String>) -> IconCatalogBuilder {
        IconCatalogBuilder {
            entries: vec![RawEntry {
                name: DEFAULT_ICON_ID.to_string(),
                android_component: default_android_component.into(),
                ios_alternate_name: None,
            }],
        }
    }

    /// Validates `entries` and moves the default icon to the front.
    ///
    /// # Errors
    ///
    /// Returns an error when an identifier is duplicated, a component is empty, or the default
    /// icon is missing.
    pub fn from_entries(entries: Vec<IconEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut default = None;
        let mut variants = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.id.clone()) {
                return Err(CatalogError::DuplicateIcon(entry.id.to_string()));
            }
            if entry.android_component.trim().is_empty() {
                return Err(CatalogError::EmptyComponent(entry.id.to_string()));
            }
            if entry.id.is_default() {
                default = Some(entry);
            } else {
                variants.push(entry);
            }
        }
        let default = default.ok_or(CatalogError::MissingDefault)?;
        let mut ordered = Vec::with_capacity(variants.len() + 1);
        ordered.push(default);
        ordered.extend(variants);
        Ok(Self { entries: ordered })
    }

    /// Resolves a raw, case-insensitive icon name against the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptyName`] for blank input and [`CatalogError::UnknownIcon`]
    /// for names outside the catalog.
    pub fn resolve(&self, name: &str) -> Result<IconIdentifier, CatalogError> {
        let id = IconIdentifier::new(name)?;
        if self.contains(&id) {
            Ok(id)
        } else {
            Err(CatalogError::UnknownIcon(name.trim().to_string()))
        }
    }

    /// Returns whether `id` is part of the catalog.
    pub fn contains(&self, id: &IconIdentifier) -> bool {
        self.entry(id).is_some()
    }

    /// Returns the entry for `id`.
    pub fn entry(&self, id: &IconIdentifier) -> Option<&IconEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Iterates every identifier in catalog order, default first.
    pub fn all(&self) -> impl ExactSizeIterator<Item = &IconIdentifier> + '_ {
        self.entries.iter().map(|entry| &entry.id)
    }

    /// Returns every entry in catalog order.
    pub fn entries(&self) -> &[IconEntry] {
        &self.entries
    }

    /// Returns the default icon identifier.
    pub fn default_icon(&self) -> &IconIdentifier {
        &self.entries[0].id
    }

    /// Finds the icon registered under an iOS alternate name (case-insensitive).
    pub fn find_by_ios_name(&self, alternate_name: &str) -> Option<&IconIdentifier> {
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .ios_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(alternate_name))
            })
            .map(|entry| &entry.id)
    }
}

impl TryFrom<Vec<IconEntry>> for IconCatalog {
    type Error = CatalogError;

    fn try_from(value: Vec<IconEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(value)
    }
}

impl From<IconCatalog> for Vec<IconEntry> {
    fn from(value: IconCatalog) -> Self {
        value.entries
    }
}

#[derive(Debug, Clone)]
struct RawEntry {
    name: String,
    android_component: String,
    ios_alternate_name: Option<String>,
}

/// Builder returned by [`IconCatalog::builder`].
#[derive(Debug, Clone)]
pub struct IconCatalogBuilder {
    entries: Vec<RawEntry>,
}

impl IconCatalogBuilder {
    /// Adds a named variant backed by an Android alias and an iOS alternate icon name.
    #[must_use]
    pub fn variant(
        mut self,
        name: impl Into<String>,
        android_component: impl Into<String>,
        ios_alternate_name: impl Into<String>,
    ) -> Self {
        self.entries.push(RawEntry {
            name: name.into(),
            android_component: android_component.into(),
            ios_alternate_name: Some(ios_alternate_name.into()),
        });
        self
    }

    /// Validates and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error for blank or duplicate names and empty components.
    pub fn build(self) -> Result<IconCatalog, CatalogError> {
        let entries = self
            .entries
            .into_iter()
            .map(|raw| {
                Ok(IconEntry {
                    id: IconIdentifier::new(&raw.name)?,
                    android_component: raw.android_component,
                    ios_alternate_name: raw.ios_alternate_name,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        IconCatalog::from_entries(entries)
    }
}
