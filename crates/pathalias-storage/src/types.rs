//! Filter types for the alias storage traits.

use serde::{Deserialize, Serialize};

use pathalias_core::{AliasId, AliasRecord, Language};

/// A conjunction filter over alias records.
///
/// Every set field must match; unset fields match anything. An empty filter
/// matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasFilter {
    /// Match the storage-assigned id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AliasId>,
    /// Match the system path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Match the public alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Match the exact language code (no fallback).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl AliasFilter {
    /// Creates a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by record id.
    #[must_use]
    pub fn with_id(mut self, id: AliasId) -> Self {
        self.id = Some(id);
        self
    }

    /// Filters by system path.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Filters by public alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Filters by exact language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<Language>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.source.is_none() && self.alias.is_none() && self.language.is_none()
    }

    /// Returns `true` if `record` matches every set field.
    #[must_use]
    pub fn matches(&self, record: &AliasRecord) -> bool {
        if let Some(id) = self.id
            && record.id != Some(id)
        {
            return false;
        }
        if let Some(source) = &self.source
            && &record.source != source
        {
            return false;
        }
        if let Some(alias) = &self.alias
            && &record.alias != alias
        {
            return false;
        }
        if let Some(language) = &self.language
            && &record.language != language
        {
            return false;
        }
        true
    }
}
