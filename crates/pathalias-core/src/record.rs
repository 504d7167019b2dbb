//! The alias record: one row of the alias table.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::language::Language;
use crate::path::first_segment;

/// Storage-assigned record identifier. Monotonically increasing within a
/// backend; never reused.
pub type AliasId = u64;

/// A single alias mapping: an internal system path and its public alias in
/// one language.
///
/// `id` is `None` until the record has been saved once; save dispatches
/// insert-or-update on its presence and writes the assigned id back into the
/// record. `first_segment` is derived from `source` on every save and is
/// only used to build the whitelist cache - it is never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    /// Storage-assigned identifier; `None` for a record not yet saved.
    pub id: Option<AliasId>,
    /// The internal system path, e.g. `node/42`.
    pub source: String,
    /// The public-facing path, e.g. `about-us`.
    pub alias: String,
    /// The language this alias applies to, or the neutral sentinel.
    pub language: Language,
    /// First segment of `source`, recomputed on save.
    pub first_segment: String,
}

impl AliasRecord {
    /// Creates a new unsaved record. The first segment is derived from
    /// `source` immediately.
    pub fn new(
        source: impl Into<String>,
        alias: impl Into<String>,
        language: impl Into<Language>,
    ) -> Self {
        let source = source.into();
        let first = first_segment(&source).to_string();
        Self {
            id: None,
            source,
            alias: alias.into(),
            language: language.into(),
            first_segment: first,
        }
    }

    /// Sets the record id (builder form, used by tests and backends).
    #[must_use]
    pub fn with_id(mut self, id: AliasId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns `true` if this record has never been saved.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Recomputes `first_segment` from the current `source`. Backends call
    /// this on every save.
    pub fn refresh_first_segment(&mut self) {
        self.first_segment = first_segment(&self.source).to_string();
    }

    /// Validates the path shape constraints: `source` and `alias` must be
    /// non-empty and must not start with a slash.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError`] describing the first violated constraint.
    /// Validation runs before any storage call is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.source.is_empty() {
            return Err(CoreError::invalid_record("source must not be empty"));
        }
        if self.alias.is_empty() {
            return Err(CoreError::invalid_record("alias must not be empty"));
        }
        if self.source.starts_with('/') {
            return Err(CoreError::invalid_path(self.source.clone()));
        }
        if self.alias.starts_with('/') {
            return Err(CoreError::invalid_path(self.alias.clone()));
        }
        Ok(())
    }
}
