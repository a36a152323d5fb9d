use crate::codes::CodeStore;
use crate::error::{CategorizationError, Result};
use crate::extension::Extension;
use crate::metadata::Metadata;

use super::CategorySystem;

/// A categorization without hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorization {
    metadata: Metadata,
    codes: CodeStore,
}

impl Categorization {
    /// Build from metadata and `(code, meaning)` pairs.
    ///
    /// # Errors
    /// - `DuplicateCode` if a code appears twice
    /// - `EmptyCategorization` if no codes are given
    pub fn new<I, K, V>(metadata: Metadata, categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let codes = CodeStore::new(categories)?;
        Self::from_parts(metadata, codes)
    }

    pub(crate) fn from_parts(metadata: Metadata, codes: CodeStore) -> Result<Self> {
        if codes.is_empty() {
            return Err(CategorizationError::EmptyCategorization {
                name: metadata.name,
            });
        }
        Ok(Self { metadata, codes })
    }

    /// Derive a new categorization holding these codes plus the extension's.
    ///
    /// The result is named `"{name}_{extension name}"`, its institution is
    /// unknown and its version is kept. `self` is not modified.
    pub fn extend(&self, extension: Extension) -> Result<Self> {
        let (metadata, codes) = self.extended_parts(&extension)?;
        tracing::debug!(
            base = %self.metadata.name,
            name = %metadata.name,
            added = extension.categories().len(),
            "extended categorization"
        );
        Ok(Self { metadata, codes })
    }

    /// Metadata and code store of `self` extended by `extension`
    pub(crate) fn extended_parts(&self, extension: &Extension) -> Result<(Metadata, CodeStore)> {
        extension.validate()?;
        let codes = self.codes.merged(extension.categories())?;
        Ok((self.metadata.extended(extension), codes))
    }

    /// Same categorization with a known institution
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.metadata.institution = Some(institution.into());
        self
    }
}

impl CategorySystem for Categorization {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn codes(&self) -> &CodeStore {
        &self.codes
    }

    fn is_hierarchical(&self) -> bool {
        false
    }
}

impl std::fmt::Display for Categorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Categorization {}>", self.metadata.name)
    }
}
