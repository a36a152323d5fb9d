//! Extension description
//!
//! What to add to an existing categorization: new codes with their meanings
//! and adjustments to the derived metadata.

use chrono::NaiveDate;

use crate::error::{CategorizationError, Result};

/// New categories plus metadata for a derived categorization.
///
/// ```rust
/// use climate_categories_core::Extension;
///
/// let ext = Extension::new("PRIMAP")
///     .category("1.A.1.a.i", "Electricity generation")
///     .category("1.A.1.a.ii", "Combined heat and power");
/// assert_eq!(ext.categories().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    name: String,
    categories: Vec<(String, String)>,
    title: Option<String>,
    comment: Option<String>,
    last_update: Option<NaiveDate>,
}

impl Extension {
    /// The derived categorization will be named `"{base}_{name}"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
            title: None,
            comment: None,
            last_update: None,
        }
    }

    /// Add one new code
    pub fn category(mut self, code: impl Into<String>, meaning: impl Into<String>) -> Self {
        self.categories.push((code.into(), meaning.into()));
        self
    }

    /// Add several new codes
    pub fn categories_from<I, K, V>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.categories
            .extend(categories.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Appended to the base title instead of `" + {name}"`
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appended to the base comment instead of `" extended by {name}"`
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Defaults to today
    pub fn with_last_update(mut self, last_update: NaiveDate) -> Self {
        self.last_update = Some(last_update);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &[(String, String)] {
        &self.categories
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn last_update(&self) -> Option<NaiveDate> {
        self.last_update
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CategorizationError::InvalidExtensionName {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}
