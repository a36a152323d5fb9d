use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::extension::Extension;

/// Descriptive metadata of a categorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Unique name, e.g. "IPCC2006"
    pub name: String,
    /// Citable reference(s)
    pub references: String,
    /// Short descriptive title
    pub title: String,
    /// Notes for humans
    pub comment: String,
    /// Where the categorization originates. Unknown for derived categorizations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    /// Date of the last change
    pub last_update: NaiveDate,
    /// Version, if there are multiple versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Metadata {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        last_update: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            references: String::new(),
            title: title.into(),
            comment: String::new(),
            institution: None,
            last_update,
            version: None,
        }
    }

    pub fn with_references(mut self, references: impl Into<String>) -> Self {
        self.references = references.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Metadata of the categorization derived from this one by `extension`.
    ///
    /// `references` and `version` are kept, `institution` is cleared.
    pub(crate) fn extended(&self, extension: &Extension) -> Self {
        let name = extension.name();
        let title_suffix = extension
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| format!(" + {}", name));
        let comment_suffix = extension
            .comment()
            .map(str::to_string)
            .unwrap_or_else(|| format!(" extended by {}", name));

        Self {
            name: format!("{}_{}", self.name, name),
            references: self.references.clone(),
            title: format!("{}{}", self.title, title_suffix),
            comment: format!("{}{}", self.comment, comment_suffix),
            institution: None,
            last_update: extension
                .last_update()
                .unwrap_or_else(|| Utc::now().date_naive()),
            version: self.version.clone(),
        }
    }
}
