//! # Categorization Module
//!
//! A categorization is a closed set of codes, each with a meaning, plus
//! descriptive metadata. Hierarchical categorizations also relate their codes
//! as parents and children.
//!
//! ## Module layout
//!
//! - `flat`: [`Categorization`], codes and metadata only
//! - `hierarchical`: [`HierarchicalCategorization`], adds the hierarchy graph
//!
//! Both implement [`CategorySystem`]. [`AnyCategorization`] holds either one
//! when the kind is only known at run time (e.g. after loading from disk).
//!
//! Instances are immutable. `extend*` builds a new, independent instance and
//! leaves the base untouched.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use climate_categories_core::{
//!     CategorySystem, Extension, HierarchicalCategorization, Metadata, Relations,
//! };
//!
//! let meta = Metadata::new("EX", "Example", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
//! let base = HierarchicalCategorization::new(
//!     meta,
//!     [("0", "Total"), ("1", "Energy"), ("2", "IPPU")],
//!     Relations::new().with("0", ["1", "2"]),
//!     true,
//! )
//! .unwrap();
//! assert_eq!(base.level("2").unwrap(), 2);
//!
//! let ext = Extension::new("waste").category("5", "Waste");
//! let derived = base
//!     .extend(ext, Some(Relations::new().with("0", ["5"])))
//!     .unwrap();
//! assert_eq!(derived.name(), "EX_waste");
//! assert_eq!(derived.children("0").unwrap(), ["1", "2", "5"]);
//! assert!(!base.contains("5"));
//! ```

mod flat;
mod hierarchical;

use crate::codes::{CodeStore, Keys};
use crate::error::Result;
use crate::extension::Extension;
use crate::metadata::Metadata;
use crate::table::{Table, TableRow};

pub use flat::Categorization;
pub use hierarchical::HierarchicalCategorization;

/// Query surface shared by every categorization
pub trait CategorySystem {
    fn metadata(&self) -> &Metadata;

    fn codes(&self) -> &CodeStore;

    /// True if parents and children are defined
    fn is_hierarchical(&self) -> bool;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Meaning of `code`, or `CodeNotFound`
    fn lookup(&self, code: &str) -> Result<&str> {
        self.codes().lookup(code)
    }

    fn get(&self, code: &str) -> Option<&str> {
        self.codes().get(code)
    }

    fn contains(&self, code: &str) -> bool {
        self.codes().contains(code)
    }

    /// All codes in construction order
    fn keys(&self) -> Keys<'_> {
        self.codes().keys()
    }

    /// `(code, meaning)` pairs in construction order
    fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.codes().iter()
    }

    fn len(&self) -> usize {
        self.codes().len()
    }

    fn is_empty(&self) -> bool {
        self.codes().is_empty()
    }

    /// One row per code with code and meaning
    fn to_table(&self) -> Table {
        Table::new(
            self.iter()
                .map(|(code, meaning)| TableRow {
                    code: code.to_string(),
                    meaning: meaning.to_string(),
                    level: None,
                })
                .collect(),
        )
    }
}

/// Either kind of categorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyCategorization {
    Flat(Categorization),
    Hierarchical(HierarchicalCategorization),
}

impl AnyCategorization {
    pub fn as_hierarchical(&self) -> Option<&HierarchicalCategorization> {
        match self {
            Self::Hierarchical(h) => Some(h),
            Self::Flat(_) => None,
        }
    }

    pub fn as_flat(&self) -> &Categorization {
        match self {
            Self::Flat(c) => c,
            Self::Hierarchical(h) => h.as_categorization(),
        }
    }

    /// Extend either kind with new codes only
    pub fn extend(&self, extension: Extension) -> Result<Self> {
        match self {
            Self::Flat(c) => c.extend(extension).map(Self::Flat),
            Self::Hierarchical(h) => h.extend(extension, None).map(Self::Hierarchical),
        }
    }
}

impl CategorySystem for AnyCategorization {
    fn metadata(&self) -> &Metadata {
        self.as_flat().metadata()
    }

    fn codes(&self) -> &CodeStore {
        self.as_flat().codes()
    }

    fn is_hierarchical(&self) -> bool {
        matches!(self, Self::Hierarchical(_))
    }

    fn to_table(&self) -> Table {
        match self {
            Self::Flat(c) => c.to_table(),
            Self::Hierarchical(h) => h.to_table(),
        }
    }
}

impl From<Categorization> for AnyCategorization {
    fn from(value: Categorization) -> Self {
        Self::Flat(value)
    }
}

impl From<HierarchicalCategorization> for AnyCategorization {
    fn from(value: HierarchicalCategorization) -> Self {
        Self::Hierarchical(value)
    }
}

impl std::fmt::Display for AnyCategorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Categorization {}>", self.name())
    }
}
