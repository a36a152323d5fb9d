pub mod categorization;
pub mod codes;
pub mod config;
pub mod error;
pub mod extension;
pub mod hierarchy;
pub mod library;
pub mod loader;
pub mod metadata;
pub mod table;

pub use categorization::{
    AnyCategorization, CategorySystem, Categorization, HierarchicalCategorization,
};
pub use codes::{CodeStore, Keys};
pub use config::{Config, ExportConfig, LibraryConfig};
pub use error::{CategorizationError, Result};
pub use extension::Extension;
pub use hierarchy::{HierarchyGraph, Relations};
pub use library::CategorizationLibrary;
pub use loader::{is_categorization_dir, load_dir, DATA_FILE, HIERARCHY_FILE, METADATA_FILE};
pub use metadata::Metadata;
pub use table::{Table, TableRow};
