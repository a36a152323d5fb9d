//! Categorization Library
//!
//! Name-keyed registry of categorizations, usually filled by scanning the
//! directories listed in the config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::categorization::{AnyCategorization, CategorySystem};
use crate::config::Config;
use crate::error::{CategorizationError, Result};
use crate::loader::{self, METADATA_FILE};

#[derive(Debug, Clone, Default)]
pub struct CategorizationLibrary {
    categorizations: BTreeMap<String, AnyCategorization>,
}

impl CategorizationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the directories from `config.library.paths`, `~` expanded
    pub fn from_config(config: &Config) -> Self {
        Self::scan(&config.library.resolved_paths())
    }

    /// Load every categorization set found below `dirs`.
    ///
    /// Sets that fail to load, and sets whose name is already taken, are
    /// skipped with a warning.
    pub fn scan<P: AsRef<Path>>(dirs: &[P]) -> Self {
        let mut library = Self::new();

        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                tracing::warn!(path = %dir.display(), "library path is not a directory");
                continue;
            }

            for set_dir in find_sets(dir) {
                let loaded = loader::load_dir(&set_dir).and_then(|cat| library.insert(cat));
                if let Err(e) = loaded {
                    tracing::warn!(path = %set_dir.display(), error = %e, "skipping categorization");
                }
            }
        }

        tracing::info!(count = library.len(), "categorization library ready");
        library
    }

    /// Register a categorization under its name
    pub fn insert(&mut self, categorization: impl Into<AnyCategorization>) -> Result<()> {
        let categorization = categorization.into();
        let name = categorization.name().to_string();
        if self.categorizations.contains_key(&name) {
            return Err(CategorizationError::DuplicateCategorization { name });
        }
        self.categorizations.insert(name, categorization);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&AnyCategorization> {
        self.categorizations
            .get(name)
            .ok_or_else(|| CategorizationError::CategorizationNotFound {
                name: name.to_string(),
            })
    }

    /// Names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.categorizations.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnyCategorization> {
        self.categorizations.values()
    }

    pub fn len(&self) -> usize {
        self.categorizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categorizations.is_empty()
    }
}

/// Directories below `root` (inclusive) holding a categorization set
fn find_sets(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == METADATA_FILE)
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .filter(|dir| loader::is_categorization_dir(dir))
        .collect()
}
