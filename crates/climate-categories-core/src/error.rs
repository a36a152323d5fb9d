use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CategorizationError {
    #[error("Code not found: '{code}'")]
    CodeNotFound { code: String },

    #[error("Duplicate code: '{code}' is already defined")]
    DuplicateCode { code: String },

    #[error("Hierarchy contains a cycle involving: {codes:?}")]
    CyclicHierarchy { codes: Vec<String> },

    #[error("Inconsistent level for '{code}': parents imply both level {first} and level {second}")]
    InconsistentLevel {
        code: String,
        first: usize,
        second: usize,
    },

    #[error("Invalid edge '{parent}' -> '{child}': unknown code '{unknown}'")]
    InvalidEdge {
        parent: String,
        child: String,
        unknown: String,
    },

    #[error("Categorization '{name}' has no categories")]
    EmptyCategorization { name: String },

    #[error("Invalid extension name: '{name}' - must not be empty")]
    InvalidExtensionName { name: String },

    #[error("Categorization not found: {name}")]
    CategorizationNotFound { name: String },

    #[error("Categorization already registered: {name}")]
    DuplicateCategorization { name: String },

    #[error("Missing metadata key '{key}' in {path}")]
    MetadataMissing { path: PathBuf, key: String },

    #[error("Invalid metadata value for '{key}': '{value}' ({message})")]
    MetadataInvalid {
        key: String,
        value: String,
        message: String,
    },

    #[error("Malformed record in {path} line {line}: {message}")]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for config key '{key}': '{value}' ({message})")]
    InvalidConfigValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CategorizationError>;

impl CategorizationError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CodeNotFound { .. } | Self::CategorizationNotFound { .. } => 2,
            Self::DuplicateCode { .. } | Self::DuplicateCategorization { .. } => 3,
            Self::CyclicHierarchy { .. }
            | Self::InconsistentLevel { .. }
            | Self::InvalidEdge { .. } => 4,
            Self::MetadataMissing { .. }
            | Self::MetadataInvalid { .. }
            | Self::MalformedRecord { .. } => 5,
            Self::ConfigParse { .. }
            | Self::ConfigKeyNotFound { .. }
            | Self::InvalidConfigValue { .. } => 6,
            _ => 1,
        }
    }

    pub(crate) fn not_found(code: &str) -> Self {
        Self::CodeNotFound {
            code: code.to_string(),
        }
    }
}
