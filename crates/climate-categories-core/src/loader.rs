//! CSV Loader
//!
//! Reads a categorization from its on-disk form:
//!
//! - `metadata.csv`: `(key, value)` per row
//! - `data.csv`: `(code, meaning)` per row
//! - `hierarchy.csv` (hierarchical only): one code per row, the column of a
//!   code is its depth; a child sits one column right of its parent
//!
//! None of the files has a header row.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::categorization::{
    AnyCategorization, CategorySystem, Categorization, HierarchicalCategorization,
};
use crate::codes::CodeStore;
use crate::error::{CategorizationError, Result};
use crate::hierarchy::Relations;
use crate::metadata::Metadata;

pub const METADATA_FILE: &str = "metadata.csv";
pub const DATA_FILE: &str = "data.csv";
pub const HIERARCHY_FILE: &str = "hierarchy.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED_KEYS: &[&str] = &[
    "name",
    "references",
    "title",
    "comment",
    "institution",
    "last_update",
];
const OPTIONAL_KEYS: &[&str] = &["version", "hierarchical", "total_sum"];

/// Metadata file contents
#[derive(Debug, Clone)]
struct MetadataRecord {
    metadata: Metadata,
    hierarchical: Option<bool>,
    total_sum: Option<bool>,
}

impl Categorization {
    /// Load a flat categorization from a metadata and a data file.
    pub fn from_csvs(metadata_csv: impl AsRef<Path>, data_csv: impl AsRef<Path>) -> Result<Self> {
        let record = read_metadata(metadata_csv.as_ref())?;
        if record.hierarchical == Some(true) {
            return Err(CategorizationError::MetadataInvalid {
                key: "hierarchical".into(),
                value: "true".into(),
                message: "a hierarchical categorization needs a hierarchy file".into(),
            });
        }
        if let Some(total_sum) = record.total_sum {
            return Err(CategorizationError::MetadataInvalid {
                key: "total_sum".into(),
                value: total_sum.to_string(),
                message: "only valid for hierarchical categorizations".into(),
            });
        }

        let codes = CodeStore::new(read_categories(data_csv.as_ref())?)?;
        let categorization = Categorization::from_parts(record.metadata, codes)?;
        tracing::debug!(
            name = %categorization.metadata().name,
            codes = categorization.codes().len(),
            "loaded categorization"
        );
        Ok(categorization)
    }
}

impl HierarchicalCategorization {
    /// Load a hierarchical categorization from metadata, data and hierarchy files.
    pub fn from_csvs(
        metadata_csv: impl AsRef<Path>,
        data_csv: impl AsRef<Path>,
        hierarchy_csv: impl AsRef<Path>,
    ) -> Result<Self> {
        let record = read_metadata(metadata_csv.as_ref())?;
        if record.hierarchical == Some(false) {
            return Err(CategorizationError::MetadataInvalid {
                key: "hierarchical".into(),
                value: "false".into(),
                message: "a hierarchy file was given for a flat categorization".into(),
            });
        }

        let codes = CodeStore::new(read_categories(data_csv.as_ref())?)?;
        let hierarchy_path = hierarchy_csv.as_ref();
        let layout = read_hierarchy(hierarchy_path)?;
        if let Some((code, line)) = layout.codes.iter().find(|(code, _)| !codes.contains(code)) {
            return Err(malformed(
                hierarchy_path,
                *line,
                &format!("'{}' is not defined in the data file", code),
            ));
        }

        let categorization = HierarchicalCategorization::from_parts(
            record.metadata,
            codes,
            &layout.relations,
            record.total_sum.unwrap_or(false),
        )?;
        tracing::debug!(
            name = %categorization.metadata().name,
            codes = categorization.codes().len(),
            edges = categorization.graph().edge_count(),
            "loaded hierarchical categorization"
        );
        Ok(categorization)
    }
}

/// Load the categorization stored in `dir`.
///
/// The presence of `hierarchy.csv` decides which kind is returned.
pub fn load_dir(dir: &Path) -> Result<AnyCategorization> {
    let metadata = dir.join(METADATA_FILE);
    let data = dir.join(DATA_FILE);
    let hierarchy = dir.join(HIERARCHY_FILE);

    if hierarchy.exists() {
        HierarchicalCategorization::from_csvs(&metadata, &data, &hierarchy).map(Into::into)
    } else {
        Categorization::from_csvs(&metadata, &data).map(Into::into)
    }
}

/// True if `dir` holds at least the metadata and data files
pub fn is_categorization_dir(dir: &Path) -> bool {
    dir.join(METADATA_FILE).is_file() && dir.join(DATA_FILE).is_file()
}

fn reader(path: &Path) -> Result<csv::Reader<File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn read_metadata(path: &Path) -> Result<MetadataRecord> {
    let mut values: HashMap<String, String> = HashMap::new();

    for record in reader(path)?.records() {
        let record = record?;
        let key = record.get(0).unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        let value = record.get(1).unwrap_or_default();

        if !REQUIRED_KEYS.contains(&key) && !OPTIONAL_KEYS.contains(&key) {
            return Err(invalid(key, value, "unknown metadata key"));
        }
        if values.insert(key.to_string(), value.to_string()).is_some() {
            return Err(invalid(key, value, "repeated metadata key"));
        }
    }

    for key in REQUIRED_KEYS {
        if !values.contains_key(*key) {
            return Err(CategorizationError::MetadataMissing {
                path: path.to_path_buf(),
                key: key.to_string(),
            });
        }
    }

    let mut take = |key: &str| values.remove(key).unwrap_or_default();
    let name = take("name");
    let references = take("references");
    let title = take("title");
    let comment = take("comment");
    let institution = take("institution");
    let last_update_raw = take("last_update");
    let version = take("version");
    let hierarchical = take("hierarchical");
    let total_sum = take("total_sum");

    let last_update = NaiveDate::parse_from_str(&last_update_raw, DATE_FORMAT)
        .map_err(|e| invalid("last_update", &last_update_raw, &e.to_string()))?;

    Ok(MetadataRecord {
        metadata: Metadata {
            name,
            references,
            title,
            comment,
            institution: non_empty(institution),
            last_update,
            version: non_empty(version),
        },
        hierarchical: parse_flag("hierarchical", &hierarchical)?,
        total_sum: parse_flag("total_sum", &total_sum)?,
    })
}

fn read_categories(path: &Path) -> Result<Vec<(String, String)>> {
    let mut categories = Vec::new();

    for record in reader(path)?.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        match (record.get(0), record.get(1)) {
            (Some(code), Some(meaning)) if !code.is_empty() => {
                categories.push((code.to_string(), meaning.to_string()));
            }
            _ => {
                return Err(malformed(
                    path,
                    line_of(&record),
                    "expected a (code, meaning) pair",
                ))
            }
        }
    }

    Ok(categories)
}

/// Decoded hierarchy file
#[derive(Debug, Default)]
struct HierarchyLayout {
    relations: Relations,
    /// Every code listed, with the line it appears on
    codes: Vec<(String, u64)>,
}

/// Decode the column layout into parent → child relations.
///
/// `open[i]` is the code most recently seen in column `i`; a code in column
/// `c` becomes a child of `open[c - 1]`.
fn read_hierarchy(path: &Path) -> Result<HierarchyLayout> {
    let mut layout = HierarchyLayout::default();
    let mut open: Vec<String> = Vec::new();

    for record in reader(path)?.records() {
        let record = record?;
        for (column, code) in record.iter().enumerate() {
            if code.is_empty() {
                continue;
            }
            if column > open.len() {
                return Err(malformed(
                    path,
                    line_of(&record),
                    &format!("'{}' in column {} has no parent", code, column + 1),
                ));
            }
            open.truncate(column);
            if let Some(parent) = open.last() {
                layout.relations.add(parent.as_str(), code);
            }
            open.push(code.to_string());
            layout.codes.push((code.to_string(), line_of(&record)));
        }
    }

    Ok(layout)
}

fn parse_flag(key: &str, value: &str) -> Result<Option<bool>> {
    match value.to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "yes" | "1" => Ok(Some(true)),
        "false" | "no" | "0" => Ok(Some(false)),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn invalid(key: &str, value: &str, message: &str) -> CategorizationError {
    CategorizationError::MetadataInvalid {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn malformed(path: &Path, line: u64, message: &str) -> CategorizationError {
    CategorizationError::MalformedRecord {
        path: PathBuf::from(path),
        line,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const METADATA: &str = "\
name,IPCC2006
references,IPCC 2006 Guidelines
title,IPCC GHG emission categories (2006)
comment,\"Excerpt, for testing\"
institution,IPCC
last_update,2010-01-01
version,2006
hierarchical,True
total_sum,True
";

    const DATA: &str = "\
0,National Total
1,Energy
1.A,Fuel Combustion Activities
1.B,Fugitive emissions from fuels
2,\"Industrial Processes and Product Use\"
";

    const HIERARCHY: &str = "\
0,,
,1,
,,1.A
,,1.B
,2,
";

    fn write_set(dir: &Path, metadata: &str, data: &str, hierarchy: Option<&str>) {
        fs::write(dir.join(METADATA_FILE), metadata).unwrap();
        fs::write(dir.join(DATA_FILE), data).unwrap();
        if let Some(h) = hierarchy {
            fs::write(dir.join(HIERARCHY_FILE), h).unwrap();
        }
    }

    #[test]
    fn test_load_hierarchical() -> Result<()> {
        let temp = TempDir::new()?;
        write_set(temp.path(), METADATA, DATA, Some(HIERARCHY));

        let cat = load_dir(temp.path())?;
        let h = cat.as_hierarchical().unwrap();

        assert_eq!(h.name(), "IPCC2006");
        assert_eq!(h.metadata().comment, "Excerpt, for testing");
        assert_eq!(h.metadata().version.as_deref(), Some("2006"));
        assert_eq!(
            h.metadata().last_update,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
        );
        assert!(h.total_sum());
        assert_eq!(h.len(), 5);
        assert_eq!(h.children("0")?, ["1", "2"]);
        assert_eq!(h.children("1")?, ["1.A", "1.B"]);
        assert_eq!(h.level("1.B")?, 3);
        assert_eq!(h.lookup("2")?, "Industrial Processes and Product Use");
        Ok(())
    }

    #[test]
    fn test_load_flat() -> Result<()> {
        let temp = TempDir::new()?;
        let metadata = METADATA
            .replace("hierarchical,True\n", "")
            .replace("total_sum,True\n", "");
        write_set(temp.path(), &metadata, DATA, None);

        let cat = load_dir(temp.path())?;
        assert!(!cat.is_hierarchical());
        assert_eq!(cat.keys().next(), Some("0"));
        Ok(())
    }

    #[test]
    fn test_same_row_children_and_multiple_parents() -> Result<()> {
        let temp = TempDir::new()?;
        let data = "T,t\nA,a\nB,b\nX,x\n";
        let hierarchy = "T,A,X\n,B,X\n";
        write_set(temp.path(), METADATA, data, Some(hierarchy));

        let cat = load_dir(temp.path())?;
        let h = cat.as_hierarchical().unwrap();
        assert_eq!(h.children("T")?, ["A", "B"]);
        assert_eq!(h.parents("X")?, ["A", "B"]);
        assert_eq!(h.level("X")?, 3);
        Ok(())
    }

    #[test]
    fn test_skipped_column_rejected() -> Result<()> {
        let temp = TempDir::new()?;
        write_set(temp.path(), METADATA, DATA, Some("0,,\n,,1.A\n"));

        let result = load_dir(temp.path());
        assert!(matches!(
            result,
            Err(CategorizationError::MalformedRecord { line: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_metadata_key() -> Result<()> {
        let temp = TempDir::new()?;
        let metadata = METADATA.replace("institution,IPCC\n", "");
        write_set(temp.path(), &metadata, DATA, Some(HIERARCHY));

        assert!(matches!(
            load_dir(temp.path()),
            Err(CategorizationError::MetadataMissing { key, .. }) if key == "institution"
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_and_bad_metadata_values() -> Result<()> {
        let temp = TempDir::new()?;
        write_set(temp.path(), &format!("{}colour,blue\n", METADATA), DATA, Some(HIERARCHY));
        assert!(matches!(
            load_dir(temp.path()),
            Err(CategorizationError::MetadataInvalid { key, .. }) if key == "colour"
        ));

        let metadata = METADATA.replace("2010-01-01", "01/01/2010");
        write_set(temp.path(), &metadata, DATA, Some(HIERARCHY));
        assert!(matches!(
            load_dir(temp.path()),
            Err(CategorizationError::MetadataInvalid { key, .. }) if key == "last_update"
        ));
        Ok(())
    }

    #[test]
    fn test_hierarchical_flag_without_hierarchy_file() -> Result<()> {
        let temp = TempDir::new()?;
        write_set(temp.path(), METADATA, DATA, None);
        assert!(matches!(
            load_dir(temp.path()),
            Err(CategorizationError::MetadataInvalid { key, .. }) if key == "hierarchical"
        ));
        Ok(())
    }

    #[test]
    fn test_duplicate_code_in_data() -> Result<()> {
        let temp = TempDir::new()?;
        write_set(temp.path(), METADATA, "0,a\n0,b\n", Some("0\n"));
        assert!(matches!(
            load_dir(temp.path()),
            Err(CategorizationError::DuplicateCode { code }) if code == "0"
        ));
        Ok(())
    }

    #[test]
    fn test_hierarchy_with_unknown_code() -> Result<()> {
        let temp = TempDir::new()?;
        write_set(temp.path(), METADATA, DATA, Some("0,\n,9\n"));
        assert!(matches!(
            load_dir(temp.path()),
            Err(CategorizationError::MalformedRecord { line: 2, message, .. }) if message.contains("'9'")
        ));
        Ok(())
    }

    #[test]
    fn test_hierarchy_code_missing_from_data() -> Result<()> {
        let temp = TempDir::new()?;
        write_set(temp.path(), METADATA, "A,a\nB,b\n", Some("A,B\nGHOST\n"));
        match load_dir(temp.path()) {
            Err(CategorizationError::MalformedRecord { line, message, .. }) => {
                assert_eq!(line, 2);
                assert!(message.contains("GHOST"));
            }
            other => panic!("expected MalformedRecord, got {:?}", other.map(|c| c.name().to_string())),
        }
        Ok(())
    }

    #[test]
    fn test_is_categorization_dir() -> Result<()> {
        let temp = TempDir::new()?;
        assert!(!is_categorization_dir(temp.path()));
        write_set(temp.path(), METADATA, DATA, None);
        assert!(is_categorization_dir(temp.path()));
        Ok(())
    }
}
