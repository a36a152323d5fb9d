//! Tabular view of a categorization: one row per code.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;

pub const CODE_COLUMN: &str = "code";
pub const MEANING_COLUMN: &str = "meaning";
pub const LEVEL_COLUMN: &str = "level";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub code: String,
    pub meaning: String,
    /// Only set for hierarchical categorizations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Table {
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_level(&self) -> bool {
        self.rows.iter().any(|r| r.level.is_some())
    }

    pub fn columns(&self) -> Vec<&'static str> {
        if self.has_level() {
            vec![CODE_COLUMN, MEANING_COLUMN, LEVEL_COLUMN]
        } else {
            vec![CODE_COLUMN, MEANING_COLUMN]
        }
    }

    /// Same rows without the level column
    pub fn without_level(mut self) -> Self {
        for row in &mut self.rows {
            row.level = None;
        }
        self
    }

    /// Write as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        let with_level = self.has_level();

        out.write_record(self.columns())?;
        for row in &self.rows {
            if with_level {
                let level = row.level.map(|l| l.to_string()).unwrap_or_default();
                out.write_record([row.code.as_str(), row.meaning.as_str(), level.as_str()])?;
            } else {
                out.write_record([row.code.as_str(), row.meaning.as_str()])?;
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self, delimiter: u8) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf, delimiter)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, meaning: &str, level: Option<usize>) -> TableRow {
        TableRow {
            code: code.into(),
            meaning: meaning.into(),
            level,
        }
    }

    #[test]
    fn test_flat_csv() {
        let table = Table::new(vec![row("1", "Energy", None), row("2", "IPPU, total", None)]);
        let csv = table.to_csv_string(b',').unwrap();
        assert_eq!(csv, "code,meaning\n1,Energy\n2,\"IPPU, total\"\n");
        assert_eq!(table.columns(), vec!["code", "meaning"]);
    }

    #[test]
    fn test_hierarchical_csv_and_level_drop() {
        let table = Table::new(vec![row("1", "Energy", Some(1)), row("1.A", "Fuel", Some(2))]);
        assert_eq!(
            table.to_csv_string(b';').unwrap(),
            "code;meaning;level\n1;Energy;1\n1.A;Fuel;2\n"
        );

        let flat = table.without_level();
        assert!(!flat.has_level());
        assert_eq!(flat.to_csv_string(b',').unwrap(), "code,meaning\n1,Energy\n1.A,Fuel\n");
    }
}
