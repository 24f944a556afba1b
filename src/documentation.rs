// 📘 Documentation Table
// Headerless CSV: column 0 = address, column 3 = human-readable name

use crate::error::Result;
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Fewest columns a documentation row may have
pub const MIN_COLUMNS: usize = 4;
const ADDRESS_COLUMN: usize = 0;
const NAME_COLUMN: usize = 3;

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationRecord {
    /// Column 0 exactly as read; range markers match against this
    pub raw_address: String,
    /// Trimmed, upper-cased join key
    pub address: String,
    pub name: String,
    /// 1-based line in the source file
    pub line: u64,
}

/// Row skipped for having fewer than `MIN_COLUMNS` fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRow {
    pub line: u64,
    pub fields: Vec<String>,
}

impl std::fmt::Display for MalformedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: expected at least {} columns, found {} {:?}",
            self.line,
            MIN_COLUMNS,
            self.fields.len(),
            self.fields
        )
    }
}

/// Parsed documentation table, rows in file order
#[derive(Debug, Clone, Default)]
pub struct DocumentationTable {
    pub records: Vec<DocumentationRecord>,
    pub malformed: Vec<MalformedRow>,
}

impl DocumentationTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = DocumentationTable::default();

        for (index, result) in rdr.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 1);

            if record.len() < MIN_COLUMNS {
                let row = MalformedRow {
                    line,
                    fields: record.iter().map(str::to_string).collect(),
                };
                warn!("Documentation CSV is missing required columns, {}", row);
                table.malformed.push(row);
                continue;
            }

            let raw_address = record.get(ADDRESS_COLUMN).unwrap_or("").to_string();
            let name = record.get(NAME_COLUMN).unwrap_or("").trim().to_string();

            table.records.push(DocumentationRecord {
                address: raw_address.trim().to_uppercase(),
                raw_address,
                name,
                line,
            });
        }

        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn index(&self) -> DocumentationIndex {
        DocumentationIndex::from_records(&self.records)
    }
}

// ============================================================================
// INDEX
// ============================================================================

/// Address → name lookup, keys upper-cased
#[derive(Debug, Clone, Default)]
pub struct DocumentationIndex {
    names: HashMap<String, String>,
}

impl DocumentationIndex {
    /// Later records overwrite earlier ones with the same address
    pub fn from_records(records: &[DocumentationRecord]) -> Self {
        let mut names = HashMap::with_capacity(records.len());
        for record in records {
            names.insert(record.address.clone(), record.name.clone());
        }
        DocumentationIndex { names }
    }

    /// Case-insensitive lookup
    pub fn name_for(&self, address: &str) -> Option<&str> {
        self.names
            .get(&address.trim().to_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
