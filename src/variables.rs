// 📋 Variable & Alarm Tables
// Header-keyed CSV; `ADDRESS` (and `TYPE` for variables) must be upper-case

use crate::error::{ConvertError, Result};
use crate::transcoder::DeclaredType;
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;

pub const ADDRESS_HEADER: &str = "ADDRESS";
pub const TYPE_HEADER: &str = "TYPE";

/// Which kind of table is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Needs `ADDRESS` and `TYPE`
    Variables,
    /// Needs `ADDRESS` only; every row is boolean
    Alarms,
}

impl TableKind {
    fn label(&self) -> &'static str {
        match self {
            TableKind::Variables => "Variables",
            TableKind::Alarms => "Alarms",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRecord {
    /// Trimmed, upper-cased; may be empty
    pub address: String,
    /// Type label as written (trimmed, upper-cased)
    pub type_label: String,
    /// `None` when the label is not BOOL/INT/FLOAT
    pub declared_type: Option<DeclaredType>,
    pub line: u64,
}

/// Position of a named column, exact (case-sensitive) match
fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

pub fn read_variables<R: Read>(reader: R, kind: TableKind) -> Result<Vec<VariableRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let address_idx = column_index(&headers, ADDRESS_HEADER).ok_or(ConvertError::MissingColumn {
        table: kind.label(),
        column: ADDRESS_HEADER,
    })?;
    let type_idx = match kind {
        TableKind::Variables => Some(column_index(&headers, TYPE_HEADER).ok_or(
            ConvertError::MissingColumn {
                table: kind.label(),
                column: TYPE_HEADER,
            },
        )?),
        TableKind::Alarms => None,
    };

    let mut records = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);

        let address = record.get(address_idx).unwrap_or("").trim().to_uppercase();

        let (type_label, declared_type) = match type_idx {
            Some(idx) => {
                let label = record.get(idx).unwrap_or("").trim().to_uppercase();
                let declared = DeclaredType::from_label(&label);
                (label, declared)
            }
            None => ("BOOL".to_string(), Some(DeclaredType::Bool)),
        };

        records.push(VariableRecord {
            address,
            type_label,
            declared_type,
            line,
        });
    }

    Ok(records)
}

pub fn read_variables_from_path(path: &Path, kind: TableKind) -> Result<Vec<VariableRecord>> {
    let file = std::fs::File::open(path)?;
    read_variables(file, kind)
}
