// 📦 Batch Conversion
// Documentation-only conversion for one declared type, no join

use crate::config::ConverterConfig;
use crate::documentation::DocumentationTable;
use crate::error::Result;
use crate::joiner::{variable_row, ConversionResult, Diagnostics, RowOutcome};
use crate::output::VariableRow;
use crate::range::{AddressRange, RangeGate};
use crate::transcoder::DeclaredType;
use std::io::Read;
use tracing::info;

/// Drop the one-character tag (`V13200` → `13200`)
fn drop_tag(raw: &str) -> &str {
    let mut chars = raw.chars();
    chars.next();
    chars.as_str()
}

/// Convert every documented row inside `range` as `declared_type`.
///
/// Rows are taken in file order. Malformed documentation rows are reported
/// but cannot act as range markers.
pub fn convert_documentation(
    documentation: &DocumentationTable,
    declared_type: DeclaredType,
    range: Option<&AddressRange>,
    config: &ConverterConfig,
) -> ConversionResult<VariableRow> {
    let mut gate = RangeGate::new(range);
    let mut rows = Vec::new();
    let mut diagnostics = Diagnostics {
        malformed_rows: documentation.malformed.clone(),
        ..Diagnostics::default()
    };

    for record in &documentation.records {
        if !gate.admit(&record.raw_address) {
            continue;
        }

        let numeric = drop_tag(record.raw_address.trim());
        rows.push(variable_row(numeric, &record.name, declared_type, config));

        diagnostics.converted_addresses.push(record.address.clone());
        diagnostics.outcomes.push(RowOutcome::Emitted {
            line: record.line,
            address: record.address.clone(),
        });
    }

    info!(
        "Batch {} conversion: {} rows",
        declared_type.tag(),
        rows.len()
    );
    ConversionResult { rows, diagnostics }
}

pub fn convert_documentation_stream<R: Read>(
    documentation: R,
    declared_type: DeclaredType,
    range: Option<&AddressRange>,
    config: &ConverterConfig,
) -> Result<ConversionResult<VariableRow>> {
    let docs = DocumentationTable::from_reader(documentation)?;
    Ok(convert_documentation(&docs, declared_type, range, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntPolicy;

    const DOCS: &str = "\
V13177,,,Before
V13200,,,First
V13201,,,Second
short,row
V13250,,,Stop Here
V13251,,,After
";

    #[test]
    fn test_range_gated_int_plain() {
        let range = AddressRange::new("V13200", "V13250");
        let result = convert_documentation_stream(
            DOCS.as_bytes(),
            DeclaredType::Int,
            Some(&range),
            &ConverterConfig::default(),
        )
        .unwrap();

        let names: Vec<&str> = result.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(result.rows[0].address, "3.5760");
        assert_eq!(result.rows[0].width, Some(16));
        assert_eq!(result.diagnostics.malformed_rows.len(), 1);
        assert!(result.is_deliverable());
    }

    #[test]
    fn test_legacy_offset_policy() {
        let config = ConverterConfig::default().with_int_policy(IntPolicy::Offset);
        let docs = "V00101,,,Low\nV13200,,,High\n";
        let result =
            convert_documentation_stream(docs.as_bytes(), DeclaredType::Int, None, &config)
                .unwrap();

        assert_eq!(result.rows[0].address, "3.3137");
        assert_eq!(result.rows[1].address, "3.NA13200");
    }

    #[test]
    fn test_no_range_processes_everything() {
        let result = convert_documentation_stream(
            DOCS.as_bytes(),
            DeclaredType::Bool,
            None,
            &ConverterConfig::default(),
        )
        .unwrap();

        assert_eq!(result.rows.len(), 5);
        assert_eq!(result.rows[0].identifier, "before");
        assert_eq!(result.rows[0].address, "1.NA13177");
    }

    #[test]
    fn test_drop_tag() {
        assert_eq!(drop_tag("V13200"), "13200");
        assert_eq!(drop_tag(""), "");
        assert_eq!(drop_tag("µ7"), "7");
    }
}
