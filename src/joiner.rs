// 🔗 Row Joiner & Diagnostics
// Joins variable rows to documentation names and transcodes each match

use crate::config::ConverterConfig;
use crate::documentation::{DocumentationIndex, DocumentationTable, MalformedRow};
use crate::error::Result;
use crate::output::{write_csv, AlarmRow, OutputRow, VariableRow};
use crate::transcoder::{slugify, strip_prefix_tag, transcode, transcode_bool, DeclaredType};
use crate::variables::{read_variables, TableKind, VariableRecord};
use serde::Serialize;
use std::io::Read;
use tracing::{debug, info};

// ============================================================================
// OUTCOMES & DIAGNOSTICS
// ============================================================================

/// What happened to a single input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    Emitted { line: u64, address: String },
    SkippedEmptyAddress { line: u64 },
    SkippedUnknownType { line: u64, address: String, type_label: String },
    MissingInDocumentation { line: u64, address: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Join misses, in processing order
    pub missing_addresses: Vec<String>,
    /// Join hits, in processing order
    pub converted_addresses: Vec<String>,
    /// Documentation rows skipped for too few columns
    pub malformed_rows: Vec<MalformedRow>,
    /// One entry per variable row
    pub outcomes: Vec<RowOutcome>,
}

impl Diagnostics {
    fn record(&mut self, outcome: RowOutcome) {
        debug!(?outcome, "row processed");
        match &outcome {
            RowOutcome::Emitted { address, .. } => self.converted_addresses.push(address.clone()),
            RowOutcome::MissingInDocumentation { address, .. } => {
                self.missing_addresses.push(address.clone())
            }
            _ => {}
        }
        self.outcomes.push(outcome);
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    RowOutcome::SkippedEmptyAddress { .. } | RowOutcome::SkippedUnknownType { .. }
                )
            })
            .count()
    }

    /// Lines shown to whoever asked for the conversion
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.missing_addresses.is_empty() {
            lines.push(format!(
                "❗ The following addresses were not found in the documentation CSV: {}",
                self.missing_addresses.join(", ")
            ));
        }
        if self.converted_addresses.is_empty() {
            lines.push("⚠️  No addresses were successfully converted.".to_string());
        } else {
            lines.push(format!(
                "✅ Converted {} address(es): {}",
                self.converted_addresses.len(),
                self.converted_addresses.join(", ")
            ));
        }
        lines
    }

    /// Machine-readable report (outcomes tagged by `outcome`)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        format!(
            "converted: {}, missing: {}, skipped: {}, malformed documentation rows: {}",
            self.converted_addresses.len(),
            self.missing_addresses.len(),
            self.skipped_count(),
            self.malformed_rows.len()
        )
    }
}

/// Rows plus diagnostics for one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult<T> {
    pub rows: Vec<T>,
    pub diagnostics: Diagnostics,
}

impl<T: OutputRow> ConversionResult<T> {
    /// The file may only be delivered once every address resolved
    pub fn is_deliverable(&self) -> bool {
        self.diagnostics.missing_addresses.is_empty()
    }

    pub fn to_csv(&self) -> Result<String> {
        write_csv(&self.rows)
    }
}

// ============================================================================
// JOINER
// ============================================================================

pub struct Joiner<'a> {
    index: DocumentationIndex,
    malformed: Vec<MalformedRow>,
    config: &'a ConverterConfig,
}

impl<'a> Joiner<'a> {
    pub fn new(documentation: &DocumentationTable, config: &'a ConverterConfig) -> Self {
        Joiner {
            index: documentation.index(),
            malformed: documentation.malformed.clone(),
            config,
        }
    }

    fn join<T, F>(&self, records: &[VariableRecord], build: F) -> ConversionResult<T>
    where
        F: Fn(&str, &str, DeclaredType) -> T,
    {
        let mut rows = Vec::new();
        let mut diagnostics = Diagnostics {
            malformed_rows: self.malformed.clone(),
            ..Diagnostics::default()
        };

        for record in records {
            let line = record.line;

            if record.address.is_empty() {
                diagnostics.record(RowOutcome::SkippedEmptyAddress { line });
                continue;
            }

            let Some(declared_type) = record.declared_type else {
                diagnostics.record(RowOutcome::SkippedUnknownType {
                    line,
                    address: record.address.clone(),
                    type_label: record.type_label.clone(),
                });
                continue;
            };

            let Some(name) = self.index.name_for(&record.address) else {
                diagnostics.record(RowOutcome::MissingInDocumentation {
                    line,
                    address: record.address.clone(),
                });
                continue;
            };

            let numeric = strip_prefix_tag(&record.address);
            rows.push(build(numeric, name, declared_type));
            diagnostics.record(RowOutcome::Emitted {
                line,
                address: record.address.clone(),
            });
        }

        info!("Join finished: {}", diagnostics.summary());
        ConversionResult { rows, diagnostics }
    }

    pub fn convert_variables(&self, records: &[VariableRecord]) -> ConversionResult<VariableRow> {
        self.join(records, |numeric, name, declared_type| {
            variable_row(numeric, name, declared_type, self.config)
        })
    }

    pub fn convert_alarms(&self, records: &[VariableRecord]) -> ConversionResult<AlarmRow> {
        self.join(records, |numeric, name, _| alarm_row(numeric, name, self.config))
    }
}

/// Build an output row for one documented variable
pub fn variable_row(
    numeric: &str,
    name: &str,
    declared_type: DeclaredType,
    config: &ConverterConfig,
) -> VariableRow {
    let transcoded = transcode(numeric, declared_type, config);
    VariableRow {
        identifier: slugify(name),
        name: name.to_string(),
        address: transcoded.address.to_string(),
        type_tag: declared_type.tag().to_string(),
        width: transcoded.width,
        signed: transcoded.signed,
        max_string_length: None,
        factor: None,
        unit: transcoded.unit,
    }
}

pub fn alarm_row(numeric: &str, name: &str, config: &ConverterConfig) -> AlarmRow {
    let alarm = &config.alarm;
    AlarmRow {
        alarm_type: "boolean".to_string(),
        name: name.to_string(),
        severity: alarm.severity.clone(),
        address: transcode_bool(numeric).to_string(),
        condition: alarm.condition.clone(),
        threshold: alarm.threshold.clone(),
        threshold_type: alarm.threshold_type.clone(),
        on_delay: alarm.on_delay,
        operator_instructions: alarm.operator_instructions.clone(),
        access_category: alarm.access_category.clone(),
    }
}

// ============================================================================
// STREAM ENTRY POINTS
// ============================================================================

/// Documentation + variables CSV streams → variable rows
pub fn convert_variable_streams<D: Read, V: Read>(
    documentation: D,
    variables: V,
    config: &ConverterConfig,
) -> Result<ConversionResult<VariableRow>> {
    let docs = DocumentationTable::from_reader(documentation)?;
    let records = read_variables(variables, TableKind::Variables)?;
    Ok(Joiner::new(&docs, config).convert_variables(&records))
}

/// Documentation + alarms CSV streams → alarm rows
pub fn convert_alarm_streams<D: Read, A: Read>(
    documentation: D,
    alarms: A,
    config: &ConverterConfig,
) -> Result<ConversionResult<AlarmRow>> {
    let docs = DocumentationTable::from_reader(documentation)?;
    let records = read_variables(alarms, TableKind::Alarms)?;
    Ok(Joiner::new(&docs, config).convert_alarms(&records))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: &str = "\
V00101,,,Tank Level
V1234,,,Pump Run
C0010,,,High Level Alarm
bad,row
V4000,,,Spare Coil
";

    const VARS: &str = "\
ADDRESS,TYPE
V00101,FLOAT
v1234,bool
V7777,INT
,INT
V4000,STRING
V4000,Bool
";

    fn run(vars: &str) -> ConversionResult<VariableRow> {
        convert_variable_streams(DOCS.as_bytes(), vars.as_bytes(), &ConverterConfig::default())
            .unwrap()
    }

    #[test]
    fn test_float_example_row() {
        let result = run("ADDRESS,TYPE\nV00101,FLOAT\n");
        assert_eq!(result.rows.len(), 1);

        let row = &result.rows[0];
        assert_eq!(row.identifier, "tank-level");
        assert_eq!(row.name, "Tank Level");
        assert_eq!(row.address, "3.65");
        assert_eq!(row.type_tag, "float");
        assert_eq!(row.width, Some(32));
        assert_eq!(row.signed, None);
        assert_eq!(row.max_string_length, None);
        assert_eq!(row.factor, None);
        assert_eq!(row.unit.as_deref(), Some("CHANGE ME"));
    }

    #[test]
    fn test_join_is_case_insensitive() {
        let result = run("ADDRESS,TYPE\nv1234,BOOL\n");
        assert_eq!(result.rows[0].name, "Pump Run");
        assert_eq!(result.rows[0].address, "1.3740");
        assert_eq!(result.diagnostics.converted_addresses, vec!["V1234"]);
    }

    #[test]
    fn test_missing_address_excluded_from_output() {
        let result = run(VARS);

        assert_eq!(result.diagnostics.missing_addresses, vec!["V7777"]);
        assert!(result.rows.iter().all(|r| !r.address.ends_with("4095")));
        assert!(!result.is_deliverable());
    }

    #[test]
    fn test_outcomes_cover_every_row() {
        let result = run(VARS);
        let d = &result.diagnostics;

        assert_eq!(d.outcomes.len(), 6);
        assert_eq!(d.outcomes[3], RowOutcome::SkippedEmptyAddress { line: 5 });
        assert_eq!(
            d.outcomes[4],
            RowOutcome::SkippedUnknownType {
                line: 6,
                address: "V4000".to_string(),
                type_label: "STRING".to_string(),
            }
        );
        assert_eq!(d.skipped_count(), 2);
        assert_eq!(d.malformed_rows.len(), 1);
        assert_eq!(d.converted_addresses, vec!["V00101", "V1234", "V4000"]);
    }

    #[test]
    fn test_counts_add_up() {
        let result = run(VARS);
        // rows with a non-empty address and a recognized type
        let eligible = 4;
        assert_eq!(
            result.rows.len() + result.diagnostics.missing_addresses.len(),
            eligible
        );
    }

    #[test]
    fn test_report_names_missing_addresses() {
        let result = run(VARS);
        let lines = result.diagnostics.report_lines();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("❗"));
        assert!(lines[0].ends_with("V7777"));
        assert!(lines[1].contains("V00101, V1234, V4000"));

        let empty = run("ADDRESS,TYPE\nV7777,INT\n");
        let lines = empty.diagnostics.report_lines();
        assert!(lines[1].contains("No addresses were successfully converted"));
    }

    #[test]
    fn test_diagnostics_json_report() {
        let result = run(VARS);
        let json: serde_json::Value =
            serde_json::from_str(&result.diagnostics.to_json().unwrap()).unwrap();

        assert_eq!(json["missing_addresses"][0], "V7777");
        assert_eq!(json["malformed_rows"][0]["line"], 4);
        assert_eq!(json["outcomes"][2]["outcome"], "missing_in_documentation");
        assert_eq!(json["outcomes"][4]["type_label"], "STRING");
    }

    #[test]
    fn test_out_of_range_bool_still_emitted() {
        let result = run("ADDRESS,TYPE\nV4000,BOOL\n");
        assert_eq!(result.rows[0].address, "1.NA4000");
        assert!(result.is_deliverable());
    }

    #[test]
    fn test_rerun_is_identical() {
        let first = run(VARS);
        let second = run(VARS);
        assert_eq!(first, second);
        assert_eq!(first.to_csv().unwrap(), second.to_csv().unwrap());
    }

    #[test]
    fn test_preserves_input_order() {
        let result = run("ADDRESS,TYPE\nV1234,INT\nV00101,INT\n");
        let names: Vec<&str> = result.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Pump Run", "Tank Level"]);
    }

    #[test]
    fn test_alarm_conversion() {
        let result = convert_alarm_streams(
            DOCS.as_bytes(),
            "ADDRESS\nc0010\nC9999\n".as_bytes(),
            &ConverterConfig::default(),
        )
        .unwrap();

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.alarm_type, "boolean");
        assert_eq!(row.name, "High Level Alarm");
        assert_eq!(row.address, "1.3080");
        assert_eq!(row.severity, "high");
        assert_eq!(row.on_delay, 1000);
        assert_eq!(row.access_category, "Client");
        assert_eq!(result.diagnostics.missing_addresses, vec!["C9999"]);
    }
}
