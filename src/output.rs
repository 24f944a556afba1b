// 📤 Output Schema
// Rows written to the target tooling's import CSV

use crate::error::Result;
use csv::WriterBuilder;
use serde::{Serialize, Serializer};

/// A row type with a fixed header.
///
/// The header is written explicitly so an empty conversion still produces a
/// well-formed file.
pub trait OutputRow: Serialize {
    const HEADER: &'static [&'static str];
}

/// Importers expect `True` / `False`, not Rust's lower-case rendering
fn capitalized_bool<S: Serializer>(value: &Option<bool>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(true) => serializer.serialize_str("True"),
        Some(false) => serializer.serialize_str("False"),
        None => serializer.serialize_none(),
    }
}

/// One converted variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableRow {
    #[serde(rename = "Identifier")]
    pub identifier: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Address")]
    pub address: String,

    #[serde(rename = "Type")]
    pub type_tag: String,

    #[serde(rename = "Width")]
    pub width: Option<u8>,

    #[serde(rename = "Signed", serialize_with = "capitalized_bool")]
    pub signed: Option<bool>,

    // Never filled by the converter; kept so the column exists
    #[serde(rename = "Max string length")]
    pub max_string_length: Option<u32>,

    #[serde(rename = "Factor")]
    pub factor: Option<f64>,

    #[serde(rename = "Unit")]
    pub unit: Option<String>,
}

impl OutputRow for VariableRow {
    const HEADER: &'static [&'static str] = &[
        "Identifier",
        "Name",
        "Address",
        "Type",
        "Width",
        "Signed",
        "Max string length",
        "Factor",
        "Unit",
    ];
}

/// One converted alarm (always boolean)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmRow {
    #[serde(rename = "Type")]
    pub alarm_type: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Severity")]
    pub severity: String,

    #[serde(rename = "Address")]
    pub address: String,

    #[serde(rename = "Condition")]
    pub condition: String,

    #[serde(rename = "Threshold")]
    pub threshold: String,

    #[serde(rename = "ThresholdType")]
    pub threshold_type: String,

    #[serde(rename = "On delay")]
    pub on_delay: u32,

    #[serde(rename = "Operator instructions")]
    pub operator_instructions: String,

    #[serde(rename = "Access category")]
    pub access_category: String,
}

impl OutputRow for AlarmRow {
    const HEADER: &'static [&'static str] = &[
        "Type",
        "Name",
        "Severity",
        "Address",
        "Condition",
        "Threshold",
        "ThresholdType",
        "On delay",
        "Operator instructions",
        "Access category",
    ];
}

/// Render rows as CSV text, header first
pub fn write_csv<T: OutputRow>(rows: &[T]) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(T::HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    let bytes = wtr
        .into_inner()
        .map_err(|e| crate::error::ConvertError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_output_still_has_header() {
        let csv = write_csv::<VariableRow>(&[]).unwrap();
        assert_eq!(
            csv,
            "Identifier,Name,Address,Type,Width,Signed,Max string length,Factor,Unit\n"
        );
    }

    #[test]
    fn test_nulls_render_as_empty_fields() {
        let row = VariableRow {
            identifier: "tank-level".to_string(),
            name: "Tank Level".to_string(),
            address: "3.65".to_string(),
            type_tag: "float".to_string(),
            width: Some(32),
            signed: None,
            max_string_length: None,
            factor: None,
            unit: Some("CHANGE ME".to_string()),
        };

        let csv = write_csv(&[row]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "tank-level,Tank Level,3.65,float,32,,,,CHANGE ME");
    }

    #[test]
    fn test_signed_is_capitalized() {
        let row = |signed| VariableRow {
            identifier: "pump-speed".to_string(),
            name: "Pump Speed".to_string(),
            address: "3.66".to_string(),
            type_tag: "int".to_string(),
            width: Some(16),
            signed,
            max_string_length: None,
            factor: None,
            unit: Some("CHANGE ME".to_string()),
        };

        let csv = write_csv(&[row(Some(false)), row(Some(true)), row(None)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "pump-speed,Pump Speed,3.66,int,16,False,,,CHANGE ME");
        assert_eq!(lines[2], "pump-speed,Pump Speed,3.66,int,16,True,,,CHANGE ME");
        assert_eq!(lines[3], "pump-speed,Pump Speed,3.66,int,16,,,,CHANGE ME");
    }

    #[test]
    fn test_alarm_header_and_quoting() {
        let row = AlarmRow {
            alarm_type: "boolean".to_string(),
            name: "Level, High".to_string(),
            severity: "high".to_string(),
            address: "1.3137".to_string(),
            condition: "==".to_string(),
            threshold: "TRUE".to_string(),
            threshold_type: "value".to_string(),
            on_delay: 1000,
            operator_instructions: "CHANGE ME".to_string(),
            access_category: "Client".to_string(),
        };

        let csv = write_csv(&[row]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], AlarmRow::HEADER.join(","));
        assert_eq!(
            lines[1],
            "boolean,\"Level, High\",high,1.3137,==,TRUE,value,1000,CHANGE ME,Client"
        );
    }
}
