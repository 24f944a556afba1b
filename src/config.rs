// ⚙️ Converter Configuration
// Every field has a default, so an empty JSON object is a valid config file.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How INT addresses are mapped.
///
/// Two policies exist in the field: the joined converter writes the plain
/// decimal value, while the older single-file tool added the coil offset and
/// flagged large addresses as not-applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntPolicy {
    /// `3.<decimal>`
    #[default]
    Plain,
    /// `3.<decimal + 3072>`, `3.NA<octal>` above the limit
    Offset,
}

impl std::str::FromStr for IntPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(IntPolicy::Plain),
            "offset" => Ok(IntPolicy::Offset),
            other => Err(format!("unknown INT policy '{}' (expected plain or offset)", other)),
        }
    }
}

/// Fixed columns written for every alarm row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmDefaults {
    pub severity: String,
    pub condition: String,
    pub threshold: String,
    pub threshold_type: String,
    pub on_delay: u32,
    pub operator_instructions: String,
    pub access_category: String,
}

impl Default for AlarmDefaults {
    fn default() -> Self {
        AlarmDefaults {
            severity: "high".to_string(),
            condition: "==".to_string(),
            threshold: "TRUE".to_string(),
            threshold_type: "value".to_string(),
            on_delay: 1000,
            operator_instructions: "CHANGE ME".to_string(),
            access_category: "Client".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub int_policy: IntPolicy,

    /// Written wherever a field needs manual completion
    pub unit_placeholder: String,

    pub alarm: AlarmDefaults,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            int_policy: IntPolicy::Plain,
            unit_placeholder: "CHANGE ME".to_string(),
            alarm: AlarmDefaults::default(),
        }
    }
}

impl ConverterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_int_policy(mut self, policy: IntPolicy) -> Self {
        self.int_policy = policy;
        self
    }
}
