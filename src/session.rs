// 🗂️ Conversion Session
// Caller-owned holder for the last conversion and its diagnostics

use crate::error::{ConvertError, Result};
use crate::joiner::{ConversionResult, Diagnostics};
use crate::output::OutputRow;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

/// A conversion rendered to CSV, ready for (conditional) delivery
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedConversion {
    pub csv: String,
    pub row_count: usize,
    pub diagnostics: Diagnostics,
    pub converted_at: DateTime<Utc>,
}

impl RenderedConversion {
    pub fn render<T: OutputRow>(result: &ConversionResult<T>) -> Result<Self> {
        Ok(RenderedConversion {
            csv: result.to_csv()?,
            row_count: result.rows.len(),
            diagnostics: result.diagnostics.clone(),
            converted_at: Utc::now(),
        })
    }

    /// sha256 of the CSV text; equal for identical reruns
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.csv.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn is_deliverable(&self) -> bool {
        self.diagnostics.missing_addresses.is_empty()
    }
}

/// Lifecycle: `new` → `record` (any number of times) → `reset`.
///
/// Each session owns its state, so separate callers use separate sessions.
#[derive(Debug, Clone)]
pub struct ConversionSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    last: Option<RenderedConversion>,
}

impl ConversionSession {
    pub fn new() -> Self {
        ConversionSession {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last: None,
        }
    }

    /// Replace the held result with a freshly rendered one
    pub fn record<T: OutputRow>(&mut self, result: &ConversionResult<T>) -> Result<&RenderedConversion> {
        let rendered = RenderedConversion::render(result)?;
        info!(
            session = %self.id,
            rows = rendered.row_count,
            missing = rendered.diagnostics.missing_addresses.len(),
            "conversion recorded"
        );
        let held = self.last.insert(rendered);
        Ok(&*held)
    }

    pub fn last(&self) -> Option<&RenderedConversion> {
        self.last.as_ref()
    }

    pub fn missing_addresses(&self) -> Option<&[String]> {
        self.last
            .as_ref()
            .map(|r| r.diagnostics.missing_addresses.as_slice())
    }

    /// The CSV, but only when nothing is missing from documentation
    pub fn deliverable_csv(&self) -> Result<&str> {
        let last = self.last.as_ref().ok_or(ConvertError::NothingRecorded)?;
        if !last.is_deliverable() {
            return Err(ConvertError::DeliveryBlocked(
                last.diagnostics.missing_addresses.clone(),
            ));
        }
        Ok(&last.csv)
    }

    pub fn reset(&mut self) {
        self.last = None;
        info!(session = %self.id, "session reset");
    }
}

impl Default for ConversionSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use crate::joiner::convert_variable_streams;

    const DOCS: &str = "V00101,,,Tank Level\n";

    fn convert(vars: &str) -> ConversionResult<crate::output::VariableRow> {
        convert_variable_streams(DOCS.as_bytes(), vars.as_bytes(), &ConverterConfig::default())
            .unwrap()
    }

    #[test]
    fn test_empty_session_has_nothing() {
        let session = ConversionSession::new();
        assert!(session.last().is_none());
        assert!(matches!(
            session.deliverable_csv(),
            Err(ConvertError::NothingRecorded)
        ));
    }

    #[test]
    fn test_delivers_when_complete() {
        let mut session = ConversionSession::new();
        session.record(&convert("ADDRESS,TYPE\nV00101,FLOAT\n")).unwrap();

        let csv = session.deliverable_csv().unwrap();
        assert!(csv.contains("tank-level,Tank Level,3.65,float,32,,,,CHANGE ME"));
    }

    #[test]
    fn test_blocks_delivery_with_missing() {
        let mut session = ConversionSession::new();
        session
            .record(&convert("ADDRESS,TYPE\nV00101,FLOAT\nV00777,INT\n"))
            .unwrap();

        match session.deliverable_csv() {
            Err(ConvertError::DeliveryBlocked(missing)) => assert_eq!(missing, vec!["V00777"]),
            other => panic!("expected blocked delivery, got {:?}", other),
        }
        // output is still computed
        assert_eq!(session.last().unwrap().row_count, 1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut session = ConversionSession::new();
        session.record(&convert("ADDRESS,TYPE\nV00101,INT\n")).unwrap();
        session.reset();

        assert!(session.last().is_none());
        assert!(session.missing_addresses().is_none());
    }

    #[test]
    fn test_fingerprint_stable_across_reruns() {
        let vars = "ADDRESS,TYPE\nV00101,BOOL\n";
        let a = RenderedConversion::render(&convert(vars)).unwrap();
        let b = RenderedConversion::render(&convert(vars)).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = ConversionSession::new();
        let second = ConversionSession::new();
        first.record(&convert("ADDRESS,TYPE\nV00101,INT\n")).unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.last().is_none());
    }
}
