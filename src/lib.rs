// Octal Address Converter - Core Library
// Exposes all modules for use in the CLI and tests

pub mod error;
pub mod config;
pub mod transcoder;     // Octal → target address rules
pub mod documentation;  // Address → name table
pub mod variables;      // Typed variable/alarm records
pub mod output;         // Output schema + CSV rendering
pub mod joiner;         // Join + per-row diagnostics
pub mod range;          // Start/end range gate
pub mod batch;          // Documentation-only conversion
pub mod session;        // Caller-owned conversion state

// Re-export commonly used types
pub use error::{ConvertError, Result};
pub use config::{AlarmDefaults, ConverterConfig, IntPolicy};
pub use transcoder::{
    AddressValue, DeclaredType, Octal, TargetAddress, Transcoded,
    transcode, transcode_bool, transcode_int, transcode_float,
    parse_octal, slugify, strip_prefix_tag,
};
pub use documentation::{DocumentationIndex, DocumentationRecord, DocumentationTable, MalformedRow};
pub use variables::{read_variables, read_variables_from_path, TableKind, VariableRecord};
pub use output::{write_csv, AlarmRow, OutputRow, VariableRow};
pub use joiner::{
    ConversionResult, Diagnostics, Joiner, RowOutcome,
    convert_alarm_streams, convert_variable_streams,
};
pub use range::{AddressRange, RangeGate};
pub use batch::{convert_documentation, convert_documentation_stream};
pub use session::{ConversionSession, RenderedConversion};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
