// 🔢 Address Transcoder
// Octal control-system addresses → target area-prefixed numeric addresses

use crate::config::{ConverterConfig, IntPolicy};
use crate::error::ConvertError;
use std::fmt;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Offset added to in-range coil (and legacy INT) addresses
pub const COIL_OFFSET: u64 = 3072;

/// Highest source address that still fits the coil window (inclusive)
pub const COIL_LIMIT: u64 = 0o3777;

/// Area code for discrete (BOOL) addresses
pub const COIL_AREA: u8 = 1;

/// Area code for register (INT/FLOAT) addresses
pub const REGISTER_AREA: u8 = 3;

// ============================================================================
// DECLARED TYPE
// ============================================================================

/// Variable type as declared in the variables table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Bool,
    Int,
    Float,
}

impl DeclaredType {
    /// Case-insensitive lookup; `None` for anything outside BOOL/INT/FLOAT
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "BOOL" => Some(DeclaredType::Bool),
            "INT" => Some(DeclaredType::Int),
            "FLOAT" => Some(DeclaredType::Float),
            _ => None,
        }
    }

    /// Type tag written to the output schema
    pub fn tag(&self) -> &'static str {
        match self {
            DeclaredType::Bool => "bool",
            DeclaredType::Int => "int",
            DeclaredType::Float => "float",
        }
    }

    pub fn width(&self) -> Option<u8> {
        match self {
            DeclaredType::Bool => None,
            DeclaredType::Int => Some(16),
            DeclaredType::Float => Some(32),
        }
    }
}

impl std::str::FromStr for DeclaredType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeclaredType::from_label(s).ok_or_else(|| ConvertError::UnknownType(s.to_string()))
    }
}

// ============================================================================
// ADDRESS VALUES
// ============================================================================

/// Result of mapping one octal address.
///
/// The two non-numeric variants are soft failures: they render into the
/// address column so a human can correct them, and never abort a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressValue {
    Mapped(u64),
    /// Exact decimal rendering of a value too wide for u64
    MappedWide(String),
    /// Valid octal but outside the window of the target area
    NotApplicable(String),
    /// Input was not a base-8 digit string
    InvalidOctal(String),
}

impl fmt::Display for AddressValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressValue::Mapped(value) => write!(f, "{}", value),
            AddressValue::MappedWide(decimal) => f.write_str(decimal),
            AddressValue::NotApplicable(octal) => write!(f, "NA{}", octal),
            AddressValue::InvalidOctal(input) => write!(f, "Invalid octal input at {}", input),
        }
    }
}

/// Area-prefixed address, rendered as `<area>.<value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAddress {
    pub area: u8,
    pub value: AddressValue,
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.area, self.value)
    }
}

// ============================================================================
// TRANSCODING
// ============================================================================

/// Outcome of reading a base-8 digit string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Octal {
    Value(u64),
    /// Valid digits, but wider than u64
    Overflow,
    Invalid,
}

fn is_octal_digits(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| (b'0'..=b'7').contains(&b))
}

/// Strict base-8 parse: non-empty, digits 0-7 only (no sign, no prefix)
pub fn parse_octal(input: &str) -> Octal {
    if !is_octal_digits(input) {
        return Octal::Invalid;
    }
    match u64::from_str_radix(input, 8) {
        Ok(value) => Octal::Value(value),
        Err(_) => Octal::Overflow,
    }
}

/// Exact decimal text for an octal digit string of any length
fn octal_to_decimal_string(octal: &str) -> String {
    const LIMB: u64 = 1_000_000_000;
    // little-endian base-1e9 limbs
    let mut limbs: Vec<u64> = vec![0];

    for digit in octal.bytes().map(|b| u64::from(b - b'0')) {
        let mut carry = digit;
        for limb in limbs.iter_mut() {
            let v = *limb * 8 + carry;
            *limb = v % LIMB;
            carry = v / LIMB;
        }
        if carry > 0 {
            limbs.push(carry);
        }
    }

    let mut out = String::new();
    let mut iter = limbs.iter().rev();
    if let Some(top) = iter.next() {
        out.push_str(&top.to_string());
    }
    for limb in iter {
        out.push_str(&format!("{:09}", limb));
    }
    out
}

/// Coil window mapping shared by BOOL and the legacy INT policy
fn offset_into_coil_window(octal: &str) -> AddressValue {
    match parse_octal(octal) {
        Octal::Value(decimal) if decimal <= COIL_LIMIT => AddressValue::Mapped(decimal + COIL_OFFSET),
        Octal::Value(_) | Octal::Overflow => AddressValue::NotApplicable(octal.to_string()),
        Octal::Invalid => AddressValue::InvalidOctal(octal.to_string()),
    }
}

fn plain_decimal(octal: &str) -> AddressValue {
    match parse_octal(octal) {
        Octal::Value(decimal) => AddressValue::Mapped(decimal),
        Octal::Overflow => AddressValue::MappedWide(octal_to_decimal_string(octal)),
        Octal::Invalid => AddressValue::InvalidOctal(octal.to_string()),
    }
}

pub fn transcode_bool(octal: &str) -> TargetAddress {
    TargetAddress {
        area: COIL_AREA,
        value: offset_into_coil_window(octal),
    }
}

pub fn transcode_int(octal: &str, policy: IntPolicy) -> TargetAddress {
    let value = match policy {
        IntPolicy::Plain => plain_decimal(octal),
        IntPolicy::Offset => offset_into_coil_window(octal),
    };
    TargetAddress {
        area: REGISTER_AREA,
        value,
    }
}

pub fn transcode_float(octal: &str) -> TargetAddress {
    TargetAddress {
        area: REGISTER_AREA,
        value: plain_decimal(octal),
    }
}

/// Schema fields for one transcoded variable
#[derive(Debug, Clone, PartialEq)]
pub struct Transcoded {
    pub address: TargetAddress,
    pub declared_type: DeclaredType,
    pub width: Option<u8>,
    pub signed: Option<bool>,
    pub unit: Option<String>,
}

/// Dispatch on declared type. `octal` must already have its prefix stripped.
pub fn transcode(octal: &str, declared_type: DeclaredType, config: &ConverterConfig) -> Transcoded {
    let (address, signed, unit) = match declared_type {
        DeclaredType::Bool => (transcode_bool(octal), None, None),
        DeclaredType::Int => (
            transcode_int(octal, config.int_policy),
            Some(false),
            Some(config.unit_placeholder.clone()),
        ),
        DeclaredType::Float => (
            transcode_float(octal),
            None,
            Some(config.unit_placeholder.clone()),
        ),
    };

    Transcoded {
        address,
        declared_type,
        width: declared_type.width(),
        signed,
        unit,
    }
}

// ============================================================================
// NAME → IDENTIFIER
// ============================================================================

/// Identifier slug for a human-readable name.
///
/// The `--` collapse runs a single pass, so `a - b` becomes `a---b` → `a--b`.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .trim()
        .replace(' ', "-")
        .replace(',', "")
        .replace('/', "-")
        .replace("--", "-")
}

/// Drop a leading non-digit tag (`V00101` → `00101`)
pub fn strip_prefix_tag(address: &str) -> &str {
    address.trim_start_matches(|c: char| !c.is_ascii_digit())
}

// ============================================================================
// TESTS
// ============================================================================
