// 🚧 Address Range Gate
// Walks an ordered document and admits rows between a start and an end marker

/// Start/end markers, compared verbatim against a row's raw first column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRange {
    pub start: String,
    pub end: String,
}

impl AddressRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        AddressRange {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Stateful gate: opens on the start marker (inclusive), closes on the end
/// marker (exclusive). Markers may repeat; each hit toggles again.
#[derive(Debug, Clone)]
pub struct RangeGate<'a> {
    range: Option<&'a AddressRange>,
    open: bool,
}

impl<'a> RangeGate<'a> {
    /// `None` admits every row
    pub fn new(range: Option<&'a AddressRange>) -> Self {
        RangeGate { range, open: false }
    }

    pub fn admit(&mut self, raw_address: &str) -> bool {
        let Some(range) = self.range else {
            return true;
        };

        if raw_address == range.start {
            self.open = true;
        } else if raw_address == range.end {
            self.open = false;
        }
        self.open
    }
}
