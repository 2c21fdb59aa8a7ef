//! @ai:module:intent Define the normalized diagnostic record emitted by the recognizer
//! @ai:module:layer domain
//! @ai:module:public_api Diagnostic, Summary, parse_position
//! @ai:module:depends_on severity
//! @ai:module:stateless true

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// @ai:intent A single normalized diagnostic: where, how bad, and what
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Diagnostic {
    /// @ai:intent Create a diagnostic with just a file name and severity
    pub fn new(file_name: impl Into<String>, severity: Severity) -> Self {
        Self {
            file_name: file_name.into(),
            line: None,
            column: None,
            severity,
            message: None,
            source: None,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// @ai:intent Parse a captured line or column number
/// @ai:post Some only for a positive integer that fits in u32
/// @ai:example ("42") -> Some(42)
/// @ai:example ("0") -> None
/// @ai:effects pure
pub fn parse_position(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// @ai:intent Count of diagnostics per severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Summary {
    pub notices: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Summary {
    /// @ai:intent Tally a list of diagnostics
    /// @ai:effects pure
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut summary = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Notice => summary.notices += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Error => summary.errors += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.notices + self.warnings + self.errors
    }
}
