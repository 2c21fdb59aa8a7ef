//! @ai:module:intent Reconcile tool-specific severity words and confidence scores into one scale
//! @ai:module:layer domain
//! @ai:module:public_api Severity, normalize_severity, severity_from_confidence, parse_confidence
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Normalized severity of a diagnostic, ordered from least to most severe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Error
    }
}

impl Severity {
    /// @ai:intent Get the canonical lower-case token
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// @ai:intent Map a cpplint-style confidence score onto the severity scale
/// @ai:example (0) -> Notice
/// @ai:example (3) -> Warning
/// @ai:example (7) -> Error
/// @ai:effects pure
pub fn severity_from_confidence(confidence: u64) -> Severity {
    match confidence {
        0..=1 => Severity::Notice,
        2..=4 => Severity::Warning,
        _ => Severity::Error,
    }
}

/// @ai:intent Parse a captured confidence field
/// @ai:post None when the text is not a decimal integer
/// @ai:effects pure
pub fn parse_confidence(raw: &str) -> Option<u64> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Scores too large for u64 are still "very confident".
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// @ai:intent Resolve the final severity from a raw token and an optional confidence
/// @ai:pre token is the text captured by a severity field, in any letter case
/// @ai:post confidence, when present, overrides the token
/// @ai:example (Some("WARN"), None) -> Warning
/// @ai:example (Some("error"), Some(0)) -> Notice
/// @ai:example (None, None) -> Error
/// @ai:effects pure
pub fn normalize_severity(token: Option<&str>, confidence: Option<u64>) -> Severity {
    if let Some(confidence) = confidence {
        return severity_from_confidence(confidence);
    }

    match token.map(|t| t.trim().to_lowercase()).as_deref() {
        Some("info") | Some("style") | Some("notice") => Severity::Notice,
        Some("warning") | Some("warn") => Severity::Warning,
        // fail, failure, error, and anything unrecognized
        _ => Severity::Error,
    }
}
