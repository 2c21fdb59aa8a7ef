//! @ai:module:intent logtocs library: recognize diagnostics in build, lint and test tool output
//! @ai:module:layer infrastructure
//! @ai:module:public_api ansi, catalog, config, diagnostic, error, output, paths, recognizer, severity, recognize
//! @ai:module:stateless true
//!
//! # logtocs
//!
//! Scans the console output of compilers, linters and test runners and turns
//! every message it recognizes into a [`Diagnostic`] (file, line, column,
//! severity, message). Diagnostics can then be written as CheckStyle XML, a
//! GitLab Code Quality report or GitHub Actions annotations.
//!
//! ## Example
//!
//! ```rust
//! use logtocs_parser::{output, recognize, Severity};
//!
//! let log = "src/app.c:42:5: error: missing semicolon\n";
//! let diagnostics = recognize(log).unwrap();
//!
//! assert_eq!(diagnostics[0].file_name, "src/app.c");
//! assert_eq!(diagnostics[0].severity, Severity::Error);
//!
//! let xml = output::format_checkstyle(&diagnostics, None).unwrap();
//! assert!(xml.contains(r#"<file name="src/app.c">"#));
//! ```

pub mod ansi;
pub mod catalog;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod output;
pub mod paths;
pub mod recognizer;
pub mod severity;

use std::sync::Arc;

pub use catalog::{Catalog, Field, PatternRule};
pub use config::{CiEnvironment, EngineConfig, ReportConfig};
pub use diagnostic::{Diagnostic, Summary};
pub use error::{Error, Result};
pub use output::{
    format_checkstyle, format_file_names, format_github_annotations, format_gitlab,
    format_report, format_summary, to_json, OutputFormat,
};
pub use paths::WorkspacePaths;
pub use recognizer::{
    select_recognizer, FullTextRecognizer, GroupState, LineRecognizer, RecognitionMode,
    Recognizer,
};
pub use severity::Severity;

/// @ai:intent Recognize diagnostics with the built-in catalog and default settings
/// @ai:effects pure
pub fn recognize(text: &str) -> Result<Vec<Diagnostic>> {
    let catalog = Arc::new(Catalog::builtin()?);
    let recognizer = select_recognizer(catalog, &EngineConfig::default())?;
    Ok(recognizer.recognize(text))
}
