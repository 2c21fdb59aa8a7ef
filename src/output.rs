//! @ai:module:intent Render diagnostics as CheckStyle XML, GitLab Code Quality JSON or GitHub annotations
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_checkstyle, format_gitlab, format_github_annotations, format_file_names, format_summary, format_report, to_json
//! @ai:module:depends_on diagnostic, paths, config, error
//! @ai:module:stateless true

use crate::config::ReportConfig;
use crate::diagnostic::{Diagnostic, Summary};
use crate::error::{Error, Result};
use crate::paths::{strip_root, WorkspacePaths};
use colored::Colorize;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;

/// @ai:intent Report format written to the output file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    CheckStyle,
    GitLab,
    Json,
}

const CHECKSTYLE_VERSION: &str = "6.5";

fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::Xml(e.to_string())
}

/// @ai:intent Group diagnostics per file name, keeping first-seen order
/// @ai:effects pure
fn group_by_file<'a>(
    diagnostics: &'a [Diagnostic],
    root: Option<&str>,
) -> Vec<(&'a str, Vec<&'a Diagnostic>)> {
    let mut groups: Vec<(&str, Vec<&Diagnostic>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for diagnostic in diagnostics {
        let name = match root {
            Some(root) => strip_root(&diagnostic.file_name, root),
            None => diagnostic.file_name.as_str(),
        };
        match index.get(name) {
            Some(&i) => groups[i].1.push(diagnostic),
            None => {
                index.insert(name, groups.len());
                groups.push((name, vec![diagnostic]));
            }
        }
    }

    groups
}

/// @ai:intent Render a CheckStyle 6.5 XML document
/// @ai:pre root, when given, is removed from the start of every file name
/// @ai:post one <file> element per distinct name, in order of first appearance
/// @ai:effects pure
pub fn format_checkstyle(diagnostics: &[Diagnostic], root: Option<&str>) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let mut checkstyle = BytesStart::new("checkstyle");
    checkstyle.push_attribute(("version", CHECKSTYLE_VERSION));
    writer
        .write_event(Event::Start(checkstyle))
        .map_err(xml_error)?;

    for (name, entries) in group_by_file(diagnostics, root) {
        let mut file = BytesStart::new("file");
        file.push_attribute(("name", name));
        writer.write_event(Event::Start(file)).map_err(xml_error)?;

        for diagnostic in entries {
            let line = diagnostic.line.map(|n| n.to_string());
            let column = diagnostic.column.map(|n| n.to_string());

            let mut error = BytesStart::new("error");
            error.push_attribute(("severity", diagnostic.severity.as_str()));
            if let Some(line) = &line {
                error.push_attribute(("line", line.as_str()));
            }
            if let Some(column) = &column {
                error.push_attribute(("column", column.as_str()));
            }
            if let Some(message) = &diagnostic.message {
                error.push_attribute(("message", message.as_str()));
            }
            if let Some(source) = &diagnostic.source {
                error.push_attribute(("source", source.as_str()));
            }
            writer.write_event(Event::Empty(error)).map_err(xml_error)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("file")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("checkstyle")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}

#[derive(Debug, Serialize)]
struct GitLabLines {
    begin: u32,
}

#[derive(Debug, Serialize)]
struct GitLabLocation<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<GitLabLines>,
}

#[derive(Debug, Serialize)]
struct GitLabIssue<'a> {
    description: Option<&'a str>,
    location: GitLabLocation<'a>,
    severity: &'static str,
}

/// @ai:intent Render a GitLab Code Quality report (JSON array)
/// @ai:effects pure
pub fn format_gitlab(diagnostics: &[Diagnostic]) -> Result<String> {
    let issues: Vec<GitLabIssue<'_>> = diagnostics
        .iter()
        .map(|d| GitLabIssue {
            description: d.message.as_deref(),
            location: GitLabLocation {
                path: &d.file_name,
                lines: d.line.map(|begin| GitLabLines { begin }),
            },
            severity: d.severity.as_str(),
        })
        .collect();

    Ok(serde_json::to_string(&issues)?)
}

/// @ai:intent Escape a workflow command message
/// @ai:example ("50%\ndone") -> "50%25%0Adone"
/// @ai:effects pure
pub fn escape_data(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// @ai:intent Escape a workflow command property value
/// @ai:example ("a:b,c") -> "a%3Ab%2Cc"
/// @ai:effects pure
pub fn escape_property(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            ':' => escaped.push_str("%3A"),
            ',' => escaped.push_str("%2C"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// @ai:intent Render GitHub Actions workflow commands, one per diagnostic
/// @ai:example ([error src/a.c:3:1 "boom"]) -> "::error file=src/a.c,line=3,col=1::boom\n"
/// @ai:effects pure
pub fn format_github_annotations(diagnostics: &[Diagnostic], paths: &WorkspacePaths) -> String {
    let mut output = String::new();

    for diagnostic in diagnostics {
        let mut properties = vec![format!(
            "file={}",
            escape_property(&paths.fix(&diagnostic.file_name))
        )];
        if let Some(line) = diagnostic.line {
            properties.push(format!("line={line}"));
        }
        if let Some(column) = diagnostic.column {
            properties.push(format!("col={column}"));
        }

        output.push_str(&format!(
            "::{} {}::{}\n",
            diagnostic.severity,
            properties.join(","),
            escape_data(diagnostic.message.as_deref().unwrap_or_default())
        ));
    }

    output
}

/// @ai:intent List distinct file names, sorted
/// @ai:effects pure
pub fn format_file_names(diagnostics: &[Diagnostic]) -> String {
    let names: BTreeSet<&str> = diagnostics.iter().map(|d| d.file_name.as_str()).collect();
    let mut output = names.into_iter().collect::<Vec<_>>().join("\n");
    output.push('\n');
    output
}

/// @ai:intent Human-readable count of diagnostics per severity
/// @ai:effects pure
pub fn format_summary(diagnostics: &[Diagnostic]) -> String {
    let summary = Summary::from_diagnostics(diagnostics);

    if summary.total() == 0 {
        return format!("{} No diagnostics found\n", "OK".green().bold());
    }

    let files: BTreeSet<&str> = diagnostics.iter().map(|d| d.file_name.as_str()).collect();

    format!(
        "{} errors, {} warnings, {} notices in {} files\n",
        if summary.errors > 0 {
            summary.errors.to_string().red().bold().to_string()
        } else {
            "0".to_string()
        },
        if summary.warnings > 0 {
            summary.warnings.to_string().yellow().to_string()
        } else {
            "0".to_string()
        },
        summary.notices.to_string().blue(),
        files.len()
    )
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// @ai:intent Render the report selected by the configuration
/// @ai:effects pure
pub fn format_report(diagnostics: &[Diagnostic], config: &ReportConfig) -> Result<String> {
    match config.format {
        OutputFormat::CheckStyle => format_checkstyle(diagnostics, config.root_path.as_deref()),
        OutputFormat::GitLab => format_gitlab(diagnostics),
        OutputFormat::Json => to_json(&diagnostics, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Diagnostic> {
        vec![
            Diagnostic::new("/work/src/a.c", Severity::Error)
                .with_line(42)
                .with_column(5)
                .with_message("missing semicolon"),
            Diagnostic::new("/work/lib/b.py", Severity::Warning)
                .with_line(3)
                .with_message("unused \"os\" <import>"),
            Diagnostic::new("/work/src/a.c", Severity::Notice),
        ]
    }

    #[test]
    fn test_checkstyle_document() {
        let xml = format_checkstyle(&sample(), Some("/work")).unwrap();

        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<checkstyle version="6.5">
  <file name="src/a.c">
    <error severity="error" line="42" column="5" message="missing semicolon"/>
    <error severity="notice"/>
  </file>
  <file name="lib/b.py">
    <error severity="warning" line="3" message="unused &quot;os&quot; &lt;import&gt;"/>
  </file>
</checkstyle>"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_checkstyle_empty() {
        let xml = format_checkstyle(&[], None).unwrap();
        assert!(xml.contains(r#"<checkstyle version="6.5">"#));
        assert!(!xml.contains("<file"));
    }

    #[test]
    fn test_gitlab_report() {
        let json = format_gitlab(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value[0],
            serde_json::json!({
                "description": "missing semicolon",
                "location": {"path": "/work/src/a.c", "lines": {"begin": 42}},
                "severity": "error"
            })
        );
        assert_eq!(value[2]["description"], serde_json::Value::Null);
        assert!(value[2]["location"].get("lines").is_none());
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_data("50%\r\ndone: a,b"), "50%25%0D%0Adone: a,b");
        assert_eq!(escape_property("C:\\x,y%"), "C%3A\\x%2Cy%25");
    }

    #[test]
    fn test_github_annotations() {
        let paths = WorkspacePaths::from_workspace(Some("/home/runner/work/owner/repo")).unwrap();
        let diagnostics = vec![
            Diagnostic::new("/home/runner/work/owner/repo/src/a.c", Severity::Error)
                .with_line(42)
                .with_column(5)
                .with_message("first\nsecond"),
            Diagnostic::new("weird,name.c", Severity::Notice),
        ];

        assert_eq!(
            format_github_annotations(&diagnostics, &paths),
            "::error file=src/a.c,line=42,col=5::first%0Asecond\n\
             ::notice file=weird%2Cname.c::\n"
        );
    }

    #[test]
    fn test_file_names_sorted_unique() {
        assert_eq!(
            format_file_names(&sample()),
            "/work/lib/b.py\n/work/src/a.c\n"
        );
    }

    #[test]
    fn test_summary_counts_files() {
        colored::control::set_override(false);
        assert_eq!(
            format_summary(&sample()),
            "1 errors, 1 warnings, 1 notices in 2 files\n"
        );
        assert_eq!(format_summary(&[]), "OK No diagnostics found\n");
    }

    #[test]
    fn test_report_follows_format() {
        let mut config = ReportConfig::default();
        assert!(format_report(&sample(), &config)
            .unwrap()
            .starts_with("<?xml"));

        config.format = OutputFormat::GitLab;
        assert!(format_report(&sample(), &config).unwrap().starts_with('['));

        config.format = OutputFormat::Json;
        let json = format_report(&sample(), &config).unwrap();
        let parsed: Vec<Diagnostic> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }
}
