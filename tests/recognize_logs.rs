use logtocs_parser::{
    format_checkstyle, recognize, select_recognizer, Catalog, Diagnostic, EngineConfig,
    RecognitionMode, Severity, Summary,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const CI_LOG: &str = "\
==> Building project
src/app.c:42:5: error: missing semicolon
src/util.c:7:1: warning: unused variable 'x'
app/models.py:10: [C0111] Missing docstring
##[group]config/ci.yaml
##[warning]3:1 [document-start] missing document start \"---\"
##[endgroup]
src/app.cpp:10:  Lines should be <= 80 characters long  [whitespace/line_length] [2]
Build finished
";

fn recognize_with(mode: RecognitionMode, text: &str) -> Vec<Diagnostic> {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let config = EngineConfig {
        mode,
        ..Default::default()
    };
    select_recognizer(catalog, &config).unwrap().recognize(text)
}

#[test]
fn test_mixed_tool_log_full_text() {
    let diagnostics = recognize(CI_LOG).unwrap();

    assert_eq!(
        diagnostics,
        vec![
            Diagnostic::new("src/app.c", Severity::Error)
                .with_line(42)
                .with_column(5)
                .with_message("missing semicolon"),
            Diagnostic::new("src/util.c", Severity::Warning)
                .with_line(7)
                .with_column(1)
                .with_message("unused variable 'x'"),
            Diagnostic::new("app/models.py", Severity::Error)
                .with_line(10)
                .with_message("[C0111] Missing docstring"),
            Diagnostic::new("config/ci.yaml", Severity::Warning)
                .with_line(3)
                .with_column(1)
                .with_message("[document-start] missing document start \"---\""),
            Diagnostic::new("src/app.cpp", Severity::Warning)
                .with_line(10)
                .with_message("Lines should be <= 80 characters long  [whitespace/line_length]"),
        ]
    );
}

#[test]
fn test_line_mode_loses_group_context() {
    let full = recognize_with(RecognitionMode::FullText, CI_LOG);
    let lines = recognize_with(RecognitionMode::Line, CI_LOG);

    assert_eq!(full.len(), 5);
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|d| d.file_name != "config/ci.yaml"));
    assert_eq!(lines[0], full[0]);
    assert_eq!(lines[3], full[4]);
}

#[test]
fn test_summary_over_mixed_log() {
    let summary = Summary::from_diagnostics(&recognize(CI_LOG).unwrap());

    assert_eq!(summary.errors, 2);
    assert_eq!(summary.warnings, 3);
    assert_eq!(summary.notices, 0);
}

#[test]
fn test_checkstyle_from_recognized_log() {
    let diagnostics = recognize(CI_LOG).unwrap();
    let xml = format_checkstyle(&diagnostics, None).unwrap();

    assert_eq!(xml.matches("<file ").count(), 5);
    assert!(xml.contains(
        r#"<error severity="error" line="42" column="5" message="missing semicolon"/>"#
    ));
    assert!(xml.contains(r#"<file name="config/ci.yaml">"#));
}

#[test]
fn test_windows_console_output() {
    let log = "\x1b[1mC:\\src\\app.c\x1b[0m:3:9: \x1b[35mwarning\x1b[0m: implicit conversion\r\n\
               C:\\src\\app.c:4:1: error: expected ';'\r\n";

    let diagnostics = recognize(log).unwrap();

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].file_name, "C:\\src\\app.c");
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[1].line, Some(4));
    assert_eq!(diagnostics[1].message.as_deref(), Some("expected ';'"));
}

#[test]
fn test_noise_only_log() {
    let log = "Compiling 12 files\nAll good, nothing to report.\n\n";
    assert!(recognize(log).unwrap().is_empty());
}
