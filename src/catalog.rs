//! @ai:module:intent Ordered catalog of diagnostic dialects recognized in tool output
//! @ai:module:layer domain
//! @ai:module:public_api Catalog, PatternRule, Field, EXCLUDE_FILE_PATTERN, EXCLUDE_MSG_PATTERN
//! @ai:module:depends_on error
//! @ai:module:stateless true
//!
//! Rules are tried in catalog order: when two rules can match text starting at
//! the same position, the earlier rule decides the extracted fields. Specific
//! dialects therefore come before the generic `file:line:` forms.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};

/// Vetoes file names that a rule captured from a non-diagnostic banner.
pub const EXCLUDE_FILE_PATTERN: &str = r"^(?:Used config files\b)";

/// Vetoes messages that a rule captured from a non-diagnostic line.
pub const EXCLUDE_MSG_PATTERN: &str = r"^(?:Placeholder pattern)";

const FILE: &str = r"\s*(?P<file_name>(?:[a-zA-Z]:)?[^: #\[\]\r\n]*?)\s*?";
const FILE_GROUP: &str = r"\s*(?P<file_group>\S.*?)\s*?";
const EOL: &str = r"[\r\n]";
const LINE: &str = r"\s*(?P<line>\d+?)\s*?";
const COLUMN: &str = r"\s*(?P<column>\d+?)\s*?";
const SEVERITY_WORD: &str = r"(?:fail(?:ure)?|error|warn(?:ing)?|notice|style|info)";
const MSG: &str = r"\s*(?P<message>.+?)\s*?";
const MULTILINE_MSG: &str = r"\s*(?P<message>(?:.|.[\r\n])+)";
// cpplint confidence index
const CONFIDENCE: &str = r"\s*\[(?P<confidence>\d+)\]\s*?";
const IDENTIFIER: &str = r"\w[\w\d]*";
const PHPUNIT_DATASET: &str = r#"(?P<dataset> with data set (?:#\d+|"[^"]+") \([^\n]*\))"#;

/// @ai:intent Named capture fields a rule may define
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FileName,
    Line,
    Column,
    Severity,
    Message,
    Confidence,
    FileGroup,
    FileEndgroup,
    SeverityGroup,
    SeverityEndgroup,
    Dataset,
    Classname,
    Method,
}

impl Field {
    pub const COUNT: usize = 13;

    pub const ALL: [Field; Field::COUNT] = [
        Field::FileName,
        Field::Line,
        Field::Column,
        Field::Severity,
        Field::Message,
        Field::Confidence,
        Field::FileGroup,
        Field::FileEndgroup,
        Field::SeverityGroup,
        Field::SeverityEndgroup,
        Field::Dataset,
        Field::Classname,
        Field::Method,
    ];

    /// @ai:intent Capture group name used in rule patterns
    /// @ai:effects pure
    pub fn name(&self) -> &'static str {
        match self {
            Field::FileName => "file_name",
            Field::Line => "line",
            Field::Column => "column",
            Field::Severity => "severity",
            Field::Message => "message",
            Field::Confidence => "confidence",
            Field::FileGroup => "file_group",
            Field::FileEndgroup => "file_endgroup",
            Field::SeverityGroup => "severity_group",
            Field::SeverityEndgroup => "severity_endgroup",
            Field::Dataset => "dataset",
            Field::Classname => "classname",
            Field::Method => "method",
        }
    }

    /// @ai:intent Look up a field by its capture group name
    /// @ai:effects pure
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    /// @ai:intent Position of this field in Field::ALL
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// @ai:intent Whether the field opens or closes a group rather than describing a diagnostic
    pub fn is_group_marker(&self) -> bool {
        matches!(
            self,
            Field::FileGroup | Field::FileEndgroup | Field::SeverityGroup | Field::SeverityEndgroup
        )
    }
}

/// @ai:intent One dialect: a named, compiled recognition pattern
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    source: String,
    regex: Regex,
    fields: Vec<Field>,
}

impl PatternRule {
    /// @ai:intent Compile and validate a rule
    /// @ai:pre source uses (?P<name>...) groups named after Field values
    /// @ai:post Err(InvalidPattern) when the pattern does not compile
    /// @ai:effects pure
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        let regex = compile_rule(&source, None).map_err(|e| Error::InvalidPattern {
            rule: name.clone(),
            source: e,
        })?;
        let fields = regex.capture_names().flatten().filter_map(Field::from_name).collect();

        Ok(Self {
            name,
            source,
            regex,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// @ai:intent Fields this rule can capture
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// @ai:intent Compile a pattern with the flags every rule is evaluated with
/// @ai:effects pure
pub(crate) fn compile_rule(
    source: &str,
    size_limit: Option<usize>,
) -> std::result::Result<Regex, regex::Error> {
    let mut builder = RegexBuilder::new(source);
    builder.case_insensitive(true).multi_line(true);
    if let Some(limit) = size_limit {
        builder.size_limit(limit);
    }
    builder.build()
}

/// @ai:intent Immutable, priority-ordered set of rules plus exclusion vetoes
#[derive(Debug, Clone)]
pub struct Catalog {
    rules: Vec<PatternRule>,
    exclude_file: Regex,
    exclude_msg: Regex,
}

impl Catalog {
    /// @ai:intent Build the catalog of all supported tool dialects
    /// @ai:post rules are validated once; a bad rule fails here, never during a pass
    /// @ai:effects pure
    pub fn builtin() -> Result<Self> {
        let rules = builtin_rules()
            .into_iter()
            .map(|(name, source)| PatternRule::new(name, source))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Compiled {} built-in pattern rules", rules.len());

        Self::new(rules, EXCLUDE_FILE_PATTERN, EXCLUDE_MSG_PATTERN)
    }

    /// @ai:intent Build a catalog from explicit rules, in priority order
    /// @ai:effects pure
    pub fn new(rules: Vec<PatternRule>, exclude_file: &str, exclude_msg: &str) -> Result<Self> {
        let exclude_file = Regex::new(exclude_file).map_err(|e| Error::InvalidPattern {
            rule: "exclude_file".to_string(),
            source: e,
        })?;
        let exclude_msg = Regex::new(exclude_msg).map_err(|e| Error::InvalidPattern {
            rule: "exclude_msg".to_string(),
            source: e,
        })?;

        Ok(Self {
            rules,
            exclude_file,
            exclude_msg,
        })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// @ai:intent Find a rule by name
    pub fn rule(&self, name: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn is_excluded_file(&self, file_name: &str) -> bool {
        self.exclude_file.is_match(file_name)
    }

    pub fn is_excluded_message(&self, message: &str) -> bool {
        self.exclude_msg.is_match(message)
    }
}

/// @ai:intent Name and pattern source of every built-in dialect, most specific first
/// @ai:effects pure
fn builtin_rules() -> Vec<(&'static str, String)> {
    let severity = format!(r"\s*(?P<severity>{SEVERITY_WORD})\s*?");
    let severity_group = format!(r"\s*(?P<severity_group>{SEVERITY_WORD})(?:\(s\)|s)?\s*?");
    let class_method =
        format!(r"\s*(?P<classname>{IDENTIFIER})::(?P<method>{IDENTIFIER})\b\s*?");

    vec![
        // sqlfluff
        //   == [models/orders.sql] FAIL
        //   L:  12 | P:   5 | LT01 | Expected single whitespace.
        //   All Finished!
        (
            "sqlfluff-group",
            format!(r"^== \[{FILE_GROUP}\]\s+{severity_group}$"),
        ),
        (
            "sqlfluff-message",
            format!(r"^L:{LINE}\|\s+P:{COLUMN}\|{MSG}$"),
        ),
        (
            "sqlfluff-endgroup",
            r"^(?P<file_endgroup>(?P<severity_endgroup>All Finished!))".to_string(),
        ),
        // phpunit
        //   There were 2 failures:
        //   1) FooTest::testBar with data set #0 ('a')
        //   Failed asserting that false is true.
        //   /app/tests/FooTest.php:42
        //   Tests: 5, Assertions: 9, Failures: 2, Skipped: 0.
        (
            "phpunit-summary",
            r"(?P<severity_endgroup>Tests: \d+, Assertions: \d+(?:, Errors: \d+)?(?:, Failures: \d+)(?:, Skipped: \d+))\.$"
                .to_string(),
        ),
        (
            "phpunit-severity-group",
            format!(r"^There were \d+ {severity_group}s?:$"),
        ),
        (
            "phpunit-failure",
            format!(
                r"^\d+\){class_method}{PHPUNIT_DATASET}?\n{MULTILINE_MSG}${FILE}:{LINE}$"
            ),
        ),
        // beautysh
        //   File ftp.sh: error: "esac" before "case" in line 90.
        //   File socks4echo.sh: error: indent/outdent mismatch: -2.
        (
            "beautysh-line",
            format!(r"^File {FILE}:{severity}: {MSG} in line {LINE}.$"),
        ),
        ("beautysh", format!(r"^File {FILE}:{severity}: {MSG}$")),
        // yamllint in GitHub format
        //   ##[group].pre-commit-config.yaml
        //   ##[error]97:14 [trailing-spaces] trailing spaces
        //   ##[endgroup]
        ("yamllint-group", format!(r"^##\[group\]{FILE_GROUP}$")),
        (
            "yamllint-message",
            // \b keeps the lazy column from stopping after its first digit
            format!(r"^##\[{severity}\]{LINE}:{COLUMN}\b{MSG}$"),
        ),
        (
            "yamllint-endgroup",
            r"^##(?P<file_endgroup>\[endgroup\])$".to_string(),
        ),
        // Emacs style
        //   path/to/file:845:5: error - Expected 1 space after closing brace
        (
            "emacs",
            format!(r"^{FILE}:{LINE}:{COLUMN}:{severity}(?:-\s+){MSG}$"),
        ),
        // GCC, Clang, rustc short format
        //   src/app.c:42:5: error: missing semicolon
        (
            "gcc",
            format!(r"^{FILE}:{LINE}:{COLUMN}:{severity}:{MSG}$"),
        ),
        // ESLint compact, RuboCop, shellcheck gcc format
        //   path/to/file.js:10:2: Some linting issue
        //   path/to/file.rb:10:5: Style/Indentation: Incorrect indentation detected
        //   path/to/script.sh:10:1: SC2034: Some shell script issue
        (
            "eslint-compact",
            format!(r"^{FILE}:{LINE}:{COLUMN}: {MSG}$"),
        ),
        // cpplint: '%s:%s:  %s  [%s] [%d]' % (file, line, message, category, confidence)
        ("cpplint", format!(r"^{FILE}:{LINE}:{MSG}{CONFIDENCE}$")),
        // MSVC
        //   file.cpp(10): error C1234: Some error message
        ("msvc", format!(r"^{FILE}\({LINE}\):{severity}{MSG}$")),
        // javac
        //   File.java:10: error: Some error message
        ("javac", format!(r"^{FILE}:{LINE}:{severity}:{MSG}$")),
        // Python traceback frame
        //   File "tools/build.py", line 90
        ("python", format!(r#"^File "{FILE}", line {LINE}$"#)),
        // Pylint and similar
        //   path/to/file.py:10: [C0111] Missing docstring
        ("pylint", format!(r"^{FILE}:{LINE}: {MSG}$")),
        // shellcheck tty format
        //   In script.sh line 76:
        //   echo $foo
        //        ^--^ SC2086: Double quote to prevent globbing.
        (
            "shellcheck",
            format!(r"^In {FILE} line {LINE}:{EOL}?(?:{MULTILINE_MSG})?{EOL}{EOL}"),
        ),
        // ESLint stylish
        //   /path/to/filename
        //     14:5  error  Unexpected trailing comma  comma-dangle
        (
            "eslint-stylish",
            format!(r"^{FILE}{EOL}\s+{LINE}:{COLUMN}\s+{severity}\s+{MSG}$"),
        ),
        // Phan
        //   path\to\file.php:379 PhanKey Message...
        ("phan", format!(r"^{FILE}:{LINE} {MSG}$")),
        // PHP fatal error
        //   PHP Fatal error:  Message in path/to/file on line 91
        (
            "php-fatal",
            format!(r"^(?:PHP )(?:Fatal )?{severity}:{MSG} in {FILE} on line {LINE}$"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_compiles() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.rules().len(), 23);
        assert_eq!(catalog.rules()[0].name(), "sqlfluff-group");
        assert_eq!(catalog.rules().last().unwrap().name(), "php-fatal");
    }

    #[test]
    fn test_rule_names_are_unique() {
        let catalog = Catalog::builtin().unwrap();
        let mut names: Vec<_> = catalog.rules().iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.rules().len());
    }

    #[test]
    fn test_generic_forms_follow_specific_ones() {
        let catalog = Catalog::builtin().unwrap();
        let position = |name: &str| {
            catalog
                .rules()
                .iter()
                .position(|r| r.name() == name)
                .unwrap()
        };

        assert!(position("yamllint-group") < position("eslint-compact"));
        assert!(position("emacs") < position("gcc"));
        assert!(position("gcc") < position("eslint-compact"));
        assert!(position("cpplint") < position("pylint"));
        assert!(position("pylint") < position("phan"));
    }

    #[test]
    fn test_rule_fields() {
        let catalog = Catalog::builtin().unwrap();

        let cpplint = catalog.rule("cpplint").unwrap();
        assert!(cpplint.fields().contains(&Field::Confidence));
        assert!(cpplint.fields().contains(&Field::FileName));

        let endgroup = catalog.rule("sqlfluff-endgroup").unwrap();
        assert!(endgroup.fields().iter().all(|f| f.is_group_marker()));
    }

    #[test]
    fn test_invalid_rule_is_rejected() {
        let err = PatternRule::new("broken", r"^(?P<file_name>unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref rule, .. } if rule == "broken"));
    }

    #[test]
    fn test_invalid_exclusion_is_rejected() {
        let err = Catalog::new(vec![], "(", EXCLUDE_MSG_PATTERN).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref rule, .. } if rule == "exclude_file"));
    }

    #[test]
    fn test_exclusions() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.is_excluded_file("Used config files"));
        assert!(!catalog.is_excluded_file("Used config filesystem"));
        assert!(!catalog.is_excluded_file("src/main.c"));
        assert!(catalog.is_excluded_message("Placeholder pattern here"));
        assert!(!catalog.is_excluded_message("missing semicolon"));
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
            assert_eq!(Field::ALL[field.index()], field);
        }
        assert_eq!(Field::from_name("nope"), None);
    }
}
