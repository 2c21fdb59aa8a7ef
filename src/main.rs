//! @ai:module:intent CLI entry point: convert tool output into CheckStyle, GitLab or GitHub annotations
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on recognizer, output, config, paths

use clap::Parser;
use colored::Colorize;
use logtocs_parser::{
    output, select_recognizer, Catalog, CiEnvironment, EngineConfig, Error, OutputFormat,
    RecognitionMode, ReportConfig, Result, WorkspacePaths,
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "logtocs")]
#[command(
    author,
    version,
    about = "Convert build, lint and test tool output to CheckStyle XML"
)]
struct Cli {
    /// Input file. Use '-' or omit for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Output file. Use '-' or omit for stdout, '' to skip stdout
    #[arg(default_value = "-")]
    output: String,

    /// Input file name, overrides the positional input
    #[arg(short = 'i', long = "in", value_name = "FILE")]
    input_named: Option<PathBuf>,

    /// Output file name, overrides the positional output
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    output_named: Option<PathBuf>,

    /// Root directory removed from file paths [default: working directory]
    #[arg(long, value_name = "ROOT_PATH")]
    root: Option<String>,

    /// Print GitHub Actions annotations (default when GITHUB_ACTIONS=true)
    #[arg(long, overrides_with = "no_github_annotate")]
    github_annotate: bool,

    #[arg(long, overrides_with = "github_annotate", hide = true)]
    no_github_annotate: bool,

    /// Write a GitLab Code Quality report (default when GITLAB_CI=true)
    #[arg(long, overrides_with = "no_gitlab")]
    gitlab: bool,

    #[arg(long, overrides_with = "gitlab", hide = true)]
    no_gitlab: bool,

    /// Write the recognized diagnostics as JSON
    #[arg(long, conflicts_with = "gitlab")]
    json: bool,

    /// Report file names only
    #[arg(long)]
    name_only: bool,

    /// Match line by line instead of scanning the whole text
    #[arg(long)]
    line_mode: bool,

    /// Print a per-severity summary to stderr
    #[arg(long)]
    summary: bool,
}

/// @ai:intent Resolve a --flag/--no-flag pair against a default
fn toggle(on: bool, off: bool, default: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        default
    }
}

fn read_input(cli: &Cli) -> Result<String> {
    let path = match (&cli.input_named, cli.input.as_str()) {
        (Some(named), _) => Some(named.clone()),
        (None, "-") => None,
        (None, positional) => Some(PathBuf::from(positional)),
    };

    match path {
        Some(path) => std::fs::read(&path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|source| Error::FileRead { path, source }),
        None => {
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

fn output_path(cli: &Cli) -> Option<PathBuf> {
    match (&cli.output_named, cli.output.as_str()) {
        (Some(named), _) => Some(named.clone()),
        (None, "-" | "") => None,
        (None, positional) => Some(PathBuf::from(positional)),
    }
}

fn run(cli: Cli) -> Result<()> {
    let ci = CiEnvironment::detect();
    let github_annotate = toggle(cli.github_annotate, cli.no_github_annotate, ci.github_actions);
    let gitlab = toggle(cli.gitlab, cli.no_gitlab, ci.gitlab_ci);

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?.to_string_lossy().into_owned(),
    };

    let report = ReportConfig {
        format: if gitlab {
            OutputFormat::GitLab
        } else if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::CheckStyle
        },
        root_path: Some(root),
        github_annotate,
        name_only: cli.name_only,
        summary: cli.summary,
    };
    let engine = EngineConfig {
        mode: if cli.line_mode {
            RecognitionMode::Line
        } else {
            RecognitionMode::Auto
        },
        ..Default::default()
    };

    let text = read_input(&cli)?;
    let recognizer = select_recognizer(Arc::new(Catalog::builtin()?), &engine)?;
    let diagnostics = recognizer.recognize(&text);
    tracing::info!(
        mode = ?recognizer.mode(),
        count = diagnostics.len(),
        "recognized diagnostics"
    );

    if report.name_only {
        print!("{}", output::format_file_names(&diagnostics));
    } else {
        let rendered = output::format_report(&diagnostics, &report)?;

        if let Some(path) = output_path(&cli) {
            std::fs::write(&path, &rendered)
                .map_err(|source| Error::FileWrite { path, source })?;
        }

        if report.github_annotate {
            let paths = WorkspacePaths::from_workspace(ci.github_workspace.as_deref())?;
            print!("{}", output::format_github_annotations(&diagnostics, &paths));
        } else if !cli.output.is_empty() {
            println!("{rendered}");
        }
    }

    if report.summary {
        eprint!("{}", output::format_summary(&diagnostics));
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("logtocs=warn,logtocs_parser=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_prefers_explicit_flags() {
        assert!(toggle(true, false, false));
        assert!(!toggle(false, true, true));
        assert!(toggle(false, false, true));
        assert!(!toggle(false, false, false));
    }

    #[test]
    fn test_named_paths_override_positional() {
        let cli = Cli::parse_from(["logtocs", "in.log", "out.xml", "--in", "a.log", "-o", "b.xml"]);
        assert_eq!(output_path(&cli), Some(PathBuf::from("b.xml")));
        assert_eq!(cli.input_named, Some(PathBuf::from("a.log")));
    }

    #[test]
    fn test_empty_output_means_no_file() {
        let cli = Cli::parse_from(["logtocs", "in.log", ""]);
        assert_eq!(output_path(&cli), None);
        assert!(cli.output.is_empty());
    }

    #[test]
    fn test_negated_flags() {
        let cli = Cli::parse_from(["logtocs", "--github-annotate", "--no-github-annotate"]);
        assert!(!toggle(cli.github_annotate, cli.no_github_annotate, true));

        let cli = Cli::parse_from(["logtocs", "--no-gitlab", "--gitlab"]);
        assert!(toggle(cli.gitlab, cli.no_gitlab, false));
    }
}
