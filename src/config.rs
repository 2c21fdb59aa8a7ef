//! @ai:module:intent Configuration for the recognition engine and report output
//! @ai:module:layer infrastructure
//! @ai:module:public_api EngineConfig, ReportConfig, CiEnvironment
//! @ai:module:depends_on recognizer, output
//! @ai:module:stateless true

use crate::output::OutputFormat;
use crate::recognizer::RecognitionMode;
use std::collections::HashMap;

/// Size budget for the combined full-text pattern.
pub const DEFAULT_COMBINED_SIZE_LIMIT: usize = 64 * (1 << 20);

/// @ai:intent Settings for building a recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub mode: RecognitionMode,
    pub combined_size_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: RecognitionMode::Auto,
            combined_size_limit: DEFAULT_COMBINED_SIZE_LIMIT,
        }
    }
}

impl EngineConfig {
    /// @ai:intent Configuration that always uses per-line matching
    pub fn line_mode() -> Self {
        Self {
            mode: RecognitionMode::Line,
            ..Default::default()
        }
    }
}

/// @ai:intent Settings for rendering recognized diagnostics
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    pub format: OutputFormat,
    /// Prefix removed from file names in CheckStyle output.
    pub root_path: Option<String>,
    pub github_annotate: bool,
    pub name_only: bool,
    pub summary: bool,
}

/// @ai:intent CI facts read from the process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnvironment {
    pub github_actions: bool,
    pub gitlab_ci: bool,
    pub github_workspace: Option<String>,
}

impl CiEnvironment {
    /// @ai:intent Read CI variables from the current process environment
    /// @ai:effects env
    pub fn detect() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// @ai:intent Build from an explicit set of variables
    /// @ai:example ([("GITHUB_ACTIONS", "true")]) -> github_actions = true
    /// @ai:effects pure
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            github_actions: vars.get("GITHUB_ACTIONS").is_some_and(|v| v == "true"),
            gitlab_ci: vars.get("GITLAB_CI").is_some_and(|v| v == "true"),
            github_workspace: vars.get("GITHUB_WORKSPACE").cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ci_environment_from_vars() {
        let env = CiEnvironment::from_vars([
            ("GITHUB_ACTIONS", "true"),
            ("GITLAB_CI", "false"),
            ("GITHUB_WORKSPACE", "/home/runner/work/app/app"),
        ]);

        assert!(env.github_actions);
        assert!(!env.gitlab_ci);
        assert_eq!(
            env.github_workspace.as_deref(),
            Some("/home/runner/work/app/app")
        );
    }

    #[test]
    fn test_ci_environment_empty() {
        let env = CiEnvironment::from_vars(Vec::<(String, String)>::new());
        assert_eq!(env, CiEnvironment::default());
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.mode, RecognitionMode::Auto);
        assert_eq!(config.combined_size_limit, DEFAULT_COMBINED_SIZE_LIMIT);
        assert_eq!(EngineConfig::line_mode().mode, RecognitionMode::Line);
    }
}
