//! @ai:module:intent Rewrite file names for CI consumers (GitHub workspace paths, CheckStyle root)
//! @ai:module:layer infrastructure
//! @ai:module:public_api WorkspacePaths, strip_root, to_unix_separators
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use regex::Regex;

/// @ai:intent Rewrites absolute runner paths into repository-relative paths
#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    prefix: Regex,
}

/// Keeps every path unchanged.
const KEEP_ALL: &str = r"^(.*)";
/// Drops a leading slash when the workspace has no owner/repo tail.
const DROP_LEADING_SLASH: &str = r"^/?(.*)";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        rule: "workspace-prefix".to_string(),
        source,
    })
}

impl WorkspacePaths {
    /// @ai:intent Build the prefix rewrite from a GITHUB_WORKSPACE value
    /// @ai:example (Some("/home/runner/work/owner/repo")) -> strips everything up to "owner/repo/"
    /// @ai:example (None) -> keeps paths as they are
    /// @ai:effects pure
    pub fn from_workspace(workspace: Option<&str>) -> Result<Self> {
        let Some(workspace) = workspace else {
            return Ok(Self {
                prefix: compile(KEEP_ALL)?,
            });
        };

        let tail = compile(r"([^/\\]+)[/\\]([^/\\]+)$")?;
        let pattern = match tail.captures(workspace) {
            Some(caps) => format!(
                r"^(?:.*?/){}/{}/(.*)$",
                regex::escape(&caps[1]),
                regex::escape(&caps[2])
            ),
            None => DROP_LEADING_SLASH.to_string(),
        };

        tracing::debug!(workspace, %pattern, "workspace path rewrite");
        Ok(Self {
            prefix: compile(&pattern)?,
        })
    }

    /// @ai:intent Convert a reported path into a workspace-relative unix path
    /// @ai:post unchanged apart from separators when the path is outside the workspace
    /// @ai:effects pure
    pub fn fix(&self, path: &str) -> String {
        let unix = to_unix_separators(path);
        match self.prefix.captures(&unix) {
            Some(caps) => caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            None => unix,
        }
    }
}

/// @ai:intent Replace Windows separators with forward slashes
/// @ai:effects pure
pub fn to_unix_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// @ai:intent Remove a root directory prefix from a file name
/// @ai:pre root is a directory; a trailing separator is implied
/// @ai:example ("/work/src/a.c", "/work") -> "src/a.c"
/// @ai:effects pure
pub fn strip_root<'a>(path: &'a str, root: &str) -> &'a str {
    if root.is_empty() {
        return path;
    }

    let stripped = if root.ends_with('/') || root.ends_with('\\') {
        path.strip_prefix(root)
    } else {
        path.strip_prefix(root)
            .and_then(|rest| rest.strip_prefix(|c: char| c == '/' || c == '\\'))
    };

    stripped.unwrap_or(path)
}
