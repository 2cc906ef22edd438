//! Single filter rule parsing and compilation
//!
//! Patterns follow the rclone conventions: a leading `/` anchors the pattern at the root,
//! otherwise it matches the trailing segments of a path at any depth. `*` stays within a
//! segment, `**` crosses segments.

use globset::{GlobBuilder, GlobMatcher};

use crate::error::FilterError;

/// Whether a matching rule shows or hides the path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Include,
    Exclude,
}

/// One parsed line of a rule list
#[derive(Debug, Clone)]
pub enum Line {
    Rule(Rule),
    /// `!` drops every rule collected so far
    Clear,
}

/// A compiled `+`/`-` rule
#[derive(Debug, Clone)]
pub struct Rule {
    source: String,
    action: Action,
    files: Option<GlobMatcher>,
    dirs: Vec<GlobMatcher>,
}

impl Rule {
    /// Parses one line of rule text. Blank lines and `#`/`;` comments yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Line>, FilterError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            return Ok(None);
        }
        if line == "!" {
            return Ok(Some(Line::Clear));
        }

        let (action, pattern) = if let Some(pattern) = line.strip_prefix("- ") {
            (Action::Exclude, pattern)
        } else if let Some(pattern) = line.strip_prefix("+ ") {
            (Action::Include, pattern)
        } else {
            return Err(FilterError::InvalidRule(line.to_string()));
        };

        Self::compile(action, pattern.trim()).map(|rule| Some(Line::Rule(rule)))
    }

    /// Compiles a pattern into matchers for files and for directories.
    ///
    /// * `dir/` matches directories only.
    /// * `dir/**` matches everything below `dir` and the directory itself.
    /// * Include rules also match the parent directories their pattern names, so that
    ///   `+ a/b/*.txt` stays reachable after a later `- **`.
    pub fn compile(action: Action, pattern: &str) -> Result<Self, FilterError> {
        let anchored = pattern.starts_with('/');
        let body = pattern.trim_start_matches('/');
        if body.is_empty() || body == "/" {
            return Err(FilterError::InvalidRule(pattern.to_string()));
        }

        let mut files = None;
        let mut dirs = Vec::new();

        if let Some(dir) = body.strip_suffix('/') {
            dirs.push(glob(dir, anchored, pattern)?);
        } else {
            files = Some(glob(body, anchored, pattern)?);
            if body == "**" {
                dirs.push(glob("**", anchored, pattern)?);
            } else if let Some(dir) = body.strip_suffix("/**") {
                dirs.push(glob(dir, anchored, pattern)?);
                dirs.push(glob(body, anchored, pattern)?);
            }
        }

        if action == Action::Include {
            let parent = body.trim_end_matches('/');
            for (idx, _) in parent.match_indices('/') {
                let prefix = &parent[..idx];
                if prefix.contains("**") {
                    // Every directory below the part before `**`
                    dirs.push(glob(prefix, anchored, pattern)?);
                    break;
                }
                dirs.push(glob(prefix, anchored, pattern)?);
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            action,
            files,
            dirs,
        })
    }

    pub const fn action(&self) -> Action {
        self.action
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Checks whether this rule applies to `path`
    pub fn matches(&self, path: &str, is_dir: bool) -> bool {
        if is_dir {
            self.dirs.iter().any(|matcher| matcher.is_match(path))
        } else {
            self.files
                .as_ref()
                .is_some_and(|matcher| matcher.is_match(path))
        }
    }
}

fn glob(body: &str, anchored: bool, source: &str) -> Result<GlobMatcher, FilterError> {
    let pattern = if anchored || body.starts_with("**") {
        body.to_string()
    } else {
        format!("**/{body}")
    };

    GlobBuilder::new(&pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source_err| FilterError::Pattern {
            pattern: source.to_string(),
            source: source_err,
        })
}
