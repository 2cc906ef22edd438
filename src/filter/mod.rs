//! Path filter module
//!
//! Decides which paths of the served tree are visible. Rules are evaluated in order and the
//! first matching rule wins; a path no rule matches is visible. A hidden directory hides its
//! whole subtree, see [`Filter::is_reachable`].
//!
//! Filters are immutable once built and evaluated fresh on every request.

mod rule;

pub use rule::{Action, Line, Rule};

use std::path::Path;

use crate::error::FilterError;

/// Ordered list of compiled include/exclude rules
#[derive(Debug, Clone, Default)]
pub struct Filter {
    rules: Vec<Rule>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from rule lines such as `- hidden.txt` or `+ *.jpg`
    pub fn from_rules<I, S>(lines: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::new();
        for line in lines {
            filter.add_rule(line.as_ref())?;
        }
        Ok(filter)
    }

    /// Appends one rule line. `!` clears the rules added so far.
    pub fn add_rule(&mut self, line: &str) -> Result<(), FilterError> {
        match Rule::parse_line(line)? {
            Some(Line::Rule(rule)) => self.rules.push(rule),
            Some(Line::Clear) => self.rules.clear(),
            None => {}
        }
        Ok(())
    }

    /// Appends the rules of a file, one rule per line
    pub fn add_rules_file(&mut self, path: &Path) -> Result<(), FilterError> {
        let text = std::fs::read_to_string(path).map_err(|source| FilterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        for line in text.lines() {
            self.add_rule(line)?;
        }
        Ok(())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates the rules for `path` alone, ignoring its ancestors
    pub fn is_visible(&self, path: &str, is_dir: bool) -> bool {
        if path.is_empty() {
            return true;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(path, is_dir))
            .map_or(true, |rule| rule.action() == Action::Include)
    }

    /// Checks `path` and every ancestor directory of it
    pub fn is_reachable(&self, path: &str, is_dir: bool) -> bool {
        path.match_indices('/')
            .all(|(idx, _)| self.is_visible(&path[..idx], true))
            && self.is_visible(path, is_dir)
    }
}
