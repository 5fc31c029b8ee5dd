//! Non-fatal validation results.
//!
//! Validation never stops at the first problem: every check appends to a
//! [`Violations`] list so a single round trip can report everything that
//! is wrong with a schema, a settings bag or a content instance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One validation failure: a machine-readable code and the path it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Stable code, e.g. `invalid_initial_place`.
    pub code: String,
    /// Dotted path to the offending value, e.g. `places.draft.label`.
    /// Empty for violations on the validated value itself.
    pub path: String,
}

impl Violation {
    pub fn new(code: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} at {}", self.code, self.path)
        }
    }
}

/// Ordered list of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a violation.
    pub fn add(&mut self, code: impl Into<String>, path: impl Into<String>) {
        self.0.push(Violation::new(code, path));
    }

    /// Appends every violation of `other`, prefixing its paths with `prefix`.
    pub fn extend_at(&mut self, prefix: &str, other: Violations) {
        for v in other.0 {
            let path = match (prefix.is_empty(), v.path.is_empty()) {
                (true, _) => v.path,
                (false, true) => prefix.to_string(),
                (false, false) => format!("{prefix}.{}", v.path),
            };
            self.0.push(Violation { code: v.code, path });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Codes in the order they were recorded.
    pub fn codes(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.code.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

impl Extend<Violation> for Violations {
    fn extend<T: IntoIterator<Item = Violation>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(", "))
    }
}
