// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Accumulator for named-field validation failures.
//!
//! A `FieldError` holds zero or more violations, each with a message, the
//! paths it applies to and optional details. Nested option structs report
//! their own errors and the caller re-roots them with [`FieldError::via_field`]
//! and friends before merging with [`FieldError::also`].

use std::collections::BTreeMap;
use std::fmt;

/// Path of the value being validated, before any prefix is applied.
pub const CURRENT_FIELD: &str = "";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Violation {
    message: String,
    paths: Vec<String>,
    details: String,
}

#[derive(Debug, Clone, Default)]
pub struct FieldError {
    violations: Vec<Violation>,
}

impl FieldError {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new<I, S>(message: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            violations: vec![Violation {
                message: message.into(),
                paths: paths.into_iter().map(Into::into).collect(),
                details: String::new(),
            }],
        }
    }

    /// Attaches details to every violation currently held.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        for violation in &mut self.violations {
            violation.details = details.clone();
        }
        self
    }

    pub fn missing_field<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("missing field(s)", paths)
    }

    pub fn disallowed_fields<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("must not set the field(s)", paths)
    }

    pub fn invalid_value(value: impl fmt::Display, path: impl Into<String>) -> Self {
        Self::new(format!("invalid value: {}", value), [path.into()])
    }

    pub fn invalid_array_value(value: impl fmt::Display, field: &str, index: usize) -> Self {
        Self::invalid_value(value, CURRENT_FIELD).via_field_index(field, index)
    }

    pub fn missing_one_of<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("expected exactly one, got neither", paths)
    }

    pub fn multiple_one_of<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("expected exactly one, got both", paths)
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn also(mut self, other: FieldError) -> Self {
        self.violations.extend(other.violations);
        self
    }

    pub fn via_field(mut self, prefix: &str) -> Self {
        for violation in &mut self.violations {
            for path in &mut violation.paths {
                *path = join_path(prefix, path);
            }
        }
        self
    }

    pub fn via_index(self, index: usize) -> Self {
        self.via_field(&format!("[{}]", index))
    }

    pub fn via_field_index(self, field: &str, index: usize) -> Self {
        self.via_index(index).via_field(field)
    }

    /// Violations sharing a message and details are folded together, paths
    /// are sorted and de-duplicated, and entries are ordered by message.
    fn normalized(&self) -> Vec<Violation> {
        let mut merged: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
        for violation in &self.violations {
            merged
                .entry((violation.message.clone(), violation.details.clone()))
                .or_default()
                .extend(violation.paths.iter().cloned());
        }
        merged
            .into_iter()
            .map(|((message, details), mut paths)| {
                paths.sort();
                paths.dedup();
                Violation {
                    message,
                    paths,
                    details,
                }
            })
            .collect()
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    if path == CURRENT_FIELD {
        prefix.to_string()
    } else if path.starts_with('[') {
        format!("{}{}", prefix, path)
    } else {
        format!("{}.{}", prefix, path)
    }
}

impl PartialEq for FieldError {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .normalized()
            .into_iter()
            .map(|v| {
                if v.details.is_empty() {
                    format!("{}: {}", v.message, v.paths.join(", "))
                } else {
                    format!("{}: {}\n{}", v.message, v.paths.join(", "), v.details)
                }
            })
            .collect();
        write!(f, "{}", rendered.join("\n"))
    }
}

impl std::error::Error for FieldError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_of(err: &FieldError) -> Vec<String> {
        err.normalized()
            .into_iter()
            .flat_map(|v| v.paths)
            .collect()
    }

    #[test]
    fn test_empty() {
        let errs = FieldError::empty();
        assert!(errs.is_empty());
        assert_eq!(errs.to_string(), "");
        assert!(errs.also(FieldError::empty()).is_empty());
    }

    #[test]
    fn test_via_field() {
        let cases = [(CURRENT_FIELD, "parent"), ("field", "parent.field"), ("[0]", "parent[0]")];
        for (path, expected) in cases {
            let err = FieldError::missing_field([path]).via_field("parent");
            assert_eq!(paths_of(&err), vec![expected.to_string()]);
        }
    }

    #[test]
    fn test_via_index() {
        let cases = [(CURRENT_FIELD, "[2]"), ("field", "[2].field"), ("[0]", "[2][0]")];
        for (path, expected) in cases {
            let err = FieldError::missing_field([path]).via_index(2);
            assert_eq!(paths_of(&err), vec![expected.to_string()]);
        }
    }

    #[test]
    fn test_via_field_index() {
        let cases = [
            (CURRENT_FIELD, "parent[2]"),
            ("field", "parent[2].field"),
            ("[0]", "parent[2][0]"),
        ];
        for (path, expected) in cases {
            let err = FieldError::missing_field([path]).via_field_index("parent", 2);
            assert_eq!(paths_of(&err), vec![expected.to_string()]);
        }
    }

    #[test]
    fn test_invalid_array_value() {
        let err = FieldError::invalid_array_value("my.function", "name(s)", 1);
        assert_eq!(err.to_string(), "invalid value: my.function: name(s)[1]");
    }

    #[test]
    fn test_display_merges_by_message() {
        let errs = FieldError::missing_field(["--namespace"])
            .also(FieldError::missing_one_of(["--git-repo", "--local-path"]))
            .also(FieldError::missing_field(["--image"]));
        assert_eq!(
            errs.to_string(),
            "expected exactly one, got neither: --git-repo, --local-path\nmissing field(s): --image, --namespace"
        );
    }

    #[test]
    fn test_details_are_rendered() {
        let err = FieldError::new("bad thing", ["field"]).with_details("try again");
        assert_eq!(err.to_string(), "bad thing: field\ntry again");
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = FieldError::missing_field(["b"]).also(FieldError::missing_field(["a"]));
        let b = FieldError::missing_field(["a", "b"]);
        assert_eq!(a, b);
        assert_ne!(a, FieldError::missing_field(["a"]));
    }
}
