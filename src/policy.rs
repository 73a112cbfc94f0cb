use std::collections::{BTreeSet, HashMap};

use crate::error::{AppError, Result};

/// Who must review whose pull requests.
///
/// Authors without an entry of their own (external contributors) fall back to
/// the default reviewers. The policy never changes once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerPolicy {
    required: HashMap<String, BTreeSet<String>>,
    defaults: BTreeSet<String>,
}

impl ReviewerPolicy {
    pub fn new<I, S>(required: HashMap<String, BTreeSet<String>>, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required,
            defaults: defaults.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a policy from a JSON object such as `{"alice": ["bob", "carol"]}`.
    pub fn from_json<I, S>(assignments: &str, defaults: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if assignments.trim().is_empty() {
            return Err(AppError::Config("reviewer assignments are empty".to_string()));
        }

        let parsed: HashMap<String, Vec<String>> = serde_json::from_str(assignments)
            .map_err(|e| AppError::Config(format!("invalid reviewer assignments: {e}")))?;

        let required = parsed
            .into_iter()
            .map(|(author, reviewers)| (author, reviewers.into_iter().collect()))
            .collect();

        Ok(Self::new(required, defaults))
    }

    pub fn required_reviewers_for(&self, author: &str) -> &BTreeSet<String> {
        self.required.get(author).unwrap_or(&self.defaults)
    }

    /// Whether `author` has an entry of their own rather than the default one.
    pub fn has_explicit_entry(&self, author: &str) -> bool {
        self.required.contains_key(author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(logins: &[&str]) -> BTreeSet<String> {
        logins.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_listed_author_gets_configured_reviewers() {
        let policy = ReviewerPolicy::from_json(
            r#"{"foo": ["bar", "baz"], "baz": ["foo", "car"], "bar": ["admin", "foo"]}"#,
            ["admin"],
        )
        .unwrap();

        assert_eq!(policy.required_reviewers_for("foo"), &set(&["bar", "baz"]));
        assert_eq!(policy.required_reviewers_for("baz"), &set(&["foo", "car"]));
        assert_eq!(policy.required_reviewers_for("bar"), &set(&["admin", "foo"]));
        assert!(policy.has_explicit_entry("foo"));
    }

    #[test]
    fn test_unlisted_author_gets_defaults() {
        let policy = ReviewerPolicy::from_json(r#"{"alice": ["bob"]}"#, ["admin", "root"]).unwrap();

        assert_eq!(policy.required_reviewers_for("dave"), &set(&["admin", "root"]));
        assert!(!policy.has_explicit_entry("dave"));
    }

    #[test]
    fn test_empty_defaults() {
        let policy =
            ReviewerPolicy::from_json(r#"{"alice": ["bob"]}"#, Vec::<String>::new()).unwrap();
        assert!(policy.required_reviewers_for("dave").is_empty());
    }

    #[test]
    fn test_empty_assignments_rejected() {
        let err = ReviewerPolicy::from_json("", ["admin"]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_malformed_assignments_rejected() {
        for input in [
            "not json",
            r#"["alice", "bob"]"#,
            r#"{"alice": "bob"}"#,
            r#"{"alice": [1, 2]}"#,
        ] {
            let err = ReviewerPolicy::from_json(input, ["admin"]).unwrap_err();
            assert!(matches!(err, AppError::Config(_)), "accepted {input}");
        }
    }

    #[test]
    fn test_duplicate_reviewers_collapse() {
        let policy = ReviewerPolicy::from_json(r#"{"alice": ["bob", "bob"]}"#, ["admin"]).unwrap();
        assert_eq!(policy.required_reviewers_for("alice").len(), 1);
    }
}
