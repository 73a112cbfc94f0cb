use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::platform::Platform;
use crate::policy::ReviewerPolicy;
use crate::webhook::PullRequestContext;
use crate::workflow::types::WorkflowOutcome;

/// Requests the required reviewers on a newly opened pull request.
pub struct ReviewerAssigner {
    policy: Arc<ReviewerPolicy>,
    platform: Arc<dyn Platform>,
}

impl ReviewerAssigner {
    pub fn new(policy: Arc<ReviewerPolicy>, platform: Arc<dyn Platform>) -> Self {
        Self { policy, platform }
    }

    pub async fn assign(&self, context: &PullRequestContext) -> Result<WorkflowOutcome> {
        let pull = context.pull_ref();
        let required: Vec<String> = self
            .policy
            .required_reviewers_for(&context.author)
            .iter()
            .cloned()
            .collect();

        // Nothing to request, so no API call is made
        if required.is_empty() {
            tracing::warn!(
                pr = %pull,
                author = %context.author,
                "No reviewers configured for author, nothing to request"
            );
            return Ok(WorkflowOutcome::ReviewersAssigned { reviewers: required });
        }

        tracing::info!(
            pr = %pull,
            author = %context.author,
            reviewers = ?required,
            "Requesting reviewers"
        );

        let requested = self.platform.request_reviewers(&pull, &required).await?;

        // The API silently drops logins it cannot request (unknown users, non-collaborators)
        let requested: HashSet<&str> = requested.iter().map(String::as_str).collect();
        let missing: Vec<String> = required
            .iter()
            .filter(|r| !requested.contains(r.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(AppError::AssignmentIncomplete { pull, missing });
        }

        tracing::info!(pr = %pull, "All required reviewers requested");
        Ok(WorkflowOutcome::ReviewersAssigned { reviewers: required })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::platform::types::PullRequestRef;
    use crate::platform::MockPlatform;

    fn policy() -> Arc<ReviewerPolicy> {
        let mut required = HashMap::new();
        required.insert(
            "alice".to_string(),
            ["bob", "carol"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        );
        Arc::new(ReviewerPolicy::new(required, ["admin"]))
    }

    fn context(author: &str) -> PullRequestContext {
        PullRequestContext {
            author: author.to_string(),
            repo_owner: "octo".to_string(),
            repo_name: "demo".to_string(),
            number: 2,
        }
    }

    fn logins(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_assigns_required_reviewers() {
        let mut platform = MockPlatform::new();
        platform
            .expect_request_reviewers()
            .withf(|pull, reviewers| {
                pull == &PullRequestRef::new("octo", "demo", 2) && reviewers == ["bob", "carol"]
            })
            .times(1)
            .returning(|_, _| Ok(logins(&["bob", "carol", "someone-else"])));

        let assigner = ReviewerAssigner::new(policy(), Arc::new(platform));
        let outcome = assigner.assign(&context("alice")).await.unwrap();

        assert_eq!(
            outcome,
            WorkflowOutcome::ReviewersAssigned {
                reviewers: logins(&["bob", "carol"])
            }
        );
    }

    #[tokio::test]
    async fn test_external_author_gets_default_reviewers() {
        let mut platform = MockPlatform::new();
        platform
            .expect_request_reviewers()
            .with(eq(PullRequestRef::new("octo", "demo", 2)), eq(logins(&["admin"])))
            .times(1)
            .returning(|_, _| Ok(logins(&["admin"])));

        let assigner = ReviewerAssigner::new(policy(), Arc::new(platform));
        assert!(assigner.assign(&context("dave")).await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_reviewer_is_reported() {
        let mut platform = MockPlatform::new();
        platform
            .expect_request_reviewers()
            .times(1)
            .returning(|_, _| Ok(logins(&["bob"])));

        let assigner = ReviewerAssigner::new(policy(), Arc::new(platform));
        let err = assigner.assign(&context("alice")).await.unwrap_err();

        match err {
            AppError::AssignmentIncomplete { pull, missing } => {
                assert_eq!(pull.to_string(), "octo/demo#2");
                assert_eq!(missing, logins(&["carol"]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let mut platform = MockPlatform::new();
        platform
            .expect_request_reviewers()
            .times(1)
            .returning(|_, _| Err(AppError::GitHubApi("422 Unprocessable Entity".to_string())));

        let assigner = ReviewerAssigner::new(policy(), Arc::new(platform));
        let err = assigner.assign(&context("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::GitHubApi(_)));
    }

    #[tokio::test]
    async fn test_no_reviewers_configured_skips_request() {
        let policy = Arc::new(ReviewerPolicy::new(HashMap::new(), Vec::<String>::new()));
        let platform = MockPlatform::new();

        let assigner = ReviewerAssigner::new(policy, Arc::new(platform));
        let outcome = assigner.assign(&context("dave")).await.unwrap();
        assert_eq!(outcome, WorkflowOutcome::ReviewersAssigned { reviewers: vec![] });
    }
}
