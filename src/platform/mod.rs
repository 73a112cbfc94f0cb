pub mod github;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// The slice of the GitHub REST API the bot consumes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Platform: Send + Sync {
    /// List every review submitted on a pull request, in API order.
    async fn list_reviews(&self, pull: &PullRequestRef) -> Result<Vec<Review>>;

    /// Request reviewers on a pull request and return the logins now requested.
    async fn request_reviewers(
        &self,
        pull: &PullRequestRef,
        reviewers: &[String],
    ) -> Result<Vec<String>>;

    /// Dismiss a single review.
    async fn dismiss_review(&self, pull: &PullRequestRef, review_id: u64, message: &str)
        -> Result<()>;

    /// List the logins of a team's members.
    async fn list_team_members(&self, org: &str, team_slug: &str) -> Result<Vec<String>>;
}

/// Resolves which logins belong to the internal team.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamMembership: Send + Sync {
    async fn members_of(&self, team: &TeamRef) -> Result<Vec<String>>;
}

/// Revokes the current reviews of a pull request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApprovalInvalidator: Send + Sync {
    async fn invalidate(&self, pull: &PullRequestRef, reviews: &ReviewSet) -> Result<()>;
}

/// Team membership answered by the platform's team listing.
pub struct PlatformTeamMembership {
    platform: Arc<dyn Platform>,
}

impl PlatformTeamMembership {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl TeamMembership for PlatformTeamMembership {
    async fn members_of(&self, team: &TeamRef) -> Result<Vec<String>> {
        self.platform.list_team_members(&team.org, &team.slug).await
    }
}

/// Invalidates approvals by dismissing reviews through the platform.
pub struct DismissingInvalidator {
    platform: Arc<dyn Platform>,
    message: String,
}

impl DismissingInvalidator {
    pub fn new(platform: Arc<dyn Platform>, message: impl Into<String>) -> Self {
        Self {
            platform,
            message: message.into(),
        }
    }
}

#[async_trait]
impl ApprovalInvalidator for DismissingInvalidator {
    async fn invalidate(&self, pull: &PullRequestRef, reviews: &ReviewSet) -> Result<()> {
        for review in reviews.iter() {
            // Comments and already-dismissed reviews cannot be dismissed again
            if !review.state.is_dismissable() {
                tracing::debug!(
                    pr = %pull,
                    reviewer = %review.reviewer,
                    state = %review.state,
                    "Skipping review that cannot be dismissed"
                );
                continue;
            }

            self.platform
                .dismiss_review(pull, review.id, &self.message)
                .await?;

            tracing::info!(
                pr = %pull,
                reviewer = %review.reviewer,
                review_id = review.id,
                "Dismissed review"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::error::AppError;

    fn review(id: u64, reviewer: &str, state: ReviewState) -> Review {
        Review {
            id,
            reviewer: reviewer.to_string(),
            state,
            commit_sha: "abc".to_string(),
            submitted_at: None,
        }
    }

    #[tokio::test]
    async fn test_dismisses_only_verdict_reviews() {
        let pull = PullRequestRef::new("octo", "demo", 7);
        let mut platform = MockPlatform::new();
        platform
            .expect_dismiss_review()
            .with(eq(pull.clone()), eq(1u64), eq("stale"))
            .times(1)
            .returning(|_, _, _| Ok(()));
        platform
            .expect_dismiss_review()
            .with(eq(pull.clone()), eq(3u64), eq("stale"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let invalidator = DismissingInvalidator::new(Arc::new(platform), "stale");
        let reviews = ReviewSet::from_reviews(vec![
            review(1, "admin", ReviewState::Approved),
            review(2, "carol", ReviewState::Commented),
            review(3, "dave", ReviewState::ChangesRequested),
        ]);

        invalidator.invalidate(&pull, &reviews).await.unwrap();
    }

    #[tokio::test]
    async fn test_dismissal_failure_propagates() {
        let mut platform = MockPlatform::new();
        platform
            .expect_dismiss_review()
            .times(1)
            .returning(|_, _, _| Err(AppError::GitHubApi("boom".to_string())));

        let invalidator = DismissingInvalidator::new(Arc::new(platform), "stale");
        let reviews = ReviewSet::from_reviews(vec![review(1, "admin", ReviewState::Approved)]);

        let err = invalidator
            .invalidate(&PullRequestRef::new("octo", "demo", 7), &reviews)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GitHubApi(_)));
    }

    #[tokio::test]
    async fn test_team_membership_reads_platform() {
        let mut platform = MockPlatform::new();
        platform
            .expect_list_team_members()
            .with(eq("octo-org"), eq("core"))
            .times(1)
            .returning(|_, _| Ok(vec!["alice".to_string()]));

        let membership = PlatformTeamMembership::new(Arc::new(platform));
        let team = TeamRef {
            org: "octo-org".to_string(),
            slug: "core".to_string(),
        };
        assert_eq!(membership.members_of(&team).await.unwrap(), vec!["alice"]);
    }
}
