use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::platform::types::{ReviewSet, ReviewState, TeamRef};
use crate::platform::{ApprovalInvalidator, Platform, TeamMembership};
use crate::policy::ReviewerPolicy;
use crate::webhook::ReviewContext;
use crate::workflow::types::{ApprovalState, WorkflowOutcome};

/// Decides whether a pull request holds every required approval.
///
/// For external authors the approvals must also have been given on the current
/// head commit; stale approvals are dismissed and the check fails.
pub struct ApprovalChecker {
    policy: Arc<ReviewerPolicy>,
    platform: Arc<dyn Platform>,
    membership: Arc<dyn TeamMembership>,
    invalidator: Arc<dyn ApprovalInvalidator>,
    team: TeamRef,
}

impl ApprovalChecker {
    pub fn new(
        policy: Arc<ReviewerPolicy>,
        platform: Arc<dyn Platform>,
        membership: Arc<dyn TeamMembership>,
        invalidator: Arc<dyn ApprovalInvalidator>,
        team: TeamRef,
    ) -> Self {
        Self {
            policy,
            platform,
            membership,
            invalidator,
            team,
        }
    }

    /// Fetch the current reviews of the pull request and check them.
    pub async fn run(&self, context: &ReviewContext) -> Result<WorkflowOutcome> {
        let pull = context.pull_ref();
        let reviews = ReviewSet::from_reviews(self.platform.list_reviews(&pull).await?);

        let summary: Vec<String> = reviews
            .iter()
            .map(|r| format!("{}={}@{}", r.reviewer, r.state, r.commit_sha))
            .collect();
        tracing::info!(pr = %pull, reviews = ?summary, "Fetched current reviews");

        self.check(context, &reviews).await
    }

    pub async fn check(
        &self,
        context: &ReviewContext,
        reviews: &ReviewSet,
    ) -> Result<WorkflowOutcome> {
        let pull = context.pull_ref();
        if reviews.is_empty() {
            return Err(AppError::NoReviews { pull });
        }

        let mut state = ApprovalState::Incomplete;
        loop {
            tracing::debug!(pr = %pull, ?state, "Evaluating approvals");
            state = match state {
                ApprovalState::Incomplete => {
                    self.require_approvals(context, reviews)?;
                    if self.is_internal(&context.author).await {
                        ApprovalState::InternalComplete
                    } else {
                        ApprovalState::ExternalPendingValidation
                    }
                }
                ApprovalState::ExternalPendingValidation => {
                    self.validate_commits(context, reviews).await?
                }
                ApprovalState::InternalComplete => {
                    return Ok(WorkflowOutcome::Approved { internal: true });
                }
                ApprovalState::Complete => {
                    return Ok(WorkflowOutcome::Approved { internal: false });
                }
                ApprovalState::Invalidated => {
                    return Err(AppError::ApprovalsInvalidated {
                        pull,
                        author: context.author.clone(),
                        head_sha: context.head_sha.clone(),
                    });
                }
            };
        }
    }

    /// Every required reviewer must have an approving latest review.
    fn require_approvals(&self, context: &ReviewContext, reviews: &ReviewSet) -> Result<()> {
        let pull = context.pull_ref();
        let required = self.policy.required_reviewers_for(&context.author);
        tracing::info!(
            pr = %pull,
            author = %context.author,
            required = ?required,
            "Checking approvals from required reviewers"
        );

        for reviewer in required {
            let review = reviews.get(reviewer).ok_or_else(|| AppError::MissingReviewer {
                pull: pull.clone(),
                reviewer: reviewer.clone(),
            })?;
            if review.state != ReviewState::Approved {
                return Err(AppError::ApprovalPending {
                    pull,
                    reviewer: reviewer.clone(),
                    state: review.state.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Revoke every review if any of them was given on a commit other than the head.
    async fn validate_commits(
        &self,
        context: &ReviewContext,
        reviews: &ReviewSet,
    ) -> Result<ApprovalState> {
        let pull = context.pull_ref();
        let stale: Vec<&str> = reviews
            .stale_reviews(&context.head_sha)
            .map(|r| r.reviewer.as_str())
            .collect();

        if stale.is_empty() {
            return Ok(ApprovalState::Complete);
        }

        tracing::warn!(
            pr = %pull,
            author = %context.author,
            head_sha = %context.head_sha,
            stale = ?stale,
            "Invalidating approvals for external contributor"
        );
        self.invalidator.invalidate(&pull, reviews).await?;

        Ok(ApprovalState::Invalidated)
    }

    /// An author is internal when they belong to the team and have their own policy entry.
    ///
    /// A failed membership lookup counts as external.
    async fn is_internal(&self, author: &str) -> bool {
        let members = match self.membership.members_of(&self.team).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(
                    author = %author,
                    org = %self.team.org,
                    team = %self.team.slug,
                    error = %e,
                    "Failed to resolve team membership, treating author as external"
                );
                return false;
            }
        };

        members.iter().any(|m| m == author) && self.policy.has_explicit_entry(author)
    }
}
