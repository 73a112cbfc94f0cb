use std::fmt;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::platform::github::GitHubPlatform;
use crate::platform::{DismissingInvalidator, Platform, PlatformTeamMembership};
use crate::policy::ReviewerPolicy;
use crate::webhook::{parse_pull_request_context, parse_review_context, read_event};
use crate::workflow::{ApprovalChecker, ReviewerAssigner, WorkflowOutcome};

/// The two things the bot can be asked to do for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AssignReviewers,
    CheckReviewers,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::AssignReviewers => f.write_str("assign-reviewers"),
            Operation::CheckReviewers => f.write_str("check-reviewers"),
        }
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub policy: Arc<ReviewerPolicy>,
    pub platform: Arc<dyn Platform>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let platform = Arc::new(GitHubPlatform::new(&config.github)?);
        Self::with_platform(config, platform)
    }

    pub fn with_platform(config: AppConfig, platform: Arc<dyn Platform>) -> Result<Self> {
        let policy = ReviewerPolicy::from_json(
            &config.reviewers.assignments,
            config.reviewers.default_reviewers.iter().cloned(),
        )?;

        Ok(Self {
            config,
            policy: Arc::new(policy),
            platform,
        })
    }

    /// Parse the configured event and run `operation` against it.
    pub async fn run_operation(&self, operation: Operation) -> Result<WorkflowOutcome> {
        self.config.validate_for(operation)?;
        let payload = read_event(self.config.event_path()?)?;

        match operation {
            Operation::AssignReviewers => {
                let context = parse_pull_request_context(&payload)?;
                tracing::info!(
                    pr = %context.pull_ref(),
                    author = %context.author,
                    "Assigning reviewers"
                );

                ReviewerAssigner::new(Arc::clone(&self.policy), Arc::clone(&self.platform))
                    .assign(&context)
                    .await
            }
            Operation::CheckReviewers => {
                let context = parse_review_context(&payload)?;
                tracing::info!(
                    pr = %context.pull_ref(),
                    author = %context.author,
                    reviewer = ?context.reviewer,
                    head_sha = %context.head_sha,
                    "Checking reviewers"
                );

                let membership = PlatformTeamMembership::new(Arc::clone(&self.platform));
                let invalidator = DismissingInvalidator::new(
                    Arc::clone(&self.platform),
                    self.config.github.dismiss_message.clone(),
                );

                ApprovalChecker::new(
                    Arc::clone(&self.policy),
                    Arc::clone(&self.platform),
                    Arc::new(membership),
                    Arc::new(invalidator),
                    self.config.team(),
                )
                .run(&context)
                .await
            }
        }
    }
}
