use thiserror::Error;

use crate::platform::types::PullRequestRef;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insufficient data in event payload: {0}")]
    InsufficientData(String),

    #[error("{pull}: required reviewer {reviewer} has not reviewed yet")]
    MissingReviewer {
        pull: PullRequestRef,
        reviewer: String,
    },

    #[error("{pull}: required reviewer {reviewer} has not approved yet (state: {state})")]
    ApprovalPending {
        pull: PullRequestRef,
        reviewer: String,
        state: String,
    },

    #[error("{pull}: pull request has no reviews")]
    NoReviews { pull: PullRequestRef },

    #[error("{pull}: failed to request all required reviewers, missing: {}", .missing.join(", "))]
    AssignmentIncomplete {
        pull: PullRequestRef,
        missing: Vec<String>,
    },

    #[error(
        "{pull}: approvals for external author {author} were given on a stale commit \
         (head {head_sha}) and have been dismissed"
    )]
    ApprovalsInvalidated {
        pull: PullRequestRef,
        author: String,
        head_sha: String,
    },

    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("GitHub API call timed out after {secs}s: {operation}")]
    Timeout { operation: String, secs: u64 },
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl AppError {
    /// Whether this error means "not ready to merge yet" rather than a fault.
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            AppError::MissingReviewer { .. }
                | AppError::ApprovalPending { .. }
                | AppError::NoReviews { .. }
                | AppError::ApprovalsInvalidated { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
