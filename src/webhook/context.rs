use std::path::Path;

use crate::error::{AppError, Result};
use crate::platform::types::PullRequestRef;

use super::events::{CheckEvent, PullRequestEvent, PullRequestReviewEvent};

/// The pull request a reviewer assignment is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    pub author: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub number: u64,
}

/// The pull request whose approvals are being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewContext {
    pub author: String,
    /// Set only when the event was a submitted review.
    pub reviewer: Option<String>,
    pub repo_owner: String,
    pub repo_name: String,
    pub number: u64,
    pub head_sha: String,
}

impl PullRequestContext {
    pub fn pull_ref(&self) -> PullRequestRef {
        PullRequestRef::new(&self.repo_owner, &self.repo_name, self.number)
    }
}

impl ReviewContext {
    pub fn pull_ref(&self) -> PullRequestRef {
        PullRequestRef::new(&self.repo_owner, &self.repo_name, self.number)
    }
}

pub fn read_event(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        AppError::Config(format!("failed to read event at {}: {e}", path.display()))
    })
}

/// Parse a `pull_request` opened payload.
pub fn parse_pull_request_context(payload: &[u8]) -> Result<PullRequestContext> {
    let event: PullRequestEvent = serde_json::from_slice(payload).map_err(undecodable)?;

    let context = PullRequestContext {
        author: event.pull_request.user.login,
        repo_owner: event.repository.owner.login,
        repo_name: event.repository.name,
        number: event.number,
    };

    require("pull request number", context.number != 0)?;
    require("pull request author", !context.author.is_empty())?;
    require("repository owner", !context.repo_owner.is_empty())?;
    require("repository name", !context.repo_name.is_empty())?;

    Ok(context)
}

/// Parse a synchronize or review-submitted payload, chosen by its `action`.
pub fn parse_review_context(payload: &[u8]) -> Result<ReviewContext> {
    match CheckEvent::parse(payload).map_err(undecodable)? {
        CheckEvent::Synchronize(event) => from_synchronize(event),
        CheckEvent::ReviewSubmitted(event) => from_review(event),
    }
}

fn from_synchronize(event: PullRequestEvent) -> Result<ReviewContext> {
    let head_sha = event
        .after
        .filter(|sha| !sha.is_empty())
        .unwrap_or(event.pull_request.head.sha);

    let context = ReviewContext {
        author: event.pull_request.user.login,
        reviewer: None,
        repo_owner: event.repository.owner.login,
        repo_name: event.repository.name,
        number: event.number,
        head_sha,
    };

    require("pull request number", context.number != 0)?;
    require("pull request author", !context.author.is_empty())?;
    require("repository owner", !context.repo_owner.is_empty())?;
    require("repository name", !context.repo_name.is_empty())?;
    require("head commit sha", !context.head_sha.is_empty())?;

    Ok(context)
}

fn from_review(event: PullRequestReviewEvent) -> Result<ReviewContext> {
    let reviewer = event.review.user.login;
    require("reviewer", !reviewer.is_empty())?;

    let context = ReviewContext {
        author: event.pull_request.user.login,
        reviewer: Some(reviewer),
        repo_owner: event.repository.owner.login,
        repo_name: event.repository.name,
        number: event.pull_request.number,
        head_sha: event.pull_request.head.sha,
    };

    require("pull request number", context.number != 0)?;
    require("pull request author", !context.author.is_empty())?;
    require("repository owner", !context.repo_owner.is_empty())?;
    require("repository name", !context.repo_name.is_empty())?;
    require("head commit sha", !context.head_sha.is_empty())?;

    Ok(context)
}

fn require(field: &str, present: bool) -> Result<()> {
    if present {
        Ok(())
    } else {
        Err(AppError::InsufficientData(format!("missing {field}")))
    }
}

fn undecodable(e: serde_json::Error) -> AppError {
    AppError::InsufficientData(format!("undecodable payload: {e}"))
}
