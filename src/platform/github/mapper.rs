use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::types;

/// A review as returned by `GET /repos/{owner}/{repo}/pulls/{number}/reviews`.
#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub id: u64,
    pub user: Option<UserPayload>,
    pub state: types::ReviewState,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub login: String,
}

/// The pull request returned after requesting reviewers; only the fields we read.
#[derive(Debug, Deserialize)]
pub struct RequestedReviewersPayload {
    #[serde(default)]
    pub requested_reviewers: Vec<UserPayload>,
}

#[derive(Debug, Serialize)]
pub struct RequestReviewersBody<'a> {
    pub reviewers: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct DismissReviewBody<'a> {
    pub message: &'a str,
    pub event: &'static str,
}

/// Map a review payload to our platform Review type.
///
/// Reviews from deleted accounts carry no user and are dropped.
pub fn map_review(review: ReviewPayload) -> Option<types::Review> {
    let user = review.user?;
    Some(types::Review {
        id: review.id,
        reviewer: user.login,
        state: review.state,
        commit_sha: review.commit_id.unwrap_or_default(),
        submitted_at: review.submitted_at,
    })
}

pub fn map_requested_reviewers(pr: RequestedReviewersPayload) -> Vec<String> {
    pr.requested_reviewers.into_iter().map(|u| u.login).collect()
}
