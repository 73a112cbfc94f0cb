use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coordinates of a single pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Organization and team whose members count as internal contributors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub org: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub reviewer: String,
    pub state: ReviewState,
    pub commit_sha: String,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    Commented,
    ChangesRequested,
    Dismissed,
    Pending,
    #[serde(other)]
    Unknown,
}

impl ReviewState {
    /// GitHub only accepts dismissals for reviews that carry a verdict.
    pub fn is_dismissable(&self) -> bool {
        matches!(self, ReviewState::Approved | ReviewState::ChangesRequested)
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewState::Approved => "APPROVED",
            ReviewState::Commented => "COMMENTED",
            ReviewState::ChangesRequested => "CHANGES_REQUESTED",
            ReviewState::Dismissed => "DISMISSED",
            ReviewState::Pending => "PENDING",
            ReviewState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Current reviews of a pull request, keyed by reviewer login.
///
/// Only the most recent review of each reviewer is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSet {
    by_reviewer: BTreeMap<String, Review>,
}

impl ReviewSet {
    /// Collect reviews, letting later reviews of the same reviewer replace earlier ones.
    ///
    /// Reviews are ordered by submission time first; reviews without one (pending)
    /// sort before submitted ones, and ties keep the order the API returned.
    pub fn from_reviews(reviews: impl IntoIterator<Item = Review>) -> Self {
        let mut reviews: Vec<Review> = reviews.into_iter().collect();
        reviews.sort_by_key(|r| r.submitted_at);

        let mut by_reviewer = BTreeMap::new();
        for review in reviews {
            by_reviewer.insert(review.reviewer.clone(), review);
        }
        Self { by_reviewer }
    }

    pub fn is_empty(&self) -> bool {
        self.by_reviewer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_reviewer.len()
    }

    pub fn get(&self, reviewer: &str) -> Option<&Review> {
        self.by_reviewer.get(reviewer)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Review> {
        self.by_reviewer.values()
    }

    /// Reviews recorded against a commit other than `head_sha`.
    pub fn stale_reviews<'a>(&'a self, head_sha: &'a str) -> impl Iterator<Item = &'a Review> {
        self.iter().filter(move |r| r.commit_sha != head_sha)
    }
}

impl FromIterator<Review> for ReviewSet {
    fn from_iter<I: IntoIterator<Item = Review>>(iter: I) -> Self {
        Self::from_reviews(iter)
    }
}
