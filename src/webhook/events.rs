use serde::Deserialize;

/// Just enough of any payload to read its `action` discriminator.
#[derive(Debug, Deserialize)]
pub struct ActionProbe {
    #[serde(default)]
    pub action: Option<String>,
}

/// What a review-check payload turned out to be, decided by its action.
#[derive(Debug)]
pub enum CheckEvent {
    /// New commits were pushed to the pull request branch.
    Synchronize(PullRequestEvent),
    /// A review was submitted (any other action).
    ReviewSubmitted(PullRequestReviewEvent),
}

impl CheckEvent {
    pub const SYNCHRONIZE: &'static str = "synchronize";

    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        let probe: ActionProbe = serde_json::from_slice(payload)?;
        match probe.action.as_deref() {
            Some(Self::SYNCHRONIZE) => {
                Ok(CheckEvent::Synchronize(serde_json::from_slice(payload)?))
            }
            _ => Ok(CheckEvent::ReviewSubmitted(serde_json::from_slice(payload)?)),
        }
    }
}

/// A `pull_request` event (opened, synchronize, ...).
#[derive(Debug, Default, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub number: u64,
    /// Head SHA after a push; only present on synchronize.
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub pull_request: PullRequestPayload,
    #[serde(default)]
    pub repository: RepositoryPayload,
}

/// A `pull_request_review` event.
#[derive(Debug, Default, Deserialize)]
pub struct PullRequestReviewEvent {
    #[serde(default)]
    pub review: ReviewPayload,
    #[serde(default)]
    pub pull_request: PullRequestPayload,
    #[serde(default)]
    pub repository: RepositoryPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewPayload {
    #[serde(default)]
    pub user: UserPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub head: HeadPayload,
    #[serde(default)]
    pub user: UserPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeadPayload {
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: UserPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub login: String,
}
