use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;

use crate::config::GitHubConfig;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

use super::mapper::{self, DismissReviewBody, RequestReviewersBody};

const PER_PAGE: u32 = 100;

pub struct GitHubPlatform {
    client: Octocrab,
    timeout: Duration,
}

impl GitHubPlatform {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(AppError::Config("missing GitHub token".to_string()));
        }

        let mut builder = Octocrab::builder().personal_token(config.token.clone());
        if let Some(api_url) = &config.api_url {
            builder = builder.base_uri(api_url.as_str()).map_err(|e| {
                AppError::Config(format!("Invalid GitHub API url {api_url}: {e}"))
            })?;
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build octocrab client: {e}")))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Apply the configured deadline to a single API call.
    async fn with_deadline<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, octocrab::Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| AppError::GitHubApi(format!("{operation}: {e}"))),
            Err(_) => Err(AppError::Timeout {
                operation: operation.to_string(),
                secs: self.timeout.as_secs(),
            }),
        }
    }

    /// Fetch every page of a list endpoint.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        operation: &str,
        route: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let params = [("per_page", PER_PAGE), ("page", page)];
            let batch: Vec<T> = self
                .with_deadline(operation, self.client.get(route, Some(&params)))
                .await?;
            let done = batch.len() < PER_PAGE as usize;
            items.extend(batch);
            if done {
                return Ok(items);
            }
            page += 1;
        }
    }

    fn pulls_route(pull: &PullRequestRef) -> String {
        format!(
            "/repos/{}/{}/pulls/{}",
            urlencoding::encode(&pull.owner),
            urlencoding::encode(&pull.repo),
            pull.number
        )
    }
}

#[async_trait]
impl Platform for GitHubPlatform {
    async fn list_reviews(&self, pull: &PullRequestRef) -> Result<Vec<Review>> {
        let route = format!("{}/reviews", Self::pulls_route(pull));
        let operation = format!("list reviews of {pull}");

        let payloads: Vec<mapper::ReviewPayload> = self.get_all_pages(&operation, &route).await?;

        Ok(payloads.into_iter().filter_map(mapper::map_review).collect())
    }

    async fn request_reviewers(
        &self,
        pull: &PullRequestRef,
        reviewers: &[String],
    ) -> Result<Vec<String>> {
        let route = format!("{}/requested_reviewers", Self::pulls_route(pull));
        let operation = format!("request reviewers on {pull}");
        let body = RequestReviewersBody { reviewers };

        let pr: mapper::RequestedReviewersPayload = self
            .with_deadline(&operation, self.client.post(&route, Some(&body)))
            .await?;

        Ok(mapper::map_requested_reviewers(pr))
    }

    async fn dismiss_review(
        &self,
        pull: &PullRequestRef,
        review_id: u64,
        message: &str,
    ) -> Result<()> {
        let route = format!(
            "{}/reviews/{review_id}/dismissals",
            Self::pulls_route(pull)
        );
        let operation = format!("dismiss review {review_id} on {pull}");
        let body = DismissReviewBody {
            message,
            event: "DISMISS",
        };

        let _: serde_json::Value = self
            .with_deadline(&operation, self.client.put(&route, Some(&body)))
            .await?;

        Ok(())
    }

    async fn list_team_members(&self, org: &str, team_slug: &str) -> Result<Vec<String>> {
        let route = format!(
            "/orgs/{}/teams/{}/members",
            urlencoding::encode(org),
            urlencoding::encode(team_slug)
        );
        let operation = format!("list members of {org}/{team_slug}");

        let members: Vec<mapper::UserPayload> = self.get_all_pages(&operation, &route).await?;

        Ok(members.into_iter().map(|m| m.login).collect())
    }
}
