use serde::Deserialize;
use std::path::PathBuf;

use crate::app::Operation;
use crate::error::{AppError, Result};
use crate::platform::types::TeamRef;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub reviewers: ReviewersConfig,
    #[serde(default)]
    pub team: TeamConfig,
    pub event_path: Option<PathBuf>,
}

#[derive(Deserialize, Clone)]
pub struct GitHubConfig {
    #[serde(default)]
    pub token: String,
    /// Base url of the REST API, for GitHub Enterprise installs.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_dismiss_message")]
    pub dismiss_message: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            dismiss_message: default_dismiss_message(),
        }
    }
}

// Manual Debug impl to avoid leaking the token
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("dismiss_message", &self.dismiss_message)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReviewersConfig {
    /// JSON object mapping author logins to their required reviewers.
    #[serde(default)]
    pub assignments: String,
    #[serde(default)]
    pub default_reviewers: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TeamConfig {
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub slug: String,
}

/// Values given on the command line; each one overrides the loaded configuration.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub token: Option<String>,
    pub assignments: Option<String>,
    pub event_path: Option<PathBuf>,
    pub org: Option<String>,
    pub team_slug: Option<String>,
    pub default_reviewers: Option<Vec<String>>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_dismiss_message() -> String {
    "Approvals invalidated: new commits were pushed after review.".to_string()
}

impl AppConfig {
    pub fn load(config_path: Option<&str>, overrides: Overrides) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("gatekeeper").required(false));
        }

        // Variables GitHub Actions provides to every step
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            builder = builder.set_default("github.token", token)?;
        }
        if let Ok(path) = std::env::var("GITHUB_EVENT_PATH") {
            builder = builder.set_default("event_path", path)?;
        }

        // Environment variable overrides with GATEKEEPER_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("GATEKEEPER")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("reviewers.default_reviewers")
                .try_parsing(true),
        );

        builder = builder
            .set_override_option("github.token", overrides.token)?
            .set_override_option("reviewers.assignments", overrides.assignments)?
            .set_override_option(
                "event_path",
                overrides
                    .event_path
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("team.org", overrides.org)?
            .set_override_option("team.slug", overrides.team_slug)?
            .set_override_option("reviewers.default_reviewers", overrides.default_reviewers)?;

        let config = builder.build()?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Check that everything `operation` needs is present before any API call is made.
    pub fn validate_for(&self, operation: Operation) -> Result<()> {
        if self.github.token.trim().is_empty() {
            return Err(AppError::Config("missing GitHub token".to_string()));
        }
        if self.reviewers.assignments.trim().is_empty() {
            return Err(AppError::Config("missing reviewer assignments".to_string()));
        }
        if self.event_path.is_none() {
            return Err(AppError::Config("missing event path".to_string()));
        }
        if operation == Operation::CheckReviewers {
            if self.team.org.trim().is_empty() {
                return Err(AppError::Config("missing organization".to_string()));
            }
            if self.team.slug.trim().is_empty() {
                return Err(AppError::Config("missing team slug".to_string()));
            }
        }
        Ok(())
    }

    pub fn event_path(&self) -> Result<&PathBuf> {
        self.event_path
            .as_ref()
            .ok_or_else(|| AppError::Config("missing event path".to_string()))
    }

    pub fn team(&self) -> TeamRef {
        TeamRef {
            org: self.team.org.clone(),
            slug: self.team.slug.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            github: GitHubConfig {
                token: "secret-token".to_string(),
                api_url: None,
                request_timeout_secs: default_request_timeout_secs(),
                dismiss_message: default_dismiss_message(),
            },
            reviewers: ReviewersConfig {
                assignments: r#"{"alice": ["bob"]}"#.to_string(),
                default_reviewers: vec![],
            },
            team: TeamConfig {
                org: "octo-org".to_string(),
                slug: "core".to_string(),
            },
            event_path: Some(PathBuf::from("/tmp/event.json")),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = config();
        assert!(config.validate_for(Operation::AssignReviewers).is_ok());
        assert!(config.validate_for(Operation::CheckReviewers).is_ok());
    }

    #[test]
    fn test_missing_token() {
        let mut config = config();
        config.github.token = String::new();
        assert!(matches!(
            config.validate_for(Operation::AssignReviewers),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_assignments() {
        let mut config = config();
        config.reviewers.assignments = "  ".to_string();
        assert!(matches!(
            config.validate_for(Operation::CheckReviewers),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_team_only_required_for_check() {
        let mut config = config();
        config.team = TeamConfig::default();
        assert!(config.validate_for(Operation::AssignReviewers).is_ok());
        assert!(matches!(
            config.validate_for(Operation::CheckReviewers),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_event_path() {
        let mut config = config();
        config.event_path = None;
        assert!(config.validate_for(Operation::AssignReviewers).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", config().github);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_load_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatekeeper.toml");
        std::fs::write(
            &path,
            r#"
event_path = "/from/file.json"

[github]
token = "file-token"
request_timeout_secs = 5

[reviewers]
assignments = '{"alice": ["bob"]}'
default_reviewers = ["admin"]

[team]
org = "octo-org"
slug = "core"
"#,
        )
        .unwrap();

        let overrides = Overrides {
            token: Some("flag-token".to_string()),
            team_slug: Some("maintainers".to_string()),
            ..Default::default()
        };
        let config = AppConfig::load(path.to_str(), overrides).unwrap();

        assert_eq!(config.github.token, "flag-token");
        assert_eq!(config.github.request_timeout_secs, 5);
        assert_eq!(config.reviewers.default_reviewers, vec!["admin"]);
        assert_eq!(config.team.org, "octo-org");
        assert_eq!(config.team.slug, "maintainers");
        assert_eq!(config.event_path, Some(PathBuf::from("/from/file.json")));
    }
}
