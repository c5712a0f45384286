//! Configuration structures and types for site-publisher
//!
//! This module provides type-safe configuration management with serde
//! support. Values resolve in three layers: built-in defaults, an optional
//! `.site-publisher.yaml` file, and `SITE_PUBLISHER_*` environment
//! variables (highest priority).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::PublishError;

/// Configuration file name looked up next to the bundle
pub const CONFIG_FILE_NAME: &str = ".site-publisher.yaml";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublisherConfig {
    /// Base URL of the hosting platform REST API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Branch served by the static hosting platform
    #[serde(default = "default_hosting_branch")]
    pub hosting_branch: String,

    /// Repository subdirectories a publish may target; anything else
    /// falls back to the repository root
    #[serde(default = "default_allowed_publish_dirs")]
    pub allowed_publish_dirs: Vec<String>,

    /// Deadline applied to each remote call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum concurrent blob uploads
    #[serde(default = "default_blob_concurrency")]
    pub blob_concurrency: usize,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Message recorded on each publish commit
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_hosting_branch() -> String {
    "gh-pages".to_string()
}

fn default_allowed_publish_dirs() -> Vec<String> {
    vec!["docs".to_string()]
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_blob_concurrency() -> usize {
    8
}

fn default_user_agent() -> String {
    concat!("site-publisher/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_commit_message() -> String {
    "Publish site update".to_string()
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            hosting_branch: default_hosting_branch(),
            allowed_publish_dirs: default_allowed_publish_dirs(),
            request_timeout_secs: default_request_timeout_secs(),
            blob_concurrency: default_blob_concurrency(),
            user_agent: default_user_agent(),
            commit_message: default_commit_message(),
        }
    }
}

impl PublisherConfig {
    /// Load configuration from an optional YAML file, then apply
    /// environment variable overrides
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory searched for `.site-publisher.yaml`; pass
    ///   `None` to skip the file layer
    pub async fn load(dir: Option<&Path>) -> Result<Self, PublishError> {
        let mut config = Self::default();

        if let Some(path) = dir.map(|d| d.join(CONFIG_FILE_NAME))
            && tokio::fs::metadata(&path).await.is_ok()
        {
            let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
                PublishError::validation(format!("cannot read {}: {}", path.display(), e))
            })?;
            config = serde_yaml::from_str(&raw).map_err(|e| {
                PublishError::validation(format!("cannot parse {}: {}", path.display(), e))
            })?;
        }

        config.apply_env_overrides(std::env::vars().collect());
        config.validate()?;
        Ok(config)
    }

    /// Apply `SITE_PUBLISHER_*` overrides from the given environment map
    pub fn apply_env_overrides(&mut self, env: HashMap<String, String>) {
        if let Some(value) = env.get("SITE_PUBLISHER_API_BASE") {
            self.api_base = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = env.get("SITE_PUBLISHER_BRANCH") {
            self.hosting_branch = value.clone();
        }
        if let Some(value) = env.get("SITE_PUBLISHER_TIMEOUT_SECS")
            && let Ok(secs) = value.parse()
        {
            self.request_timeout_secs = secs;
        }
        if let Some(value) = env.get("SITE_PUBLISHER_BLOB_CONCURRENCY")
            && let Ok(count) = value.parse()
        {
            self.blob_concurrency = count;
        }
        if let Some(value) = env.get("SITE_PUBLISHER_COMMIT_MESSAGE") {
            self.commit_message = value.clone();
        }
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.hosting_branch.trim().is_empty() {
            return Err(PublishError::validation("hosting branch must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(PublishError::validation(
                "request timeout must be at least 1 second",
            ));
        }
        if self.blob_concurrency == 0 {
            return Err(PublishError::validation(
                "blob concurrency must be at least 1",
            ));
        }
        Ok(())
    }

    /// Per-call deadline as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
