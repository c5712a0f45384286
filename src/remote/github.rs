//! GitHub REST backend for the publication pipeline
//!
//! Implements [`GitHostApi`] on top of the v3 REST API:
//! - `POST /user/repos` and `GET /user` for provisioning
//! - the git data endpoints (`git/blobs`, `git/trees`, `git/commits`,
//!   `git/refs`) for content-addressed object construction
//! - `POST /repos/{owner}/{repo}/pages` for hosting activation
//!
//! Every call runs under the configured deadline. Non-success responses
//! are translated into the shared error taxonomy: 409/422 become
//! `RemoteConflict`, everything else non-2xx becomes `RemoteApi`,
//! transport failures become `Network`.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::core::config::PublisherConfig;
use crate::core::deadline::with_deadline;
use crate::core::error::PublishError;
use crate::core::traits::{GitHostApi, HostingSource, Identity, NewTreeEntry, RepositoryInfo};
use crate::remote::error_body::translate_error_body;

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateRepositoryRequest<'a> {
    name: &'a str,
    // auto_init so the git data endpoints are usable immediately;
    // they reject a repository with no commits at all
    auto_init: bool,
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    name: String,
    owner: OwnerResponse,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    login: String,
}

#[derive(Debug, Serialize)]
struct CreateBlobRequest {
    content: String,
    encoding: &'static str,
}

#[derive(Debug, Serialize)]
struct TreeEntryRequest<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateTreeRequest<'a> {
    tree: Vec<TreeEntryRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct CreateCommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    full_ref: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRefRequest<'a> {
    sha: &'a str,
    // The hosting branch is deploy-only; latest publish always wins,
    // so non-fast-forward updates are expected
    force: bool,
}

#[derive(Debug, Serialize)]
struct EnableHostingRequest<'a> {
    source: HostingSourceRequest<'a>,
}

#[derive(Debug, Serialize)]
struct HostingSourceRequest<'a> {
    branch: &'a str,
    path: &'a str,
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObjectResponse,
}

#[derive(Debug, Deserialize)]
struct RefObjectResponse {
    sha: String,
}

// ============================================================================
// Client
// ============================================================================

/// reqwest-backed [`GitHostApi`] implementation for GitHub
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    token: SecretString,
    per_call_timeout: Duration,
}

impl GithubClient {
    /// Create a client for the given bearer credential and configuration
    pub fn new(token: SecretString, config: &PublisherConfig) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(PublishError::from)?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
            per_call_timeout: config.request_timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Attach auth headers and run the request under the deadline
    async fn send(
        &self,
        stage: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, PublishError> {
        let request = request
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .header(header::ACCEPT, "application/vnd.github+json");

        with_deadline(self.per_call_timeout, stage, async move {
            Ok(request.send().await?)
        })
        .await
    }

    /// Map a non-success response into the error taxonomy
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PublishError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = translate_error_body(code, &body);
        tracing::debug!(status = code, %message, "remote call failed");

        if matches!(code, 409 | 422) {
            Err(PublishError::RemoteConflict {
                status: code,
                message,
            })
        } else {
            Err(PublishError::RemoteApi {
                status: code,
                message,
            })
        }
    }
}

#[async_trait]
impl GitHostApi for GithubClient {
    async fn create_repository(&self, name: &str) -> Result<RepositoryInfo, PublishError> {
        let request = self.http.post(self.url("/user/repos")).json(
            &CreateRepositoryRequest {
                name,
                auto_init: true,
            },
        );

        let response = Self::check(self.send("creating repository", request).await?).await?;
        let repo: RepositoryResponse = response.json().await?;
        Ok(RepositoryInfo::new(repo.owner.login, repo.name))
    }

    async fn current_identity(&self) -> Result<Identity, PublishError> {
        let request = self.http.get(self.url("/user"));

        let response = Self::check(self.send("resolving identity", request).await?).await?;
        let identity: IdentityResponse = response.json().await?;
        Ok(Identity {
            login: identity.login,
        })
    }

    async fn create_blob(
        &self,
        repo: &RepositoryInfo,
        contents: &str,
    ) -> Result<String, PublishError> {
        let path = format!("/repos/{}/{}/git/blobs", repo.owner, repo.name);
        let request = self.http.post(self.url(&path)).json(&CreateBlobRequest {
            content: BASE64.encode(contents.as_bytes()),
            encoding: "base64",
        });

        let response = Self::check(self.send("uploading blob", request).await?).await?;
        let blob: ObjectResponse = response.json().await?;
        Ok(blob.sha)
    }

    async fn get_branch_tip(
        &self,
        repo: &RepositoryInfo,
        branch: &str,
    ) -> Result<Option<String>, PublishError> {
        let path = format!("/repos/{}/{}/git/ref/heads/{}", repo.owner, repo.name, branch);
        let request = self.http.get(self.url(&path));

        let response = self.send("reading branch", request).await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }

        let response = Self::check(response).await?;
        let branch_ref: RefResponse = response.json().await?;
        Ok(Some(branch_ref.object.sha))
    }

    async fn create_tree(
        &self,
        repo: &RepositoryInfo,
        entries: &[NewTreeEntry],
    ) -> Result<String, PublishError> {
        let path = format!("/repos/{}/{}/git/trees", repo.owner, repo.name);
        let tree = entries
            .iter()
            .map(|entry| TreeEntryRequest {
                path: &entry.path,
                mode: "100644",
                kind: "blob",
                sha: &entry.object_id,
            })
            .collect();
        let request = self
            .http
            .post(self.url(&path))
            .json(&CreateTreeRequest { tree });

        let response = Self::check(self.send("creating tree", request).await?).await?;
        let tree: ObjectResponse = response.json().await?;
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        repo: &RepositoryInfo,
        message: &str,
        tree_id: &str,
        parent: Option<&str>,
    ) -> Result<String, PublishError> {
        let path = format!("/repos/{}/{}/git/commits", repo.owner, repo.name);
        let request = self
            .http
            .post(self.url(&path))
            .json(&CreateCommitRequest {
                message,
                tree: tree_id,
                parents: parent.into_iter().collect(),
            });

        let response = Self::check(self.send("creating commit", request).await?).await?;
        let commit: ObjectResponse = response.json().await?;
        Ok(commit.sha)
    }

    async fn create_branch_ref(
        &self,
        repo: &RepositoryInfo,
        branch: &str,
        object_id: &str,
    ) -> Result<(), PublishError> {
        let path = format!("/repos/{}/{}/git/refs", repo.owner, repo.name);
        let request = self.http.post(self.url(&path)).json(&CreateRefRequest {
            full_ref: format!("refs/heads/{}", branch),
            sha: object_id,
        });

        Self::check(self.send("creating branch", request).await?).await?;
        Ok(())
    }

    async fn update_branch_ref(
        &self,
        repo: &RepositoryInfo,
        branch: &str,
        object_id: &str,
    ) -> Result<(), PublishError> {
        let path = format!(
            "/repos/{}/{}/git/refs/heads/{}",
            repo.owner, repo.name, branch
        );
        let request = self.http.patch(self.url(&path)).json(&UpdateRefRequest {
            sha: object_id,
            force: true,
        });

        Self::check(self.send("advancing branch", request).await?).await?;
        Ok(())
    }

    async fn enable_hosting(
        &self,
        repo: &RepositoryInfo,
        source: &HostingSource,
    ) -> Result<(), PublishError> {
        let path = format!("/repos/{}/{}/pages", repo.owner, repo.name);
        let request = self
            .http
            .post(self.url(&path))
            .json(&EnableHostingRequest {
                source: HostingSourceRequest {
                    branch: &source.branch,
                    path: &source.path,
                },
            });

        Self::check(self.send("enabling hosting", request).await?).await?;
        Ok(())
    }
}
