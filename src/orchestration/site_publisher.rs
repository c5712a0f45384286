//! Site Publisher - Main orchestrator for static site publication
//!
//! Manages the complete publication workflow:
//! - Repository provisioning (create, or adopt an existing repository)
//! - Path normalization and bundle deduplication
//! - Content-addressed blob upload (parallel, bounded)
//! - Tree and commit construction
//! - Hosting branch reconciliation
//! - Static hosting activation
//!
//! Everything before the branch ref moves is unreachable from any ref,
//! so a failure part-way leaves the published site untouched; rerunning
//! the whole pipeline is always safe.

use std::sync::Arc;
use std::time::Instant;

use lazy_static::lazy_static;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Semaphore;

use crate::core::config::PublisherConfig;
use crate::core::error::PublishError;
use crate::core::traits::{GitHostApi, HostingSource, NewTreeEntry, RepositoryInfo};
use crate::orchestration::job_queue::PublishJobQueue;
use crate::remote::github::GithubClient;
use crate::validation::path_normalizer::{
    NormalizedFile, SiteFile, normalize_files, resolve_publish_dir,
};

lazy_static! {
    static ref REPO_NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
    static ref OWNER_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*$").unwrap();
}

/// One publish invocation, consumed whole
#[derive(Debug)]
pub struct PublishRequest {
    /// Bearer credential for the hosting platform
    pub credential: Option<SecretString>,

    /// Target repository, either "name" or "owner/name"
    pub target_repo: String,

    /// Requested publish subdirectory; only allow-listed values are
    /// honored, anything else publishes to the repository root
    pub publish_dir: Option<String>,

    /// The generated site bundle
    pub files: Vec<SiteFile>,
}

/// An uploaded blob, keyed by its final path in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub relative_path: String,
    pub object_id: String,
}

/// Report returned after a successful publish
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub message: String,
    pub repository_full_name: String,
    pub hosting_url: String,
    pub file_count: usize,
    pub published_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
}

/// Main site publication orchestrator
pub struct SitePublisher {
    api: Arc<dyn GitHostApi>,
    config: PublisherConfig,
}

impl SitePublisher {
    /// Create a publisher over any [`GitHostApi`] backend
    pub fn new(api: Arc<dyn GitHostApi>, config: PublisherConfig) -> Self {
        Self { api, config }
    }

    /// Publish a site bundle
    ///
    /// Runs the full pipeline and returns either a complete report or a
    /// single error carrying a stage prefix. There is no partial-success
    /// outcome: until the hosting branch moves, nothing observable has
    /// changed remotely.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishReport, PublishError> {
        let started = Instant::now();

        if request.credential.is_none() {
            return Err(PublishError::Authentication);
        }
        if request.files.is_empty() {
            return Err(PublishError::validation("the site bundle contains no files"));
        }

        let publish_dir = resolve_publish_dir(
            request.publish_dir.as_deref(),
            &self.config.allowed_publish_dirs,
        );
        if let Some(requested) = request.publish_dir.as_deref()
            && publish_dir.is_none()
        {
            tracing::warn!(requested, "publish directory not allow-listed, using root");
        }

        let files = normalize_files(&request.files, publish_dir)
            .map_err(|e| e.context("Failed to prepare site files"))?;
        let file_count = files.len();

        let repo = self
            .provision_repository(&request.target_repo)
            .await
            .map_err(|e| e.context("Failed to create repository"))?;
        tracing::info!(repo = %repo.full_name(), file_count, "publishing site");

        let blobs = self
            .upload_blobs(&repo, files)
            .await
            .map_err(|e| e.context("Failed to upload site files"))?;

        let branch = self.config.hosting_branch.clone();
        let parent = self
            .api
            .get_branch_tip(&repo, &branch)
            .await
            .map_err(|e| e.context("Failed to read hosting branch"))?;

        let commit_id = self
            .build_site_commit(&repo, &blobs, parent.as_deref())
            .await
            .map_err(|e| e.context("Failed to build site commit"))?;

        // The one irrevocable step: after this the new site is live
        match parent {
            Some(_) => self
                .api
                .update_branch_ref(&repo, &branch, &commit_id)
                .await
                .map_err(|e| e.context("Failed to advance hosting branch"))?,
            None => self
                .api
                .create_branch_ref(&repo, &branch, &commit_id)
                .await
                .map_err(|e| e.context("Failed to create hosting branch"))?,
        }

        self.activate_hosting(&repo, publish_dir)
            .await
            .map_err(|e| e.context("Failed to enable static hosting"))?;

        let repository_full_name = repo.full_name();
        let hosting_url = hosting_url(&repo);
        tracing::info!(%repository_full_name, %hosting_url, "site published");

        Ok(PublishReport {
            message: format!(
                "Published {} files to {} on branch {}",
                file_count, repository_full_name, branch
            ),
            repository_full_name,
            hosting_url,
            file_count,
            published_at: chrono::Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Resolve the target repository, creating it when necessary
    ///
    /// An "owner/name" target is taken verbatim without touching the
    /// network. A bare name is created under the authenticated account;
    /// when the platform answers that it already exists, the repository
    /// is adopted instead of failing, since publishing into one's own
    /// existing repository is the normal second-publish path.
    async fn provision_repository(&self, target: &str) -> Result<RepositoryInfo, PublishError> {
        let trimmed = target.trim();

        if let Some((owner, name)) = trimmed.split_once('/') {
            if !OWNER_RE.is_match(owner) || !REPO_NAME_RE.is_match(name) {
                return Err(PublishError::validation(format!(
                    "invalid repository target: {:?}",
                    target
                )));
            }
            return Ok(RepositoryInfo::new(owner, name));
        }

        if !REPO_NAME_RE.is_match(trimmed) {
            return Err(PublishError::validation(format!(
                "invalid repository name: {:?}",
                target
            )));
        }

        match self.api.create_repository(trimmed).await {
            Ok(repo) => Ok(repo),
            Err(error) if is_already_exists_conflict(&error) => {
                let identity = self.api.current_identity().await?;
                tracing::info!(
                    owner = %identity.login,
                    name = trimmed,
                    "repository already exists, publishing into it"
                );
                Ok(RepositoryInfo::new(identity.login, trimmed))
            }
            Err(error) => Err(error),
        }
    }

    /// Upload every file as a content-addressed blob
    ///
    /// Uploads run concurrently under a bounded semaphore; the blobs are
    /// inert until a ref points at them, so ordering between files does
    /// not matter. Any single failure fails the whole stage.
    async fn upload_blobs(
        &self,
        repo: &RepositoryInfo,
        files: Vec<NormalizedFile>,
    ) -> Result<Vec<BlobRef>, PublishError> {
        let semaphore = Arc::new(Semaphore::new(self.config.blob_concurrency));
        let mut tasks = Vec::with_capacity(files.len());

        for file in files {
            let semaphore = Arc::clone(&semaphore);
            let api = Arc::clone(&self.api);
            let repo = repo.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();
                let object_id = api.create_blob(&repo, &file.contents).await?;
                tracing::debug!(path = %file.relative_path, %object_id, "blob uploaded");
                Ok::<_, PublishError>(BlobRef {
                    relative_path: file.relative_path,
                    object_id,
                })
            }));
        }

        let mut blobs = Vec::with_capacity(tasks.len());
        for task in tasks {
            let blob = task.await.map_err(|e| PublishError::Network {
                message: format!("blob upload task failed: {}", e),
            })??;
            blobs.push(blob);
        }

        Ok(blobs)
    }

    /// Build one tree from the blob refs and one commit on top of it
    async fn build_site_commit(
        &self,
        repo: &RepositoryInfo,
        blobs: &[BlobRef],
        parent: Option<&str>,
    ) -> Result<String, PublishError> {
        let entries: Vec<NewTreeEntry> = blobs
            .iter()
            .map(|blob| NewTreeEntry {
                path: blob.relative_path.clone(),
                object_id: blob.object_id.clone(),
            })
            .collect();

        let tree_id = self.api.create_tree(repo, &entries).await?;
        self.api
            .create_commit(repo, &self.config.commit_message, &tree_id, parent)
            .await
    }

    /// Turn on hosting for the branch; "already configured" is success
    async fn activate_hosting(
        &self,
        repo: &RepositoryInfo,
        publish_dir: Option<&str>,
    ) -> Result<(), PublishError> {
        let source = HostingSource {
            branch: self.config.hosting_branch.clone(),
            path: match publish_dir {
                Some(dir) => format!("/{}", dir),
                None => "/".to_string(),
            },
        };

        match self.api.enable_hosting(repo, &source).await {
            Ok(()) => Ok(()),
            Err(error) if error.is_conflict() => {
                tracing::debug!(repo = %repo.full_name(), "hosting already enabled");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}

/// Public site URL for a repository
fn hosting_url(repo: &RepositoryInfo) -> String {
    format!("https://{}.github.io/{}", repo.owner.to_lowercase(), repo.name)
}

/// A conflict-shaped response reporting that the repository already
/// exists under the authenticated account
fn is_already_exists_conflict(error: &PublishError) -> bool {
    error.is_conflict()
        && error
            .remote_message()
            .is_some_and(|message| message.to_lowercase().contains("already exists"))
}

/// Publish a site bundle to GitHub, one job at a time
///
/// This is the crate's front door: it checks the credential, builds the
/// REST client, and runs the pipeline through the process-wide queue.
pub async fn publish_site(
    queue: &PublishJobQueue,
    config: PublisherConfig,
    request: PublishRequest,
) -> Result<PublishReport, PublishError> {
    let token = match &request.credential {
        Some(token) => SecretString::new(token.expose_secret().into()),
        None => return Err(PublishError::Authentication),
    };

    let api = Arc::new(GithubClient::new(token, &config)?);
    let publisher = SitePublisher::new(api, config);

    queue
        .run(|| async move { publisher.publish(&request).await })
        .await
}
