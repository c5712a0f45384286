//! Core traits and types for site publishing
//!
//! This module defines the abstraction over the remote Git-hosting
//! platform. The pipeline only ever talks to [`GitHostApi`], so any REST
//! backend exposing equivalent primitives (create repository, blob, tree,
//! commit, ref, hosting toggle) can sit behind it, including the in-memory
//! fake used by the pipeline tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::PublishError;

// ============================================================================
// Remote data carriers
// ============================================================================

/// A resolved target repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub owner: String,
    pub name: String,
}

impl RepositoryInfo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// "owner/name" as used in API paths and user-facing output
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// The authenticated account behind the credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub login: String,
}

/// One file entry for a tree object, referencing an uploaded blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTreeEntry {
    pub path: String,
    pub object_id: String,
}

/// Where the hosting platform serves the site from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingSource {
    /// Branch whose tree is served
    pub branch: String,
    /// "/" or an allow-listed subdirectory such as "/docs"
    pub path: String,
}

// ============================================================================
// Remote platform trait
// ============================================================================

/// Operations the publication pipeline needs from a Git-hosting platform
///
/// Every method maps to exactly one remote call. Implementations translate
/// non-success responses into [`PublishError`]: conflict-shaped responses
/// (HTTP 409/422) become `RemoteConflict`, other non-2xx responses become
/// `RemoteApi`, transport failures become `Network`.
#[async_trait]
pub trait GitHostApi: Send + Sync {
    /// Create a repository under the authenticated account
    async fn create_repository(&self, name: &str) -> Result<RepositoryInfo, PublishError>;

    /// Resolve the authenticated account
    async fn current_identity(&self) -> Result<Identity, PublishError>;

    /// Upload raw contents as a content-addressed blob, returning its
    /// object id
    async fn create_blob(
        &self,
        repo: &RepositoryInfo,
        contents: &str,
    ) -> Result<String, PublishError>;

    /// Current tip of the branch, or `None` when the branch does not exist
    async fn get_branch_tip(
        &self,
        repo: &RepositoryInfo,
        branch: &str,
    ) -> Result<Option<String>, PublishError>;

    /// Create a tree object from blob references, returning its object id
    async fn create_tree(
        &self,
        repo: &RepositoryInfo,
        entries: &[NewTreeEntry],
    ) -> Result<String, PublishError>;

    /// Create a commit pointing at a tree, with zero or one parent
    async fn create_commit(
        &self,
        repo: &RepositoryInfo,
        message: &str,
        tree_id: &str,
        parent: Option<&str>,
    ) -> Result<String, PublishError>;

    /// Create a new branch ref pointing at a commit
    async fn create_branch_ref(
        &self,
        repo: &RepositoryInfo,
        branch: &str,
        object_id: &str,
    ) -> Result<(), PublishError>;

    /// Advance an existing branch ref to a commit
    async fn update_branch_ref(
        &self,
        repo: &RepositoryInfo,
        branch: &str,
        object_id: &str,
    ) -> Result<(), PublishError>;

    /// Turn on static hosting for the given branch and path
    async fn enable_hosting(
        &self,
        repo: &RepositoryInfo,
        source: &HostingSource,
    ) -> Result<(), PublishError>;
}
