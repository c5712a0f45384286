//! Error handling for site publishing
//!
//! This module provides the error taxonomy for the publication pipeline
//! using the thiserror crate for ergonomic error handling. Conflict-shaped
//! remote responses get their own variant because some of them (repository
//! already exists, hosting already enabled) are absorbed into normal flow
//! rather than surfaced to the caller.

use thiserror::Error;

/// Main error type for site publishing operations
#[derive(Error, Debug)]
pub enum PublishError {
    // Local input errors
    #[error("validation failed: {message}")]
    Validation { message: String },

    // Credential errors
    #[error("no credential: a platform access token is required")]
    Authentication,

    // Conflict-shaped remote responses (HTTP 409/422)
    #[error("remote conflict: {message}")]
    RemoteConflict { status: u16, message: String },

    // Any other non-2xx remote response
    #[error("remote API error: {message}")]
    RemoteApi { status: u16, message: String },

    // Transport failures before a response was received
    #[error("network error: {message}")]
    Network { message: String },

    // A remote call exceeded its deadline
    #[error("timed out after {seconds}s while {stage}")]
    Timeout { stage: String, seconds: u64 },

    // Stage prefix attached by the pipeline, wrapping the cause
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<PublishError>,
    },
}

impl PublishError {
    /// Build a validation error from any displayable message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wrap this error with a stage description, e.g.
    /// "Failed to create repository"
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Peel off any stage wrappers and return the underlying error
    pub fn root(&self) -> &PublishError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check whether the underlying error is a conflict-shaped remote
    /// response
    pub fn is_conflict(&self) -> bool {
        matches!(self.root(), Self::RemoteConflict { .. })
    }

    /// The translated remote message, if this error carries one
    pub fn remote_message(&self) -> Option<&str> {
        match self.root() {
            Self::RemoteConflict { message, .. } | Self::RemoteApi { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }

    /// The HTTP status of the remote response, if this error carries one
    pub fn remote_status(&self) -> Option<u16> {
        match self.root() {
            Self::RemoteConflict { status, .. } | Self::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if retrying the whole pipeline could succeed
    ///
    /// Validation and credential problems need caller intervention;
    /// everything remote-side is worth another attempt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.root(), Self::Validation { .. } | Self::Authentication)
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self.root() {
            Self::Validation { .. } => "VALIDATION",
            Self::Authentication => "AUTHENTICATION",
            Self::RemoteConflict { .. } => "REMOTE_CONFLICT",
            Self::RemoteApi { .. } => "REMOTE_API",
            Self::Network { .. } => "NETWORK",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Context { .. } => unreachable!("root() never returns Context"),
        }
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network {
            message: error.to_string(),
        }
    }
}
