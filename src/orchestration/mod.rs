//! Orchestration layer for site publishing
//!
//! This module provides the high-level components that run a publish
//! from start to finish: the staged pipeline and the process-wide job
//! queue that serializes invocations.

pub mod job_queue;
pub mod site_publisher;

// Re-export main types for convenience
pub use job_queue::PublishJobQueue;
pub use site_publisher::{BlobRef, PublishReport, PublishRequest, SitePublisher, publish_site};
