//! Remote platform integration
//!
//! The reqwest-backed GitHub client and the error-payload translator it
//! relies on. Everything above this layer talks to the platform through
//! the `GitHostApi` trait only.

pub mod error_body;
pub mod github;

pub use error_body::translate_error_body;
pub use github::GithubClient;
