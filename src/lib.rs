pub mod core;
pub mod orchestration;
pub mod remote;
pub mod security;
pub mod validation;

pub use self::core::*;
pub use orchestration::{
    BlobRef, PublishJobQueue, PublishReport, PublishRequest, SitePublisher, publish_site,
};
pub use remote::{GithubClient, translate_error_body};
pub use security::{OauthStateStore, SecureTokenManager};
pub use validation::{NormalizedFile, SiteFile, normalize_files, normalize_path, resolve_publish_dir};
