pub mod state_store;
pub mod token_manager;

pub use state_store::OauthStateStore;
pub use token_manager::SecureTokenManager;
