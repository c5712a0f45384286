//! Secure token manager with memory-safe handling and masking capabilities
//!
//! This module resolves the hosting-platform bearer credential from the
//! environment, using the `secrecy` crate to prevent accidental token
//! exposure in logs or memory dumps. The pipeline itself never reads the
//! environment; callers resolve a token here and pass it in explicitly.

use secrecy::SecretString;
use std::env;

/// Environment variables consulted for the credential, in priority order
const TOKEN_ENV_VARS: &[&str] = &["SITE_PUBLISHER_TOKEN", "GITHUB_TOKEN"];

/// Secure token manager for hosting-platform authentication
///
/// # Examples
///
/// ```
/// use site_publisher::security::SecureTokenManager;
///
/// let manager = SecureTokenManager::new();
/// if manager.has_token() {
///     println!("credential configured");
/// }
/// ```
#[derive(Default)]
pub struct SecureTokenManager;

impl SecureTokenManager {
    /// Creates a new SecureTokenManager
    pub fn new() -> Self {
        Self
    }

    /// Resolve the bearer credential from the environment
    ///
    /// Returns the first of `SITE_PUBLISHER_TOKEN`, `GITHUB_TOKEN` that
    /// is set and non-empty.
    pub fn resolve_token(&self) -> Option<SecretString> {
        for var in TOKEN_ENV_VARS {
            if let Ok(value) = env::var(var)
                && !value.trim().is_empty()
            {
                return Some(SecretString::new(value.into()));
            }
        }
        None
    }

    /// Checks if a credential is available
    pub fn has_token(&self) -> bool {
        self.resolve_token().is_some()
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification
    /// purposes. Tokens shorter than 10 characters are fully masked.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_publisher::security::SecureTokenManager;
    ///
    /// let manager = SecureTokenManager::new();
    /// assert_eq!(manager.mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(manager.mask_token("short"), "****");
    /// ```
    pub fn mask_token(&self, token: &str) -> String {
        if token.len() < 10 {
            return "****".to_string();
        }
        format!("{}...{}", &token[..3], &token[token.len() - 3..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token_long() {
        let manager = SecureTokenManager::new();
        assert_eq!(manager.mask_token("ghp_abcdefghij123"), "ghp...123");
    }

    #[test]
    fn test_mask_token_short() {
        let manager = SecureTokenManager::new();
        assert_eq!(manager.mask_token("tiny"), "****");
        assert_eq!(manager.mask_token(""), "****");
    }

    #[test]
    fn test_mask_token_boundary_length() {
        let manager = SecureTokenManager::new();
        // 9 chars: still fully masked
        assert_eq!(manager.mask_token("123456789"), "****");
        // 10 chars: partial reveal
        assert_eq!(manager.mask_token("1234567890"), "123...890");
    }
}
