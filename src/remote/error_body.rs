//! Translation of remote API error payloads
//!
//! Hosting platforms answer failures with a loosely-shaped JSON body:
//! an optional top-level `message` plus an optional `errors` array whose
//! entries may carry any of `resource`, `field`, `code`, `message`. The
//! translator folds whatever is present into one human-readable string
//! and degrades gracefully: structured parse, then raw body text, then
//! just the status code. It never fails.

use serde::Deserialize;

/// Loosely-shaped error body; every field is optional so that partial
/// payloads still parse
#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<RemoteErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorDetail {
    #[serde(default)]
    resource: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RemoteErrorDetail {
    fn fragments(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.resource.as_deref(),
            self.field.as_deref(),
            self.code.as_deref(),
            self.message.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Convert a non-success response body into a single message
///
/// # Arguments
///
/// * `status` - HTTP status code of the response
/// * `body` - Raw response body, possibly empty or non-JSON
pub fn translate_error_body(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<RemoteErrorBody>(body) {
        let mut parts: Vec<String> = Vec::new();

        if let Some(message) = parsed.message
            && !message.trim().is_empty()
        {
            parts.push(message);
        }
        for detail in parsed.errors.unwrap_or_default() {
            if let Some(fragment) = detail.fragments() {
                parts.push(fragment);
            }
        }

        if !parts.is_empty() {
            return format!("{} (HTTP {})", parts.join("; "), status);
        }
    }

    let raw = body.trim();
    if raw.is_empty() {
        format!("status {}", status)
    } else {
        raw.to_string()
    }
}
