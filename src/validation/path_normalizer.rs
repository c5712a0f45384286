//! Site file path normalization
//!
//! Generated bundles arrive with whatever separators and stray slashes
//! the generator produced. Before anything touches the network, every
//! path is rewritten into a clean repository-relative form and the bundle
//! is deduplicated. Pure functions, no I/O.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::error::PublishError;

/// One file from the generated site bundle, as handed in by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFile {
    pub path: String,
    pub contents: String,
}

/// A file with its final repository-relative path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFile {
    pub relative_path: String,
    pub contents: String,
}

/// Normalize a raw bundle path into a repository-relative one
///
/// Backslashes become forward slashes, leading slashes and empty
/// segments are dropped, and any `..` segment is rejected. When a
/// publish subdirectory is active it is prepended.
///
/// # Examples
///
/// ```
/// use site_publisher::validation::normalize_path;
///
/// assert_eq!(normalize_path("a//b\\c.html", None).unwrap(), "a/b/c.html");
/// assert_eq!(
///     normalize_path("index.html", Some("docs")).unwrap(),
///     "docs/index.html"
/// );
/// assert!(normalize_path("../secrets.txt", None).is_err());
/// ```
pub fn normalize_path(raw: &str, publish_dir: Option<&str>) -> Result<String, PublishError> {
    let forward = raw.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    for segment in forward.split('/') {
        if segment.is_empty() {
            continue;
        }
        if segment == ".." {
            return Err(PublishError::validation(format!(
                "path escapes the site root: {}",
                raw
            )));
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        return Err(PublishError::validation(format!("empty file path: {:?}", raw)));
    }

    let relative = segments.join("/");
    Ok(match publish_dir {
        Some(dir) => format!("{}/{}", dir, relative),
        None => relative,
    })
}

/// Pick the effective publish subdirectory
///
/// Only allow-listed values are honored; anything else publishes to the
/// repository root.
pub fn resolve_publish_dir<'a>(
    requested: Option<&'a str>,
    allowed: &[String],
) -> Option<&'a str> {
    requested.filter(|dir| allowed.iter().any(|allowed_dir| allowed_dir == dir))
}

/// Normalize a whole bundle and deduplicate it by path
///
/// When two inputs normalize to the same path the later one wins. The
/// result is sorted by path so downstream tree construction is
/// deterministic.
pub fn normalize_files(
    files: &[SiteFile],
    publish_dir: Option<&str>,
) -> Result<Vec<NormalizedFile>, PublishError> {
    let mut contents_by_path: HashMap<String, &str> = HashMap::new();

    for file in files {
        let path = normalize_path(&file.path, publish_dir)?;
        contents_by_path.insert(path, &file.contents);
    }

    let mut normalized: Vec<NormalizedFile> = contents_by_path
        .into_iter()
        .map(|(relative_path, contents)| NormalizedFile {
            relative_path,
            contents: contents.to_string(),
        })
        .collect();
    normalized.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, contents: &str) -> SiteFile {
        SiteFile {
            path: path.to_string(),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn test_mixed_separators_collapse() {
        assert_eq!(normalize_path("a//b\\c.html", None).unwrap(), "a/b/c.html");
    }

    #[test]
    fn test_leading_slashes_are_stripped() {
        assert_eq!(normalize_path("/index.html", None).unwrap(), "index.html");
        assert_eq!(normalize_path("\\\\assets\\app.js", None).unwrap(), "assets/app.js");
    }

    #[test]
    fn test_parent_segments_rejected_with_forward_slashes() {
        let error = normalize_path("../secrets.txt", None).unwrap_err();
        assert_eq!(error.code(), "VALIDATION");
    }

    #[test]
    fn test_parent_segments_rejected_with_backslashes() {
        assert!(normalize_path("a\\..\\b", None).is_err());
    }

    #[test]
    fn test_parent_segment_in_the_middle_rejected() {
        assert!(normalize_path("assets/../index.html", None).is_err());
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(normalize_path("", None).is_err());
        assert!(normalize_path("///", None).is_err());
    }

    #[test]
    fn test_publish_dir_is_prepended() {
        assert_eq!(
            normalize_path("css/site.css", Some("docs")).unwrap(),
            "docs/css/site.css"
        );
    }

    #[test]
    fn test_resolve_publish_dir_allowlist() {
        let allowed = vec!["docs".to_string()];

        assert_eq!(resolve_publish_dir(Some("docs"), &allowed), Some("docs"));
        assert_eq!(resolve_publish_dir(Some("assets"), &allowed), None);
        assert_eq!(resolve_publish_dir(None, &allowed), None);
    }

    #[test]
    fn test_duplicate_paths_last_write_wins() {
        let files = vec![file("index.html", "v1"), file("index.html", "v2")];

        let normalized = normalize_files(&files, None).unwrap();

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].relative_path, "index.html");
        assert_eq!(normalized[0].contents, "v2");
    }

    #[test]
    fn test_duplicates_across_separator_styles_collapse() {
        let files = vec![file("a/b.html", "first"), file("a\\b.html", "second")];

        let normalized = normalize_files(&files, None).unwrap();

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].contents, "second");
    }

    #[test]
    fn test_output_is_sorted_by_path() {
        let files = vec![
            file("zebra.html", ""),
            file("alpha.html", ""),
            file("middle/page.html", ""),
        ];

        let normalized = normalize_files(&files, None).unwrap();
        let paths: Vec<&str> = normalized
            .iter()
            .map(|f| f.relative_path.as_str())
            .collect();

        assert_eq!(paths, vec!["alpha.html", "middle/page.html", "zebra.html"]);
    }

    #[test]
    fn test_single_bad_path_fails_the_bundle() {
        let files = vec![file("index.html", "ok"), file("../evil.html", "nope")];

        assert!(normalize_files(&files, None).is_err());
    }
}
