//! Site Publisher CLI
//!
//! Publishes a generated static site bundle to a Git-based hosting
//! platform and turns on static hosting for it.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use site_publisher::{
    PublishJobQueue, PublishRequest, PublisherConfig, SecureTokenManager, SiteFile,
    normalize_files, publish_site, resolve_publish_dir,
};
use walkdir::{DirEntry, WalkDir};

/// Static site publishing assistant
#[derive(Parser)]
#[command(name = "site-publisher")]
#[command(version = "0.1.0")]
#[command(about = "Publish a static site bundle to a Git-hosted pages branch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a site bundle to the hosting branch
    Publish {
        /// Directory containing the generated site bundle
        #[arg(value_name = "BUNDLE_DIR")]
        bundle_dir: PathBuf,

        /// Target repository ("name" or "owner/name")
        #[arg(short, long)]
        repo: String,

        /// Serve from this repository subdirectory (only "docs" is honored)
        #[arg(long)]
        dir: Option<String>,

        /// Hosting branch name
        #[arg(long)]
        branch: Option<String>,

        /// Per-call network deadline in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// List what a publish would produce, without network access
    Check {
        /// Directory containing the generated site bundle
        #[arg(value_name = "BUNDLE_DIR")]
        bundle_dir: PathBuf,

        /// Serve from this repository subdirectory (only "docs" is honored)
        #[arg(long)]
        dir: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("site_publisher=warn")),
        )
        .with_target(false)
        .init();

    match run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Publish {
            bundle_dir,
            repo,
            dir,
            branch,
            timeout_secs,
        } => {
            let mut config = PublisherConfig::load(Some(&bundle_dir)).await?;
            if let Some(branch) = branch {
                config.hosting_branch = branch;
            }
            if let Some(secs) = timeout_secs {
                config.request_timeout_secs = secs;
            }
            config.validate()?;

            let files = read_bundle(&bundle_dir)?;
            println!("📦 {} files in {}", files.len(), bundle_dir.display());

            let credential = SecureTokenManager::new().resolve_token();
            let queue = PublishJobQueue::new();
            let report = publish_site(
                &queue,
                config,
                PublishRequest {
                    credential,
                    target_repo: repo,
                    publish_dir: dir,
                    files,
                },
            )
            .await?;

            println!("✅ {}", report.message);
            println!("   {}", report.hosting_url);
            Ok(0)
        }

        Commands::Check { bundle_dir, dir } => {
            let config = PublisherConfig::load(Some(&bundle_dir)).await?;
            let files = read_bundle(&bundle_dir)?;

            let publish_dir = resolve_publish_dir(dir.as_deref(), &config.allowed_publish_dirs);
            if let Some(requested) = dir.as_deref()
                && publish_dir.is_none()
            {
                println!(
                    "⚠️  \"{}\" is not an allowed publish directory; files go to the root",
                    requested
                );
            }

            let normalized = normalize_files(&files, publish_dir)?;
            for file in &normalized {
                println!("  {}", file.relative_path);
            }
            println!("✅ {} files ready to publish", normalized.len());
            Ok(0)
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Read every file under the bundle directory as UTF-8
fn read_bundle(bundle_dir: &Path) -> Result<Vec<SiteFile>> {
    if !bundle_dir.is_dir() {
        bail!("bundle directory not found: {}", bundle_dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(bundle_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(bundle_dir)?
            .to_string_lossy()
            .into_owned();
        let contents = std::fs::read_to_string(entry.path())
            .with_context(|| format!("cannot read {} as UTF-8", entry.path().display()))?;
        files.push(SiteFile {
            path: relative,
            contents,
        });
    }

    if files.is_empty() {
        bail!("no files found in {}", bundle_dir.display());
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_bundle_collects_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Hi</h1>").unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css").join("site.css"), "body {}").unwrap();

        let files = read_bundle(dir.path()).unwrap();
        let mut paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        paths.sort();

        assert_eq!(paths, vec!["css/site.css", "index.html"]);
    }

    #[test]
    fn test_read_bundle_skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "hi").unwrap();
        fs::write(dir.path().join(".hidden"), "nope").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("config"), "nope").unwrap();

        let files = read_bundle(dir.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "index.html");
    }

    #[test]
    fn test_read_bundle_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(read_bundle(&missing).is_err());
    }

    #[test]
    fn test_read_bundle_rejects_empty_directory() {
        let dir = tempfile::tempdir().unwrap();

        assert!(read_bundle(dir.path()).is_err());
    }
}
