//! Refreshing dictionary files from the network.
//!
//! Downloads land in the writable override directory, where the
//! [`DirSource`](crate::source::DirSource) picks them up on the next load.
//! A refresh is best-effort: [`refresh`] logs failures and reports only
//! whether a new file is in place.
//!
//! # Example
//!
//! ```ignore
//! use vietphrase::fetch::{HttpFetcher, refresh};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new("/var/lib/vietphrase")?;
//!     if refresh(&fetcher, "https://example.org/VietPhrase.txt", "zh/VietPhrase.txt").await {
//!         println!("updated");
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[async_trait]
pub trait DictionaryFetcher: Send + Sync {
    /// Download `url` into the destination file `name` (a relative path
    /// such as `zh/Names.txt`), returning the number of bytes written
    async fn fetch(&self, url: &str, name: &str) -> Result<u64>;

    /// Used for logging
    fn fetcher_name(&self) -> &str;
}

/// Streams HTTP responses into a directory
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    destination: PathBuf,
}

impl HttpFetcher {
    const TIMEOUT_SECS: u64 = 120;

    pub fn new(destination: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(Self::TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            destination: destination.into(),
        })
    }

    /// Where `name` will be written. Only plain relative paths are allowed.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let plain = !name.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(Error::InvalidDestination(name.to_string()));
        }
        Ok(self.destination.join(relative))
    }

    async fn stream_to(response: &mut reqwest::Response, path: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("destination", &self.destination)
            .finish()
    }
}

#[async_trait]
impl DictionaryFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, name: &str) -> Result<u64> {
        let target = self.resolve(name)?;
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // The target is only ever replaced by a complete download.
        let mut partial = target.clone().into_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let written = match Self::stream_to(&mut response, &partial).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    tracing::warn!("Failed to remove {}: {}", partial.display(), cleanup);
                }
                return Err(err);
            }
        };
        tokio::fs::rename(&partial, &target).await?;
        Ok(written)
    }

    fn fetcher_name(&self) -> &str {
        "HTTP"
    }
}

/// Fetch `url` into `name`, swallowing any failure.
///
/// Returns `true` when the file was replaced.
pub async fn refresh(fetcher: &dyn DictionaryFetcher, url: &str, name: &str) -> bool {
    match fetcher.fetch(url, name).await {
        Ok(bytes) => {
            tracing::info!(
                "Refreshed {} from {} ({} bytes via {})",
                name,
                url,
                bytes,
                fetcher.fetcher_name()
            );
            true
        }
        Err(err) => {
            tracing::warn!("Could not refresh {} from {}: {}", name, url, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes fixed content without any network access
    struct StaticFetcher {
        destination: PathBuf,
        body: Option<&'static str>,
    }

    #[async_trait]
    impl DictionaryFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str, name: &str) -> Result<u64> {
            let body = self
                .body
                .ok_or_else(|| Error::Network("connection refused".to_string()))?;
            let target = self.destination.join(name);
            tokio::fs::create_dir_all(target.parent().unwrap()).await?;
            tokio::fs::write(&target, body).await?;
            Ok(body.len() as u64)
        }

        fn fetcher_name(&self) -> &str {
            "static"
        }
    }

    #[test]
    fn test_resolve_accepts_relative_paths() {
        let fetcher = HttpFetcher::new("/data").unwrap();
        assert_eq!(
            fetcher.resolve("zh/Names.txt").unwrap(),
            PathBuf::from("/data/zh/Names.txt")
        );
    }

    #[test]
    fn test_resolve_rejects_escaping_paths() {
        let fetcher = HttpFetcher::new("/data").unwrap();
        for name in ["", "  ", "../etc/passwd", "/etc/passwd", "zh/../../x", "./x"] {
            assert!(
                matches!(fetcher.resolve(name), Err(Error::InvalidDestination(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_destination_before_network() {
        let fetcher = HttpFetcher::new("/data").unwrap();
        let result = fetcher.fetch("http://127.0.0.1:9/x", "../x").await;
        assert!(matches!(result, Err(Error::InvalidDestination(_))));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(dir.path()).unwrap();
        let result = fetcher.fetch("not a url", "zh/Names.txt").await;
        assert!(matches!(result, Err(Error::Network(_))));
        assert!(!dir.path().join("zh/Names.txt").exists());
    }

    #[tokio::test]
    async fn test_refresh_swallows_failures() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher {
            destination: dir.path().to_path_buf(),
            body: None,
        };
        assert!(!refresh(&fetcher, "http://example.invalid", "zh/Names.txt").await);
    }

    #[tokio::test]
    async fn test_refresh_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher {
            destination: dir.path().to_path_buf(),
            body: Some("天=trời\n"),
        };
        assert!(refresh(&fetcher, "http://example.invalid", "zh/Names.txt").await);
        let content = std::fs::read_to_string(dir.path().join("zh/Names.txt")).unwrap();
        assert_eq!(content, "天=trời\n");
    }

    #[test]
    fn test_debug_hides_client() {
        let fetcher = HttpFetcher::new("/data").unwrap();
        let debug = format!("{:?}", fetcher);
        assert!(debug.contains("/data"));
    }
}
