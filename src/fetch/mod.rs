//! Source retrieval: HTTP(S) URLs through an [`HttpClient`], anything else
//! from the local filesystem.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Returns `true` when `source` should be fetched over the network.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads raw bytes from a local path or fetches them over HTTP.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to fetch {source}"))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::env;

    struct OfflineClient;

    #[async_trait]
    impl HttpClient for OfflineClient {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            unreachable!("local sources never hit the network")
        }
    }

    /// Answers every request with a fixed status and body.
    struct CannedClient {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for CannedClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            assert_eq!(req.method(), &reqwest::Method::GET);
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body)
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/trips.csv"));
        assert!(is_remote("http://localhost:8080/stations.json"));
        assert!(!is_remote("data/trips.csv"));
        assert!(!is_remote("httpdocs/trips.csv"));
    }

    #[tokio::test]
    async fn test_load_local_source() {
        let path = format!("{}/bikeshare_traffic_fetch_test.csv", env::temp_dir().display());
        std::fs::write(&path, b"hello").unwrap();

        let bytes = load_source(&OfflineClient, &path).await.unwrap();
        assert_eq!(bytes, b"hello");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_local_source() {
        let err = load_source(&OfflineClient, "/definitely/not/here.csv")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[tokio::test]
    async fn test_load_remote_source_ok() {
        let client = CannedClient {
            status: 200,
            body: "short_name,lon,lat",
        };
        let bytes = load_source(&client, "https://example.com/stations.csv")
            .await
            .unwrap();
        assert_eq!(bytes, b"short_name,lon,lat");
    }

    #[tokio::test]
    async fn test_load_remote_source_not_found() {
        let client = CannedClient {
            status: 404,
            body: "not found",
        };
        let url = "https://example.com/missing.csv";
        let err = load_source(&client, url).await.unwrap_err();

        assert!(err.to_string().contains(&format!("failed to fetch {url}")));
        assert!(format!("{err:#}").contains("404"));
    }
}
