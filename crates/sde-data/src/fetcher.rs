//! HTTP Fetcher: a ranged/streaming HTTP client with a long timeout,
//! used for the checksum manifest and the SDE archive download.

use crate::error::SdeError;
use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Floor for the archive download timeout: at least 30 minutes, since
/// the archive can run into the hundreds of megabytes.
pub const DOWNLOAD_TIMEOUT_FLOOR: Duration = Duration::from_secs(30 * 60);

/// Basename the checksum manifest and the archive being checked against
/// are keyed by.
pub const ARCHIVE_FILENAME: &str = "sde.zip";

#[derive(Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, SdeError> {
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT_FLOOR)
            .build()
            .map_err(SdeError::TransientUpstream)?;
        Ok(Self { http })
    }

    /// Fetch the plaintext checksum manifest and return `sde.zip`'s
    /// digest. The manifest is one entry per line, `<hex-digest>  <filename>`.
    pub async fn fetch_manifest_digest(&self, manifest_url: &str) -> Result<String, SdeError> {
        let body = self
            .http
            .get(manifest_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_manifest_digest(&body, ARCHIVE_FILENAME)
            .ok_or_else(|| SdeError::ManifestEntryMissing(ARCHIVE_FILENAME.to_string()))
    }

    /// Stream-download the archive to `dest`, returning the number of
    /// bytes written.
    pub async fn download_to_file(&self, url: &str, dest: &Path) -> Result<u64, SdeError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let mut stream = response.bytes_stream();
        let mut file = tokio::fs::File::create(dest).await?;
        let mut total: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            total += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(total)
    }
}

fn parse_manifest_digest(manifest: &str, filename: &str) -> Option<String> {
    manifest.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let digest = parts.next()?;
        let name = parts.next()?;
        (name == filename).then(|| digest.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_digest_for_matching_filename() {
        let manifest = "abc123  checksums.json\ndeadbeef  sde.zip\n";
        assert_eq!(
            parse_manifest_digest(manifest, "sde.zip"),
            Some("deadbeef".to_string())
        );
    }

    #[test]
    fn returns_none_when_filename_absent() {
        let manifest = "abc123  other.zip\n";
        assert_eq!(parse_manifest_digest(manifest, "sde.zip"), None);
    }
}
