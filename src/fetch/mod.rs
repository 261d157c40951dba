// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

use crate::error::RefreshError;

/// Rewrite a share link into its direct-download form: any query string and
/// fragment are dropped and the query is set to exactly `download=1`.
pub fn download_url(share_url: &str) -> Result<Url> {
    let mut url = Url::parse(share_url)
        .with_context(|| format!("invalid share link `{}`", share_url))?;
    url.set_fragment(None);
    url.set_query(Some("download=1"));
    Ok(url)
}

/// Download the workbook behind `share_url` and persist it at `dest`.
///
/// The body lands in a temp file next to `dest` and is renamed over it only
/// once fully written, so a failed transfer leaves the previously downloaded
/// workbook untouched.
pub async fn download_workbook(
    client: &Client,
    share_url: &str,
    dest: &Path,
) -> Result<(), RefreshError> {
    download_inner(client, share_url, dest)
        .await
        .map_err(|e| RefreshError::Download(format!("{e:#}")))
}

async fn download_inner(client: &Client, share_url: &str, dest: &Path) -> Result<()> {
    let url = download_url(share_url)?;
    debug!("GET {}", url);
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("non-success status from {}", url))?;
    let bytes = resp.bytes().await.context("reading response body")?;

    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).context("creating temp download file")?;
    tmp.write_all(&bytes).context("writing workbook bytes")?;
    tmp.persist(dest)
        .with_context(|| format!("replacing {}", dest.display()))?;

    info!(bytes = bytes.len(), path = %dest.display(), "workbook downloaded");
    Ok(())
}
