//! One-shot download of the tutorial dataset.
//!
//! The file is streamed into a `.part` sibling and renamed over the target
//! only once complete, so an interrupted download never leaves a truncated
//! database where the GUI expects a usable one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::CoreError;

/// File name of the tutorial dataset inside the assets directory.
pub const TUTORIAL_DB_FILE: &str = "tutorial_database.sqlite";

/// Timeout applied to the whole download request.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// How server certificates are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Verify against the bundled Mozilla root store.
    Verify,
    /// Accept any certificate. Only for networks with intercepting proxies.
    SkipVerification,
}

impl TlsPolicy {
    pub fn from_skip_flag(skip: bool) -> Self {
        if skip {
            Self::SkipVerification
        } else {
            Self::Verify
        }
    }

    pub fn verifies(self) -> bool {
        self == Self::Verify
    }
}

/// Build the HTTP client used for downloads.
pub fn build_client(tls: TlsPolicy, timeout: Duration) -> Result<reqwest::Client, CoreError> {
    if !tls.verifies() {
        tracing::warn!("TLS certificate verification is DISABLED via TEMOA_SKIP_CERT_VERIFY");
    }
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(timeout)
        .danger_accept_invalid_certs(!tls.verifies())
        .build()
        .map_err(|e| CoreError::Internal(format!("failed to build HTTP client: {e}")))
}

/// Download `url` to `target`, replacing it atomically.
///
/// Every failure, including local file errors, is reported as
/// [`CoreError::Download`] and leaves no partial file behind.
/// Returns the number of bytes written.
pub async fn download_to(client: &reqwest::Client, url: &str, target: &Path) -> Result<u64, CoreError> {
    let partial = partial_path(target);

    match fetch_and_replace(client, url, target, &partial).await {
        Ok(bytes) => {
            tracing::info!(url, path = %target.display(), bytes, "Tutorial dataset downloaded");
            Ok(bytes)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            tracing::error!(url, error = %e, "Tutorial download failed");
            Err(e)
        }
    }
}

async fn fetch_and_replace(
    client: &reqwest::Client,
    url: &str,
    target: &Path,
    partial: &Path,
) -> Result<u64, CoreError> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_failed(parent, e))?;
    }
    let bytes = fetch_into(client, url, partial).await?;
    tokio::fs::rename(partial, target)
        .await
        .map_err(|e| write_failed(target, e))?;
    Ok(bytes)
}

async fn fetch_into(client: &reqwest::Client, url: &str, partial: &Path) -> Result<u64, CoreError> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| CoreError::Download(e.to_string()))?;

    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| write_failed(partial, e))?;
    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| CoreError::Download(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| write_failed(partial, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| write_failed(partial, e))?;
    file.sync_all().await.map_err(|e| write_failed(partial, e))?;
    Ok(written)
}

fn write_failed(path: &Path, err: std::io::Error) -> CoreError {
    CoreError::Download(format!("cannot write {}: {err}", path.display()))
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    use super::*;

    async fn serve() -> String {
        let app = Router::new()
            .route("/tutorial.sqlite", get(|| async { b"SQLite format 3\0".to_vec() }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{addr}")
    }

    #[test]
    fn both_tls_policies_build_clients() {
        assert!(build_client(TlsPolicy::Verify, DOWNLOAD_TIMEOUT).is_ok());
        assert!(build_client(TlsPolicy::SkipVerification, DOWNLOAD_TIMEOUT).is_ok());
        assert!(TlsPolicy::from_skip_flag(false).verifies());
        assert!(!TlsPolicy::from_skip_flag(true).verifies());
    }

    #[tokio::test]
    async fn download_replaces_target_atomically() {
        let base = serve().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("assets").join(TUTORIAL_DB_FILE);
        std::fs::create_dir_all(target.parent().unwrap()).expect("mkdir");
        std::fs::write(&target, b"stale").expect("write");

        let client = build_client(TlsPolicy::Verify, DOWNLOAD_TIMEOUT).expect("client");
        let bytes = download_to(&client, &format!("{base}/tutorial.sqlite"), &target)
            .await
            .expect("download");

        assert_eq!(bytes, 16);
        assert_eq!(std::fs::read(&target).expect("read"), b"SQLite format 3\0");
        assert!(!partial_path(&target).exists());
    }

    #[tokio::test]
    async fn http_error_leaves_target_untouched() {
        let base = serve().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join(TUTORIAL_DB_FILE);

        let client = build_client(TlsPolicy::Verify, DOWNLOAD_TIMEOUT).expect("client");
        let result = download_to(&client, &format!("{base}/missing"), &target).await;

        assert_matches!(result, Err(CoreError::Download(msg)) if msg.contains("404"));
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());
    }

    #[tokio::test]
    async fn unreachable_host_is_download_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let dir = tempfile::tempdir().expect("tempdir");
        let client = build_client(TlsPolicy::Verify, DOWNLOAD_TIMEOUT).expect("client");
        let result = download_to(&client, &format!("http://{addr}/x"), &dir.path().join("x")).await;
        assert_matches!(result, Err(CoreError::Download(_)));
    }

    #[tokio::test]
    async fn unwritable_assets_dir_is_download_error() {
        let base = serve().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let assets = dir.path().join("assets");
        std::fs::write(&assets, b"not a directory").expect("write");
        let target = assets.join(TUTORIAL_DB_FILE);

        let client = build_client(TlsPolicy::Verify, DOWNLOAD_TIMEOUT).expect("client");
        let result = download_to(&client, &format!("{base}/tutorial.sqlite"), &target).await;

        assert_matches!(result, Err(CoreError::Download(msg)) if msg.starts_with("cannot write"));
        assert!(assets.is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_rename_removes_partial_file() {
        let base = serve().await;
        let dir = tempfile::tempdir().expect("tempdir");
        // A non-empty directory cannot be replaced by a file.
        let target = dir.path().join(TUTORIAL_DB_FILE);
        std::fs::create_dir(&target).expect("mkdir");
        std::fs::write(target.join("keep"), b"").expect("write");

        let client = build_client(TlsPolicy::Verify, DOWNLOAD_TIMEOUT).expect("client");
        let result = download_to(&client, &format!("{base}/tutorial.sqlite"), &target).await;

        assert_matches!(result, Err(CoreError::Download(_)));
        assert!(!partial_path(&target).exists());
        assert!(target.join("keep").exists());
    }

    #[test]
    fn partial_path_is_sibling() {
        let p = partial_path(Path::new("/a/b/tutorial_database.sqlite"));
        assert_eq!(p, Path::new("/a/b/tutorial_database.sqlite.part"));
    }
}
