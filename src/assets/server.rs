//! Static file serving from the asset root.
//!
//! # Responsibilities
//! - Reject traversal before any filesystem access
//! - Pick the production root if it exists, else the fallback root
//! - Stream the file in fixed-size chunks with an inferred content type
//!
//! # Design Decisions
//! - The traversal check is textual: any `..` anywhere is refused
//! - All leading separators are stripped so the join stays under the base
//! - Never touches the backend

use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::assets::mime::content_type_for;
use crate::cgi::write_headers;
use crate::config::AssetConfig;
use crate::error::GatewayError;
use crate::http::CHUNK_SIZE;

#[derive(Debug, Clone)]
pub struct AssetServer {
    root: PathBuf,
    fallback_root: PathBuf,
    default_document: String,
}

impl AssetServer {
    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            fallback_root: PathBuf::from(&config.fallback_root),
            default_document: config.default_document.clone(),
        }
    }

    async fn base_dir(&self) -> &Path {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => &self.root,
            _ => &self.fallback_root,
        }
    }

    /// Map a logical path to a file under the base directory.
    pub async fn resolve(&self, logical_path: &str) -> Result<PathBuf, GatewayError> {
        if logical_path.contains("..") {
            return Err(GatewayError::Forbidden);
        }

        let relative = logical_path.trim_start_matches('/');
        let base = self.base_dir().await;

        Ok(if relative.is_empty() {
            base.join(&self.default_document)
        } else {
            base.join(relative)
        })
    }

    /// Stream the asset for `logical_path` to `out`, headers first.
    pub async fn serve<W>(&self, logical_path: &str, out: &mut W) -> Result<(), GatewayError>
    where
        W: AsyncWrite + Unpin,
    {
        let path = self.resolve(logical_path).await?;
        let shown = path.display().to_string();

        let mut file = open_regular_file(&path).await.map_err(|e| {
            tracing::debug!(path = %shown, error = %e, "Asset open failed");
            GatewayError::NotFound { path: shown.clone() }
        })?;

        let content_type = content_type_for(&path);
        write_headers(
            out,
            [
                format!("X-Debug-Path: {}", shown),
                format!("Content-Type: {}", content_type),
            ],
        )
        .await?;

        let total = copy_chunks(&mut file, out).await?;
        tracing::debug!(path = %shown, content_type, bytes = total, "Asset served");
        Ok(())
    }
}

/// Copy `src` to `out` in fixed-size chunks and flush.
///
/// Headers are already out, so a read failure can only end the body early;
/// it is logged here and the copy stops. Only `out` failures are returned.
async fn copy_chunks<R, W>(src: &mut R, out: &mut W) -> Result<u64, GatewayError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = match src.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(error = %e, bytes = total, "Asset read failed, body truncated");
                break;
            }
        };
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).await?;
        total += n as u64;
    }
    out.flush().await?;
    Ok(total)
}

/// Open `path`, refusing directories (which open fine but cannot be read).
async fn open_regular_file(path: &Path) -> std::io::Result<File> {
    let file = File::open(path).await?;
    if file.metadata().await?.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "path is a directory",
        ));
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    fn server_at(root: &Path, fallback: &Path) -> AssetServer {
        AssetServer::from_config(&AssetConfig {
            root: root.display().to_string(),
            fallback_root: fallback.display().to_string(),
            default_document: "preview.html".into(),
        })
    }

    #[tokio::test]
    async fn traversal_is_forbidden_anywhere() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_at(dir.path(), dir.path());
        for path in ["/../x", "/assets/../../etc/passwd", "/a/b..c", ".."] {
            assert!(
                matches!(server.resolve(path).await, Err(GatewayError::Forbidden)),
                "{}",
                path
            );
        }
    }

    #[tokio::test]
    async fn empty_path_is_default_document() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_at(dir.path(), dir.path());
        assert_eq!(server.resolve("").await.unwrap(), dir.path().join("preview.html"));
        assert_eq!(server.resolve("/").await.unwrap(), dir.path().join("preview.html"));
    }

    #[tokio::test]
    async fn missing_root_uses_fallback() {
        let fallback = tempfile::tempdir().unwrap();
        let server = server_at(Path::new("/definitely/not/here"), fallback.path());
        assert_eq!(
            server.resolve("/js/app.js").await.unwrap(),
            fallback.path().join("js/app.js")
        );
    }

    #[tokio::test]
    async fn extra_leading_slashes_stay_under_base() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_at(dir.path(), dir.path());
        assert_eq!(
            server.resolve("//etc/passwd").await.unwrap(),
            dir.path().join("etc/passwd")
        );
    }

    #[tokio::test]
    async fn serves_file_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        let server = server_at(dir.path(), dir.path());

        let mut out = Vec::new();
        server.serve("/style.css", &mut out).await.unwrap();

        let expected = format!(
            "X-Debug-Path: {}\r\nContent-Type: text/css; charset=utf-8\r\n\r\nbody{{}}",
            dir.path().join("style.css").display()
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[tokio::test]
    async fn missing_file_reports_attempted_path() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_at(dir.path(), dir.path());

        let mut out = Vec::new();
        let err = server.serve("/nope.js", &mut out).await.unwrap_err();
        let attempted = dir.path().join("nope.js").display().to_string();
        assert!(matches!(err, GatewayError::NotFound { ref path } if *path == attempted));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn directory_is_not_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("songs")).unwrap();
        let server = server_at(dir.path(), dir.path());

        let mut out = Vec::new();
        let err = server.serve("/songs", &mut out).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk gone",
            )))
        }
    }

    #[tokio::test]
    async fn read_failure_truncates_body_without_error() {
        let mut src = (&b"partial"[..]).chain(FailingReader);
        let mut out = Vec::new();

        let total = copy_chunks(&mut src, &mut out).await.unwrap();

        assert_eq!(total, 7);
        assert_eq!(out, b"partial");
    }
}
