use core::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::Client;
use tokio::fs::read as tokio_fs_read;
use tokio_stream::{Stream, StreamExt as _, once};
use url::Url;

use crate::error::PageError;

type ByteStream = Box<dyn Stream<Item = Result<Bytes, PageError>> + Send + Unpin>;

/// Creates a byte stream from a URL.
///
/// Supported URL schemes:
/// - `http`, `https`: Fetched via `reqwest` as a streaming response
/// - `file`: Read from the local filesystem (emitted as a single chunk)
///
/// # Errors
///
/// - Returns `Err` if the URL scheme is unsupported
/// - Returns `Err` if HTTP fetch fails or returns a non-success status
/// - Returns `Err` if the file path is invalid or the file cannot be read
pub async fn stream_url(url: &Url, timeout: Duration) -> Result<ByteStream, PageError> {
    let fetch_error = |reason: String| PageError::Fetch {
        url: url.to_string(),
        reason,
    };
    Ok(match url.scheme() {
        "http" | "https" => {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|err| fetch_error(err.to_string()))?;
            let response = client
                .get(url.clone())
                .send()
                .await
                .map_err(|err| fetch_error(err.to_string()))?;
            if !response.status().is_success() {
                return Err(fetch_error(format!("status {}", response.status())));
            }
            let owned = url.to_string();
            let stream = response.bytes_stream().map(move |res| {
                res.map_err(|err| PageError::Fetch {
                    url: owned.clone(),
                    reason: err.to_string(),
                })
            });
            Box::new(stream)
        }
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| fetch_error("invalid file path".to_owned()))?;
            let data = tokio_fs_read(path)
                .await
                .map(Bytes::from)
                .map_err(|err| fetch_error(err.to_string()))?;
            Box::new(once(Ok::<Bytes, PageError>(data)))
        }
        other => return Err(PageError::UnsupportedScheme(other.to_owned())),
    })
}

/// Fetch a URL completely and decode it as UTF-8, replacing invalid sequences.
///
/// # Errors
///
/// Propagates every failure of [`fetch_bytes`].
pub async fn fetch_text(url: &Url, timeout: Duration) -> Result<String, PageError> {
    let bytes = fetch_bytes(url, timeout).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetch a URL completely as raw bytes.
///
/// # Errors
///
/// Propagates every failure of [`stream_url`] and of the stream itself.
pub async fn fetch_bytes(url: &Url, timeout: Duration) -> Result<Bytes, PageError> {
    let mut stream = stream_url(url, timeout).await?;
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer.freeze())
}

/// Serialized origin used for same-origin checks; every `file:` URL shares one.
pub fn origin_of(url: &Url) -> String {
    if url.scheme() == "file" {
        String::from("file://")
    } else {
        url.origin().ascii_serialization()
    }
}
