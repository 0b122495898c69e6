use reqwest::Client;
use tracing::{info, warn};

use crate::error::ServiceError;

/// One downloaded remote file, buffered fully in memory.
#[derive(Debug)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Issues one GET against `raw_url` and buffers the full response body.
///
/// A non-success upstream status is reported without consuming the body;
/// transport failures and bodies over `max_bytes` are internal faults.
pub async fn fetch_remote_file(
    client: &Client,
    raw_url: &str,
    max_bytes: usize,
) -> Result<FetchedFile, ServiceError> {
    let url = url::Url::parse(raw_url)?;

    info!(target: "fetch", url = %url, "Starting HTTP fetch");
    let response = client.get(url.clone()).send().await.map_err(|e| {
        warn!(target: "fetch", url = %url, "HTTP transport error: {}", e);
        ServiceError::Transport(e)
    })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        warn!(target: "fetch", url = %url, status = status, "HTTP non-success status");
        return Err(ServiceError::UpstreamRejected { status });
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|ct| ct.to_str().ok())
        .map(|s| s.to_string());

    let body = response.bytes().await.map_err(|e| {
        warn!(target: "fetch", url = %url, "Body read failed: {}", e);
        ServiceError::Transport(e)
    })?;

    let size = body.len();
    if size > max_bytes {
        info!(target: "fetch", url = %url, size = size, limit = max_bytes, "File too large; refusing");
        return Err(ServiceError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    info!(target: "fetch", url = %url, size = size, ct = ?content_type, "HTTP fetch completed");

    Ok(FetchedFile {
        bytes: body.to_vec(),
        content_type,
    })
}
