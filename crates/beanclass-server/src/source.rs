//! Batch sources: uploaded CSV bodies and CSV files fetched by URL

use axum::body::Bytes;
use beanclass_core::batch::read_feature_csv_bytes;
use beanclass_core::{FeatureMatrix, SourceError};
use reqwest::Url;
use tracing::info;

/// Where a batch of feature rows comes from
#[derive(Debug, Clone)]
pub enum BatchSource {
    /// CSV content sent by the client
    Upload(Bytes),
    /// CSV file to fetch over http(s)
    Url(String),
}

impl BatchSource {
    /// Pick a source from a CLI argument: http(s) URLs are fetched, anything
    /// else is read as a local file.
    pub fn from_arg(input: &str) -> Result<Self, SourceError> {
        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(Self::Url(input.to_string()));
        }
        let content = std::fs::read(input)
            .map_err(|e| SourceError::unreadable(format!("{}: {}", input, e)))?;
        Ok(Self::Upload(Bytes::from(content)))
    }

    /// Load and parse the rows; a header-only or empty CSV gives an empty matrix.
    ///
    /// `max_bytes` caps fetched bodies the same way uploads are capped.
    pub async fn resolve(
        self,
        client: &reqwest::Client,
        max_bytes: usize,
    ) -> Result<FeatureMatrix, SourceError> {
        match self {
            Self::Upload(bytes) => read_feature_csv_bytes(&bytes),
            Self::Url(url) => {
                let bytes = fetch(client, &url, max_bytes).await?;
                read_feature_csv_bytes(&bytes)
            }
        }
    }
}

/// Fetch a URL body of at most `max_bytes`, allowing only http and https
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> Result<Bytes, SourceError> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| SourceError::fetch(format!("invalid URL {:?}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SourceError::fetch(format!(
            "unsupported URL scheme {:?}, use http or https",
            parsed.scheme()
        )));
    }

    info!(url = %parsed, "Fetching batch CSV");

    let mut response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| SourceError::fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::fetch(format!("server responded with {}", status)));
    }

    let too_large = || SourceError::fetch(format!("body exceeds {} bytes", max_bytes));

    if let Some(len) = response.content_length() {
        if len > max_bytes as u64 {
            return Err(too_large());
        }
    }

    // Content-Length is advisory
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| SourceError::fetch(e.to_string()))?
    {
        if body.len() + chunk.len() > max_bytes {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(body))
}
