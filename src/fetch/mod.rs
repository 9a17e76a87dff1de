mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::config::DataSource;
use crate::error::{PipelineError, Result};
use tracing::{debug, info};

/// Downloads `url` with a single GET. Non-success statuses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> anyhow::Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads the workbook bytes from a local path or over HTTP.
///
/// Any failure on the remote path is reported as
/// [`PipelineError::Connection`].
#[tracing::instrument(skip(source), fields(source = %source))]
pub async fn acquire(source: &DataSource) -> Result<Vec<u8>> {
    let bytes = match source {
        DataSource::Remote(url) => {
            info!("Fetching remote spreadsheet");
            let client = BasicClient::new();
            fetch_bytes(&client, url)
                .await
                .map_err(|e| PipelineError::Connection(e.to_string()))?
        }
        DataSource::Local(path) => {
            info!("Reading local spreadsheet");
            std::fs::read(path)?
        }
    };
    debug!(bytes = bytes.len(), "Spreadsheet bytes loaded");
    Ok(bytes)
}
