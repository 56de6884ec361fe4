//! Dataset loading.
//!
//! This module performs the single asynchronous load of the dataset
//! document, either from a local file or from an HTTP(S) endpoint.

use crate::models::Dataset;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Failure to obtain a usable dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed dataset document from {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the dataset document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Local JSON file.
    File(PathBuf),
    /// Remote JSON document fetched with a GET request.
    Url(String),
}

impl DataSource {
    /// Interpret a location string; http(s) URLs are remote, anything else a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Decode a dataset document (a JSON array of records).
pub fn parse_dataset(bytes: &[u8], origin: &str) -> Result<Dataset, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Malformed {
        origin: origin.to_string(),
        source,
    })
}

/// Load the dataset from its source.
pub async fn load_dataset(source: &DataSource, timeout: Duration) -> Result<Dataset, LoadError> {
    let origin = source.to_string();
    debug!("Loading dataset from {}", origin);

    let bytes = match source {
        DataSource::File(path) => read_file(path).await?,
        DataSource::Url(url) => fetch_url(url, timeout).await?,
    };

    let dataset = parse_dataset(&bytes, &origin)?;
    info!("Loaded {} records from {}", dataset.len(), origin);
    Ok(dataset)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn fetch_url(url: &str, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    let http_err = |source: reqwest::Error| LoadError::Http {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http_err)?;

    let response = client.get(url).send().await.map_err(http_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().await.map_err(http_err)?;
    Ok(body.to_vec())
}
