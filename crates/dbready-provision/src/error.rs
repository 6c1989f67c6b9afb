//! Error types for database provisioning.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("The file {0} does not exist.")]
    ConfigFileNotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ini::ParseError,
    },

    #[error("Master password (admin_passwd) not found in {0}.")]
    MasterPasswordMissing(String),

    #[error("Invalid server URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// An error from the underlying HTTP client, TLS failures included.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
