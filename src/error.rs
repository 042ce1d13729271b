use thiserror::Error;

use crate::xml::XmlError;

/// Coarse failure classes callers (and tests) can branch on without
/// matching every [`CatalogError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure, timeout, or a non-success HTTP status.
    Transport,
    /// Response body is not well-formed XML.
    Parse,
    /// Response parsed but an expected node is missing or blank.
    NotFound,
    /// Caller-supplied input cannot be sent (bad URL, bad answer key).
    InvalidInput,
}

/// Errors raised by the license catalog client.
///
/// Every variant carries the name of the operation that failed so a single
/// log line is enough to locate the call.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{operation}: request to {url} failed: {source}")]
    Transport {
        operation: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: {url} returned HTTP {status}")]
    Status {
        operation: &'static str,
        url: String,
        status: u16,
    },

    #[error("{operation}: invalid URL {url}: {reason}")]
    InvalidUrl {
        operation: &'static str,
        url: String,
        reason: String,
    },

    #[error("{operation}: malformed XML response: {source}")]
    Parse {
        operation: &'static str,
        #[source]
        source: XmlError,
    },

    #[error("{operation}: expected node `{node}` not found")]
    NotFound {
        operation: &'static str,
        node: String,
    },

    #[error("answer key `{key}` is not a valid XML element name")]
    InvalidAnswer { key: String },

    #[error("license id `{id}` does not form a valid element name `license-{id}`")]
    InvalidLicenseId { id: String },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Transport { .. } | CatalogError::Status { .. } => ErrorKind::Transport,
            CatalogError::Parse { .. } => ErrorKind::Parse,
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::InvalidUrl { .. }
            | CatalogError::InvalidAnswer { .. }
            | CatalogError::InvalidLicenseId { .. } => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn not_found(operation: &'static str, node: impl Into<String>) -> Self {
        CatalogError::NotFound {
            operation,
            node: node.into(),
        }
    }
}
