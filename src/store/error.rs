// Persistence-layer error types

use std::path::PathBuf;

/// Failures raised while loading or persisting the document
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be read, written or replaced
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a valid document
    #[error("store file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No id is left to hand out
    #[error("no {entity} ids left to allocate")]
    IdsExhausted { entity: &'static str },

    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
