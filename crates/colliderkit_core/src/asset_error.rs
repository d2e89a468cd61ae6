//! Asset error types
//!
//! Provides error handling for asset loading, saving and hot-reload operations.

use std::io;

use thiserror::Error;

/// Error type for asset operations
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error (file not found, permission denied, short read, etc.)
    #[error("Asset IO error: {0}")]
    Io(#[from] io::Error),
    /// Parse error (invalid file format, deserialization failure)
    #[error("Asset parse error: {0}")]
    Parse(String),
    /// Serialization error while writing an asset
    #[error("Asset serialize error: {0}")]
    Serialize(String),
    /// Asset not found in the cache
    #[error("Asset not found: {0}")]
    NotFound(String),
    /// File exists but holds no data
    #[error("Asset file is empty: {0}")]
    Empty(String),
    /// Path already cached as a different asset type
    #[error("Asset {0} is cached with a different type")]
    TypeMismatch(String),
}

impl From<String> for AssetError {
    fn from(msg: String) -> Self {
        AssetError::Parse(msg)
    }
}

impl From<&str> for AssetError {
    fn from(msg: &str) -> Self {
        AssetError::Parse(msg.to_string())
    }
}

impl From<ron::error::SpannedError> for AssetError {
    fn from(err: ron::error::SpannedError) -> Self {
        AssetError::Parse(err.to_string())
    }
}

impl From<ron::Error> for AssetError {
    fn from(err: ron::Error) -> Self {
        AssetError::Serialize(err.to_string())
    }
}
