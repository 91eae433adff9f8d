//! Error types for the markup pipeline
//!
//! Tokenizing and layout never fail; malformed markup degrades to literal
//! text. The variants here cover the source being unreadable and callers
//! breaking the rebuild-then-paint ordering.

use gridmark_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Markup pipeline error type
#[derive(Error, Debug)]
pub enum MarkupError {
    /// Source file could not be read
    #[error("Failed to read source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `paint` was called before `layout` produced a cache
    #[error("paint called without a layout cache; call layout(width) first")]
    LayoutMissing,

    /// Layout requested for a zero-column target
    #[error("layout width must be at least 1 column")]
    ZeroWidth,

    /// Configuration rejected
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for markup operations
pub type MarkupResult<T> = Result<T, MarkupError>;
