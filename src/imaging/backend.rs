//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the import command
//! needs: identify and crop.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Pure Rust, zero
//! external tools. Everything is statically linked into the binary.

use super::params::CropParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize to cover, center-crop to exact size, encode and write.
    fn crop(&self, params: &CropParams) -> Result<(), BackendError>;
}
