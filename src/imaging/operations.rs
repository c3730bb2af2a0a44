//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::target_dimensions;
use super::params::{CropParams, OutputFormat, Quality};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for a portrait crop.
#[derive(Debug, Clone)]
pub struct PortraitConfig {
    pub width: u32,
    /// Explicit height; derived from `aspect` when absent.
    pub height: Option<u32>,
    /// Width divided by height.
    pub aspect: f64,
    pub format: OutputFormat,
    pub quality: Quality,
}

impl Default for PortraitConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: None,
            aspect: 0.8,
            format: OutputFormat::default(),
            quality: Quality::default(),
        }
    }
}

impl PortraitConfig {
    pub fn dimensions(&self) -> (u32, u32) {
        target_dimensions(self.width, self.height, self.aspect)
    }
}

/// Build the crop parameters for a portrait without touching any pixels.
pub fn plan_portrait(source: &Path, output: &Path, config: &PortraitConfig) -> CropParams {
    let (width, height) = config.dimensions();
    CropParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        format: config.format,
        quality: config.quality,
    }
}

/// Cover-crop `source` into `output` at the configured size.
///
/// Returns the final `(width, height)`.
pub fn create_portrait(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &PortraitConfig,
) -> Result<(u32, u32)> {
    let params = plan_portrait(source, output, config);
    backend.crop(&params)?;
    Ok((params.width, params.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn default_config_is_800_by_1000() {
        assert_eq!(PortraitConfig::default().dimensions(), (800, 1000));
    }

    #[test]
    fn plan_uses_explicit_height() {
        let config = PortraitConfig {
            width: 600,
            height: Some(600),
            ..PortraitConfig::default()
        };
        let params = plan_portrait(Path::new("/in.jpg"), Path::new("/out.jpg"), &config);
        assert_eq!((params.width, params.height), (600, 600));
        assert_eq!(params.source, Path::new("/in.jpg"));
        assert_eq!(params.output, Path::new("/out.jpg"));
    }

    #[test]
    fn create_portrait_issues_one_crop() {
        let backend = MockBackend::new();
        let config = PortraitConfig {
            width: 400,
            aspect: 2.0 / 3.0,
            format: OutputFormat::Png,
            quality: Quality::new(60),
            ..PortraitConfig::default()
        };

        let dims = create_portrait(
            &backend,
            Path::new("/raw/ana.jpg"),
            Path::new("/static/ana-lee.png"),
            &config,
        )
        .unwrap();
        assert_eq!(dims, (400, 600));

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Crop {
                source: "/raw/ana.jpg".to_string(),
                output: "/static/ana-lee.png".to_string(),
                width: 400,
                height: 600,
                format: OutputFormat::Png,
                quality: 60,
            }]
        );
    }
}
