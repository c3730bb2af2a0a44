//! Pure Rust image processing backend with no external tools.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Center crop | `DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{calculate_fill_dimensions, center_crop_offset};
use super::params::{CropParams, OutputFormat};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::BufWriter;
use std::path::Path;

/// Extensions whose decoders are compiled in.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Resize to cover `width` x `height`, then take the centered window.
fn cover_crop(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let fill = calculate_fill_dimensions((img.width(), img.height()), (width, height));
    let resized = img.resize_exact(fill.0, fill.1, FilterType::Lanczos3);
    let (x, y) = center_crop_offset(fill, (width, height));
    resized.crop_imm(x, y, width, height)
}

/// Encode in the requested format and write to `path`.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: u32,
) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = BufWriter::new(file);
    let result = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8);
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Png => {
            img.write_with_encoder(image::codecs::png::PngEncoder::new(writer))
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(image::codecs::webp::WebPEncoder::new_lossless(writer))
        }
    };
    result.map_err(|e| {
        BackendError::ProcessingFailed(format!("{} encode failed: {}", format, e))
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn crop(&self, params: &CropParams) -> Result<(), BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Invalid target size {}x{}",
                params.width, params.height
            )));
        }
        let img = load_image(&params.source)?;
        let cropped = cover_crop(&img, params.width, params.height);
        save_image(&cropped, &params.output, params.format, params.quality.value())
    }
}
