//! Portrait processing for `import-photo`, in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Cover crop** | Lanczos3 `resize_exact` + `crop_imm` |
//! | **Encode** | JPEG (quality), PNG, WebP (lossless) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for aspect and dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{parse_aspect, target_dimensions};
pub use operations::{PortraitConfig, create_portrait, plan_portrait};
pub use params::{CropParams, OutputFormat, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
