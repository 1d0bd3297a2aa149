//! File I/O: mesh emission and request configuration files.
//!
//! - `.stl`: binary STL mesh export, one record per extracted triangle.
//! - `.json`: [`SurfaceRequest`](crate::engine::SurfaceRequest) load/save
//!   for reproducible invocations.

pub mod json;
pub mod stl;

pub use json::{load_request, save_request};
pub use stl::export_stl;

use thiserror::Error;

/// File I/O errors.
///
/// Mesh emission failures are non-fatal at the engine level: the normal
/// result is still returned and the error is carried alongside it.
#[derive(Error, Debug)]
pub enum IoError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON request file
    #[error("invalid request file: {0}")]
    Json(#[from] serde_json::Error),
}
