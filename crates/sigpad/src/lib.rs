//! sigpad - Signature Capture
//!
//! Captures a handwritten signature from pointer samples and keeps it as a
//! committed raster plus a live vector stroke.
//!
//! This crate provides:
//! - Signature model shared between the input thread and a raster worker
//! - Serial background queue for compositing and snapshots
//! - Callback dispatch back to the interactive thread
//! - Empty-state observation
//! - Surface adapter driving a renderer from pointer events

mod config;
mod dispatch;
mod model;
mod observer;
mod output;
mod queue;
pub mod surface;

pub use config::SignatureConfig;
pub use dispatch::{CallbackDispatcher, InlineDispatcher, MainQueue};
pub use model::{ImageSource, SignatureModel};
pub use observer::EmptyStateObserver;
pub use output::{CanvasSize, SignatureOutput};
pub use queue::{SerialQueue, Task};

pub use sigpad_ink::{Point, StrokePath, WeightCurve};
pub use sigpad_raster::{Color, RasterError, RasterImage};

/// sigpad version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Signature model errors
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("Image composite failed: {0}")]
    ImageComposite(#[from] RasterError),

    #[error("Canvas has no size")]
    Unsized,

    #[error("Export failed: {0}")]
    Export(RasterError),

    #[error("Superseded by reset")]
    Superseded,

    #[error("Failed to start raster worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
