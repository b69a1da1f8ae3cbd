//! Error types for field generation and image output

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or saving a field
#[derive(Error, Debug)]
pub enum Error {
    /// Width or height is zero or exceeds the supported limits
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Iteration budget does not fit a field cell
    #[error("iteration budget {0} does not fit a 32-bit cell")]
    InvalidIterations(usize),

    /// Viewport bounds are empty, inverted or not finite
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),

    /// Unknown palette name
    #[error("unknown palette '{0}'")]
    UnknownPalette(String),

    /// `save` was called before any successful `generate`
    #[error("no field has been generated")]
    NoData,

    /// Creating, writing or renaming the output file failed
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The image encoder rejected the pixel data
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The grid for this many pixels could not be allocated
    #[error("cannot allocate a grid of {pixels} pixels")]
    Allocation { pixels: usize },

    /// Band shapes did not line up when rejoining a grid
    #[error("grid shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Row bands handed back to a join do not form one contiguous grid
    #[error("row bands do not line up: {0}")]
    BandMismatch(&'static str),

    /// Generation was interrupted by its cancel token or deadline
    #[error("generation cancelled")]
    Cancelled,

    /// A worker thread panicked while solving a band
    #[error("worker thread panicked")]
    WorkerPanicked,

    /// A worker thread went away before returning its band
    #[error("worker pool disconnected")]
    Disconnected,
}
