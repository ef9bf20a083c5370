use labelset_image::VolumeError;
use thiserror::Error;

/// Errors that can occur while running a label set filter.
///
/// Validation happens before any buffer is allocated, so an error never
/// leaves partial output behind.
#[derive(Error, Debug, PartialEq)]
pub enum MorphologyError {
    /// The radius vector does not have one entry per image axis.
    #[error("radius has {actual} entries but the image has {expected} dimensions")]
    RadiusLengthMismatch {
        /// Number of image dimensions
        expected: usize,
        /// Number of radius entries
        actual: usize,
    },

    /// A radius entry is negative or not finite.
    #[error("invalid radius {value} along axis {axis}")]
    InvalidRadius {
        /// The offending axis
        axis: usize,
        /// The rejected radius
        value: f32,
    },

    /// An image axis has zero length.
    #[error("image axis {0} has zero length")]
    EmptyAxis(usize),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// Only 2D and 3D label images are supported.
    #[error("unsupported image dimension {0}, expected 2 or 3")]
    UnsupportedDimension(usize),

    /// The worker thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Error raised by the volume container.
    #[error(transparent)]
    Volume(#[from] VolumeError),
}

impl MorphologyError {
    /// Returns true if the error was caused by invalid caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::RadiusLengthMismatch { .. }
                | Self::InvalidRadius { .. }
                | Self::EmptyAxis(_)
                | Self::InvalidThreadCount(_)
        )
    }
}
