use thiserror::Error;

/// Error type for volume creation and access.
#[derive(Error, Debug, PartialEq)]
pub enum VolumeError {
    /// Volume shape does not match the provided data.
    ///
    /// The product of the shape extents must equal the number of elements.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Index exceeds the volume bounds.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted
        index: usize,
        /// The size of the dimension being indexed
        size: usize,
    },

    /// The physical spacing along an axis is not a positive finite number.
    #[error("Invalid spacing {value} along axis {axis}, spacing must be positive and finite")]
    InvalidSpacing {
        /// The offending axis
        axis: usize,
        /// The rejected spacing value
        value: f32,
    },

    /// Two volumes were expected to share shape, spacing and origin.
    #[error("Volumes do not share the same geometry")]
    GeometryMismatch,
}

impl VolumeError {
    /// Creates an InvalidShape error with clear context.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error with clear context.
    pub fn index_out_of_bounds(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }
}
