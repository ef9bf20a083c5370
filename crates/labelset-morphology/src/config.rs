#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MorphologyError;

/// Whether the filter grows or shrinks the labeled regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MorphologyMode {
    /// Grow every region, background voxels take the nearest label.
    Dilate,
    /// Shrink every region, touching regions separate at their border.
    Erode,
}

impl MorphologyMode {
    /// The starting value of the envelope search.
    ///
    /// Any parabola height beats it: the lowest value when keeping the maximum
    /// and the highest value when keeping the minimum.
    #[inline]
    pub fn sentinel(self) -> f32 {
        match self {
            MorphologyMode::Dilate => f32::NEG_INFINITY,
            MorphologyMode::Erode => f32::INFINITY,
        }
    }
}

/// The radius of the structuring element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RadiusSpec {
    /// The same radius along every axis.
    Uniform(f32),
    /// One radius per axis, a zero entry disables the axis.
    PerAxis(Vec<f32>),
}

impl Default for RadiusSpec {
    fn default() -> Self {
        RadiusSpec::Uniform(1.0)
    }
}

impl RadiusSpec {
    /// Expand the radius to one entry per axis and validate it.
    ///
    /// # Errors
    ///
    /// The number of entries must match `ndim` and every entry must be finite
    /// and non-negative.
    pub fn resolve(&self, ndim: usize) -> Result<Vec<f32>, MorphologyError> {
        let radius = match self {
            RadiusSpec::Uniform(r) => vec![*r; ndim],
            RadiusSpec::PerAxis(radius) => {
                if radius.len() != ndim {
                    return Err(MorphologyError::RadiusLengthMismatch {
                        expected: ndim,
                        actual: radius.len(),
                    });
                }
                radius.clone()
            }
        };

        for (axis, &value) in radius.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(MorphologyError::InvalidRadius { axis, value });
            }
        }

        Ok(radius)
    }
}

impl From<f32> for RadiusSpec {
    fn from(radius: f32) -> Self {
        RadiusSpec::Uniform(radius)
    }
}

impl From<Vec<f32>> for RadiusSpec {
    fn from(radius: Vec<f32>) -> Self {
        RadiusSpec::PerAxis(radius)
    }
}

impl<const N: usize> From<[f32; N]> for RadiusSpec {
    fn from(radius: [f32; N]) -> Self {
        RadiusSpec::PerAxis(radius.to_vec())
    }
}

/// Parameters of a label set filter run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MorphologyConfig {
    /// Radius of the structuring element.
    pub radius: RadiusSpec,
    /// Interpret the radius in physical units using the image spacing.
    ///
    /// When false the radius is in voxels and a small margin is added so
    /// the discrete result does not under-represent the radius.
    pub use_image_spacing: bool,
    /// Number of worker threads used inside each dimension pass.
    pub num_threads: usize,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            radius: RadiusSpec::default(),
            use_image_spacing: false,
            num_threads: rayon::current_num_threads(),
        }
    }
}
