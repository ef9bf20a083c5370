#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! The filters grow or shrink every region of a label image at once, using a
//! parabolic structuring element that is applied one axis at a time. While the
//! regions grow, each background voxel takes the label of the nearest region.
//! While they shrink, regions that touch are eroded from their shared border
//! and come apart.
//!
//! ```rust
//! use labelset_image::Volume;
//! use labelset_morphology::{label_set_erode, MorphologyConfig, RadiusSpec};
//!
//! let src = Volume::<u8, 2>::new([1, 6], vec![1, 1, 1, 2, 2, 2]).unwrap();
//! let config = MorphologyConfig {
//!     radius: RadiusSpec::PerAxis(vec![0.0, 1.0]),
//!     use_image_spacing: false,
//!     num_threads: 1,
//! };
//! let out = label_set_erode(&src, &config).unwrap();
//! assert_eq!(out.labels.as_slice(), &[1, 1, 0, 0, 2, 2]);
//! ```

/// Filter configuration.
pub mod config;

mod driver;

/// Error types for the morphology module.
pub mod error;

/// Label set dilation and erosion.
pub mod filter;

/// One dimensional parabolic operations.
pub mod line;

mod parallel;

/// Per-axis scale computation.
pub mod scale;

mod scanline;

pub use crate::config::{MorphologyConfig, MorphologyMode, RadiusSpec};
pub use crate::error::MorphologyError;
pub use crate::filter::{label_set_dilate, label_set_erode, LabelSetFilter, MorphologyOutput};
pub use crate::scale::AxisScales;
