#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `labelset-image` provides the N-dimensional [`Volume`] container used by the
//! label morphology filters. A volume owns a flat row-major buffer together with
//! its shape, strides and physical geometry (per-axis spacing and origin).
//!
//! ```rust
//! use labelset_image::{ops, Volume};
//!
//! let labels = Volume::<u16, 2>::new([2, 3], vec![0, 1, 1, 0, 2, 0]).unwrap();
//! assert_eq!(ops::count_labeled(&labels), 3);
//! ```

/// Error types for the volume module.
pub mod error;

/// Label pixel trait.
pub mod label;

/// Utilities operating on label volumes.
pub mod ops;

/// N-dimensional volume representation.
pub mod volume;

pub use crate::error::VolumeError;
pub use crate::label::LabelType;
pub use crate::volume::Volume;

/// Type alias for a 2-dimensional volume.
pub type Volume2<T> = Volume<T, 2>;

/// Type alias for a 3-dimensional volume.
pub type Volume3<T> = Volume<T, 3>;
