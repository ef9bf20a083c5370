#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use labelset_image as image;

#[doc(inline)]
pub use labelset_morphology as morphology;
