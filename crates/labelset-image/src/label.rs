use num_traits::PrimInt;

/// Trait for the integer pixel type of a label volume.
///
/// A value of zero is the background, any other value is a region id.
///
/// Send and Sync are required so label buffers can be shared with worker threads.
pub trait LabelType: PrimInt + Send + Sync + std::fmt::Debug + 'static {
    /// The background label.
    #[inline]
    fn background() -> Self {
        Self::zero()
    }

    /// Returns true if the label is the background.
    #[inline]
    fn is_background(&self) -> bool {
        self.is_zero()
    }
}

impl<T> LabelType for T where T: PrimInt + Send + Sync + std::fmt::Debug + 'static {}

#[cfg(test)]
mod tests {
    use super::LabelType;

    #[test]
    fn background_is_zero() {
        assert!(0u8.is_background());
        assert!(!7u16.is_background());
        assert!(!(-1i32).is_background());
        assert_eq!(<u32 as LabelType>::background(), 0);
    }
}
