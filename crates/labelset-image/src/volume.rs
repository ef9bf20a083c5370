use crate::error::VolumeError;

/// Computes the strides for a row-major (C-contiguous) layout.
///
/// The last axis has stride 1 and each axis' stride is the product of all
/// extents to its right.
///
/// # Examples
///
/// ```rust
/// use labelset_image::volume::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3]), [3, 1]);
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// An N-dimensional volume with owned data and physical geometry.
///
/// The data is stored contiguously in row-major order: axis `N - 1` varies
/// fastest in memory and axis 0 slowest. Each axis carries a physical
/// spacing (the size of a voxel along that axis) and the volume carries
/// the physical position of its first voxel (the origin).
///
/// # Examples
///
/// ```rust
/// use labelset_image::Volume;
///
/// let volume = Volume::<u8, 2>::new([2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(volume.shape(), [2, 3]);
/// assert_eq!(volume.get([1, 2]), Some(&5));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Volume<T, const N: usize> {
    data: Vec<T>,
    shape: [usize; N],
    strides: [usize; N],
    spacing: [f32; N],
    origin: [f32; N],
}

impl<T, const N: usize> Volume<T, N> {
    /// Create a new volume from its shape and data.
    ///
    /// The spacing defaults to 1 along every axis and the origin to 0.
    ///
    /// # Errors
    ///
    /// If the data length does not match the product of the shape, an error is returned.
    pub fn new(shape: [usize; N], data: Vec<T>) -> Result<Self, VolumeError> {
        let numel = shape.iter().product::<usize>();
        if data.len() != numel {
            return Err(VolumeError::invalid_shape(numel, data.len()));
        }

        Ok(Self {
            data,
            shape,
            strides: get_strides_from_shape(shape),
            spacing: [1.0; N],
            origin: [0.0; N],
        })
    }

    /// Create a new volume filled with the given value.
    pub fn from_shape_val(shape: [usize; N], val: T) -> Self
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self {
            data: vec![val; numel],
            shape,
            strides: get_strides_from_shape(shape),
            spacing: [1.0; N],
            origin: [0.0; N],
        }
    }

    /// Create a new volume by evaluating a function at every index.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use labelset_image::Volume;
    ///
    /// let volume = Volume::<u16, 2>::from_shape_fn([2, 2], |[r, c]| (r * 2 + c) as u16);
    /// assert_eq!(volume.as_slice(), &[0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Self
    where
        F: Fn([usize; N]) -> T,
    {
        let strides = get_strides_from_shape(shape);
        let numel = shape.iter().product::<usize>();
        let data = (0..numel)
            .map(|offset| f(unravel_index(offset, strides)))
            .collect();

        Self {
            data,
            shape,
            strides,
            spacing: [1.0; N],
            origin: [0.0; N],
        }
    }

    /// Set the physical spacing of the volume.
    ///
    /// # Errors
    ///
    /// Every spacing must be positive and finite.
    pub fn with_spacing(mut self, spacing: [f32; N]) -> Result<Self, VolumeError> {
        for (axis, &value) in spacing.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(VolumeError::InvalidSpacing { axis, value });
            }
        }
        self.spacing = spacing;
        Ok(self)
    }

    /// Set the physical position of the first voxel.
    pub fn with_origin(mut self, origin: [f32; N]) -> Self {
        self.origin = origin;
        self
    }

    /// Number of dimensions of the volume.
    #[inline]
    pub const fn ndim(&self) -> usize {
        N
    }

    /// The extent of every axis.
    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    /// The row-major strides of every axis, in elements.
    #[inline]
    pub fn strides(&self) -> [usize; N] {
        self.strides
    }

    /// The physical voxel size along every axis.
    #[inline]
    pub fn spacing(&self) -> [f32; N] {
        self.spacing
    }

    /// The physical position of the voxel at index zero.
    #[inline]
    pub fn origin(&self) -> [f32; N] {
        self.origin
    }

    /// Total number of voxels.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns true if any axis has zero extent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The data of the volume as a flat row-major slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The data of the volume as a flat row-major mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the volume and return its data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Flat offset of an index, or `None` if the index is out of bounds.
    pub fn offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&i, &extent), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if i >= extent {
                return None;
            }
            offset += i * stride;
        }
        Some(offset)
    }

    /// Index of the voxel stored at a flat offset.
    ///
    /// # Errors
    ///
    /// If the offset is not smaller than the number of voxels.
    pub fn unravel(&self, offset: usize) -> Result<[usize; N], VolumeError> {
        if offset >= self.numel() {
            return Err(VolumeError::index_out_of_bounds(offset, self.numel()));
        }
        Ok(unravel_index(offset, self.strides))
    }

    /// Get a reference to the voxel at the given index.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.offset(index).map(|offset| &self.data[offset])
    }

    /// Get a mutable reference to the voxel at the given index.
    pub fn get_mut(&mut self, index: [usize; N]) -> Option<&mut T> {
        self.offset(index).map(move |offset| &mut self.data[offset])
    }

    /// Physical coordinate of an index, `origin + index * spacing`.
    pub fn index_to_physical(&self, index: [usize; N]) -> [f32; N] {
        let mut point = [0.0; N];
        for (axis, p) in point.iter_mut().enumerate() {
            *p = self.origin[axis] + index[axis] as f32 * self.spacing[axis];
        }
        point
    }

    /// Returns true if both volumes have the same shape, spacing and origin.
    pub fn same_geometry<U>(&self, other: &Volume<U, N>) -> bool {
        self.shape == other.shape && self.spacing == other.spacing && self.origin == other.origin
    }

    /// Check that both volumes have the same shape, spacing and origin.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::GeometryMismatch`] otherwise.
    pub fn ensure_same_geometry<U>(&self, other: &Volume<U, N>) -> Result<(), VolumeError> {
        if self.same_geometry(other) {
            Ok(())
        } else {
            Err(VolumeError::GeometryMismatch)
        }
    }

    /// Apply a function to every voxel, keeping the geometry.
    pub fn map<U, F>(&self, f: F) -> Volume<U, N>
    where
        F: Fn(&T) -> U,
    {
        Volume {
            data: self.data.iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
            spacing: self.spacing,
            origin: self.origin,
        }
    }

    /// Create a volume with the geometry of `self` filled with `val`.
    pub fn like<U: Clone>(&self, val: U) -> Volume<U, N> {
        Volume {
            data: vec![val; self.numel()],
            shape: self.shape,
            strides: self.strides,
            spacing: self.spacing,
            origin: self.origin,
        }
    }
}

fn unravel_index<const N: usize>(mut offset: usize, strides: [usize; N]) -> [usize; N] {
    let mut index = [0; N];
    for axis in 0..N {
        if strides[axis] == 0 {
            continue;
        }
        index[axis] = offset / strides[axis];
        offset %= strides[axis];
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_checks_length() {
        let res = Volume::<u8, 2>::new([2, 3], vec![0; 5]);
        assert_eq!(res, Err(VolumeError::invalid_shape(6, 5)));
    }

    #[test]
    fn strides_and_offsets() -> Result<(), VolumeError> {
        let volume = Volume::<u32, 3>::new([2, 3, 4], (0..24).collect())?;
        assert_eq!(volume.strides(), [12, 4, 1]);
        assert_eq!(volume.offset([1, 2, 3]), Some(23));
        assert_eq!(volume.offset([2, 0, 0]), None);
        assert_eq!(volume.get([1, 0, 1]), Some(&13));
        assert_eq!(volume.unravel(13)?, [1, 0, 1]);
        assert!(volume.unravel(24).is_err());
        Ok(())
    }

    #[test]
    fn from_shape_fn_matches_index() {
        let volume = Volume::<usize, 3>::from_shape_fn([3, 2, 2], |[z, y, x]| z * 100 + y * 10 + x);
        assert_eq!(volume.get([2, 1, 0]), Some(&210));
        assert_eq!(volume.as_slice()[volume.strides()[0]], 100);
    }

    #[test]
    fn spacing_is_validated() -> Result<(), VolumeError> {
        let volume = Volume::<u8, 2>::from_shape_val([2, 2], 0);
        assert!(matches!(
            volume.clone().with_spacing([1.0, 0.0]),
            Err(VolumeError::InvalidSpacing { axis: 1, .. })
        ));
        assert!(volume.clone().with_spacing([f32::NAN, 1.0]).is_err());

        let volume = volume.with_spacing([0.5, 2.0])?.with_origin([10.0, -1.0]);
        assert_eq!(volume.index_to_physical([1, 1]), [10.5, 1.0]);
        Ok(())
    }

    #[test]
    fn map_and_like_keep_geometry() -> Result<(), VolumeError> {
        let volume = Volume::<u8, 2>::new([1, 3], vec![0, 1, 2])?.with_spacing([2.0, 3.0])?;
        let mapped = volume.map(|&v| v as f32 * 0.5);
        assert_eq!(mapped.as_slice(), &[0.0, 0.5, 1.0]);
        assert!(mapped.same_geometry(&volume));
        let zeros = volume.like(0i64);
        assert!(zeros.same_geometry(&volume));
        assert_eq!(zeros.numel(), 3);
        Ok(())
    }

    #[test]
    fn get_mut_writes_in_place() -> Result<(), VolumeError> {
        let mut volume = Volume::<u8, 2>::from_shape_val([2, 2], 0);
        *volume.get_mut([1, 0]).ok_or(VolumeError::index_out_of_bounds(1, 2))? = 9;
        assert_eq!(volume.as_slice(), &[0, 0, 9, 0]);
        Ok(())
    }

    #[test]
    fn geometry_mismatch() -> Result<(), VolumeError> {
        let labels: crate::Volume2<u8> =
            Volume::from_shape_val([2, 3], 1).with_spacing([1.0, 2.0])?;
        labels.ensure_same_geometry(&labels.like(0.0f32))?;

        let moved = labels.clone().with_origin([0.0, 5.0]);
        assert_eq!(
            labels.ensure_same_geometry(&moved),
            Err(VolumeError::GeometryMismatch)
        );
        let unit = Volume::<u8, 2>::from_shape_val([2, 3], 1);
        assert!(!labels.same_geometry(&unit));

        let volume: crate::Volume3<u16> = Volume::from_shape_val([1, 2, 3], 0);
        let reshaped = Volume::<u16, 3>::from_shape_val([1, 3, 2], 0);
        assert_eq!(
            volume.ensure_same_geometry(&reshaped),
            Err(VolumeError::GeometryMismatch)
        );
        Ok(())
    }
}
