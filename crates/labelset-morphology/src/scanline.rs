use std::marker::PhantomData;

use crate::parallel::Region;

/// A line of voxels along one axis, addressed in the flat buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scanline {
    /// Offset of the first voxel.
    pub offset: usize,
    /// Distance between consecutive voxels.
    pub stride: usize,
    /// Number of voxels.
    pub len: usize,
}

impl Scanline {
    #[inline]
    fn at(&self, i: usize) -> usize {
        self.offset + i * self.stride
    }
}

/// Iterates the scanlines along `axis` that start inside a region.
pub(crate) struct ScanlineIter<const N: usize> {
    region: Region<N>,
    axis: usize,
    strides: [usize; N],
    current: [usize; N],
    done: bool,
}

impl<const N: usize> ScanlineIter<N> {
    pub fn new(region: &Region<N>, axis: usize, strides: [usize; N]) -> Self {
        Self {
            region: *region,
            axis,
            strides,
            current: [0; N],
            done: region.size.contains(&0),
        }
    }
}

impl<const N: usize> Iterator for ScanlineIter<N> {
    type Item = Scanline;

    fn next(&mut self) -> Option<Scanline> {
        if self.done {
            return None;
        }

        let offset = (0..N)
            .map(|i| (self.region.start[i] + self.current[i]) * self.strides[i])
            .sum();
        let line = Scanline {
            offset,
            stride: self.strides[self.axis],
            len: self.region.size[self.axis],
        };

        // odometer over the other axes, fastest axis first
        self.done = true;
        for i in (0..N).rev() {
            if i == self.axis {
                continue;
            }
            self.current[i] += 1;
            if self.current[i] < self.region.size[i] {
                self.done = false;
                break;
            }
            self.current[i] = 0;
        }

        Some(line)
    }
}

/// Copy a scanline out of a flat buffer.
pub(crate) fn gather_line<T: Copy>(src: &[T], line: &Scanline, out: &mut [T]) {
    for (i, v) in out[..line.len].iter_mut().enumerate() {
        *v = src[line.at(i)];
    }
}

/// A mutable buffer shared by the workers of one pass.
///
/// Workers read and write whole scanlines. Within a pass every scanline is
/// owned by exactly one worker, which is what makes the unsynchronized
/// access sound.
pub(crate) struct SharedBuffer<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: SharedBuffer can be sent between threads because:
// - it holds the exclusive borrow of the data for its whole lifetime
// - T: Send is required by the impl bound
unsafe impl<T: Send> Send for SharedBuffer<'_, T> {}

// SAFETY: SharedBuffer can be shared between threads because:
// - all access goes through the unsafe gather and scatter methods
// - callers guarantee that no two threads touch the same scanline
unsafe impl<T: Send> Sync for SharedBuffer<'_, T> {}

impl<'a, T: Copy> SharedBuffer<'a, T> {
    pub fn new(data: &'a mut [T]) -> Self {
        Self {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            _marker: PhantomData,
        }
    }

    /// Copy a scanline out of the buffer.
    ///
    /// # Safety
    ///
    /// No other thread may write the scanline during the call.
    pub unsafe fn gather(&self, line: &Scanline, out: &mut [T]) {
        debug_assert!(line.len == 0 || line.at(line.len - 1) < self.len);
        for (i, v) in out[..line.len].iter_mut().enumerate() {
            // SAFETY: scanlines are built from the shape of this buffer, so they stay in bounds
            *v = unsafe { *self.ptr.add(line.at(i)) };
        }
    }

    /// Copy values into a scanline of the buffer.
    ///
    /// # Safety
    ///
    /// No other thread may read or write the scanline during the call.
    pub unsafe fn scatter(&self, line: &Scanline, values: &[T]) {
        debug_assert!(line.len == 0 || line.at(line.len - 1) < self.len);
        for (i, v) in values[..line.len].iter().enumerate() {
            // SAFETY: in bounds as above, and the caller owns the scanline
            unsafe { *self.ptr.add(line.at(i)) = *v };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelset_image::volume::get_strides_from_shape;

    #[test]
    fn scanlines_2d() {
        let shape = [2, 3];
        let strides = get_strides_from_shape(shape);
        let region = Region::full(shape);

        let rows: Vec<Scanline> = ScanlineIter::new(&region, 1, strides).collect();
        assert_eq!(
            rows,
            vec![
                Scanline { offset: 0, stride: 1, len: 3 },
                Scanline { offset: 3, stride: 1, len: 3 },
            ]
        );

        let cols: Vec<usize> = ScanlineIter::new(&region, 0, strides)
            .map(|l| l.offset)
            .collect();
        assert_eq!(cols, vec![0, 1, 2]);
    }

    #[test]
    fn scanlines_in_a_stripe() {
        let shape = [4, 3, 5];
        let strides = get_strides_from_shape(shape);
        let region = Region {
            start: [2, 0, 0],
            size: [2, 3, 5],
        };

        let lines: Vec<Scanline> = ScanlineIter::new(&region, 1, strides).collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], Scanline { offset: 30, stride: 5, len: 3 });
        assert_eq!(lines[5].offset, 45);
    }

    #[test]
    fn gather_and_scatter() {
        let mut data: Vec<u16> = (0..12).collect();
        let line = Scanline {
            offset: 1,
            stride: 4,
            len: 3,
        };

        let mut out = [0u16; 3];
        gather_line(&data, &line, &mut out);
        assert_eq!(out, [1, 5, 9]);

        let shared = SharedBuffer::new(&mut data);
        unsafe { shared.scatter(&line, &[7, 7, 7]) };
        let mut back = [0u16; 3];
        unsafe { shared.gather(&line, &mut back) };
        assert_eq!(back, [7, 7, 7]);
        assert_eq!(data[5], 7);
        assert_eq!(data[4], 4);
    }
}
