use rayon::prelude::*;

use crate::error::MorphologyError;

/// A box of voxels handed to one worker.
///
/// Along the scan axis a region always spans the whole image, so every
/// scanline belongs to exactly one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region<const N: usize> {
    /// Index of the first voxel of the region.
    pub start: [usize; N],
    /// Extent of the region along each axis.
    pub size: [usize; N],
}

impl<const N: usize> Region<N> {
    /// The region covering the whole image.
    pub fn full(shape: [usize; N]) -> Self {
        Self {
            start: [0; N],
            size: shape,
        }
    }

    /// Number of voxels in the region.
    pub fn numel(&self) -> usize {
        self.size.iter().product()
    }
}

/// Split the image into stripes for the pass along `scan_axis`.
///
/// The stripes are cut along the longest other axis, the slowest varying
/// one on ties. Each stripe holds `ceil(len / num_workers)` slices, so the
/// last one may be shorter and fewer stripes than workers can come out.
/// When no other axis has more than one slice the whole image is returned
/// as a single region.
pub(crate) fn split_region<const N: usize>(
    shape: [usize; N],
    scan_axis: usize,
    num_workers: usize,
) -> Vec<Region<N>> {
    let mut split_axis = None;
    let mut split_len = 1;
    for (axis, &len) in shape.iter().enumerate() {
        if axis != scan_axis && len > split_len {
            split_axis = Some(axis);
            split_len = len;
        }
    }

    let split_axis = match split_axis {
        Some(axis) if num_workers > 1 => axis,
        _ => return vec![Region::full(shape)],
    };

    let per_worker = split_len.div_ceil(num_workers);
    let count = split_len.div_ceil(per_worker);

    (0..count)
        .map(|i| {
            let mut region = Region::full(shape);
            region.start[split_axis] = i * per_worker;
            region.size[split_axis] = per_worker.min(split_len - i * per_worker);
            region
        })
        .collect()
}

/// Build the worker pool of a filter invocation.
///
/// A single worker runs on the calling thread and needs no pool.
pub(crate) fn build_pool(
    num_threads: usize,
) -> Result<Option<rayon::ThreadPool>, MorphologyError> {
    match num_threads {
        0 => Err(MorphologyError::InvalidThreadCount(num_threads)),
        1 => Ok(None),
        n => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map(Some)
            .map_err(|e| MorphologyError::ThreadPool(e.to_string())),
    }
}

/// Run `op` on every region and return once all of them are done.
pub(crate) fn for_each_region<const N: usize, F>(
    pool: Option<&rayon::ThreadPool>,
    regions: &[Region<N>],
    op: F,
) where
    F: Fn(&Region<N>) + Sync + Send,
{
    match pool {
        Some(pool) => pool.install(|| {
            regions.par_iter().for_each(&op);
        }),
        None => regions.iter().for_each(op),
    }
}
