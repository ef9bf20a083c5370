//! Applies the line operations to every scanline of a region for one axis.

use labelset_image::LabelType;

use crate::config::MorphologyMode;
use crate::line;
use crate::parallel::Region;
use crate::scanline::{gather_line, ScanlineIter, SharedBuffer};

/// A maximal stretch of equal, non background labels on a scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
    pub first: usize,
    pub last: usize,
}

/// Collect the runs of a line of labels into `runs`.
pub(crate) fn find_runs<L: LabelType>(labels: &[L], runs: &mut Vec<Run>) {
    runs.clear();
    let mut pos = 0;
    while pos < labels.len() {
        let label = labels[pos];
        if label.is_background() {
            pos += 1;
            continue;
        }
        let first = pos;
        while pos < labels.len() && labels[pos] == label {
            pos += 1;
        }
        runs.push(Run {
            first,
            last: pos - 1,
        });
    }
}

/// What a worker needs to know about the current pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PassParams {
    pub axis: usize,
    pub magnitude: f32,
    pub base_sigma: f32,
    pub first_pass: bool,
    pub last_pass: bool,
}

/// Per worker line buffers, sized once for the scan axis.
struct LineScratch<L> {
    dist: Vec<f32>,
    tmp: Vec<f32>,
    labels: Vec<L>,
    tmp_labels: Vec<L>,
    runs: Vec<Run>,
    pad: Vec<f32>,
    pad_tmp: Vec<f32>,
}

impl<L: LabelType> LineScratch<L> {
    fn new(len: usize) -> Self {
        Self {
            dist: vec![0.0; len],
            tmp: vec![0.0; len],
            labels: vec![L::background(); len],
            tmp_labels: vec![L::background(); len],
            runs: Vec::new(),
            pad: Vec::with_capacity(len + 2),
            pad_tmp: Vec::with_capacity(len + 2),
        }
    }
}

/// Erode the scanlines of a region along `params.axis`.
///
/// Runs are always taken from the input labels: a run keeps its extent on
/// every pass and only its distance values shrink. Each run is eroded on its
/// own, padded with a virtual sample at either end that is `base_sigma` at
/// the image border and zero elsewhere. The last pass writes the label of
/// every voxel whose distance still reaches `base_sigma`.
///
/// # Safety
///
/// No other thread may access the scanlines of `region` along `params.axis`
/// in `dist` or `labels` during the call.
pub(crate) unsafe fn erode_region<L: LabelType, const N: usize>(
    input: &[L],
    dist: &SharedBuffer<'_, f32>,
    labels: &SharedBuffer<'_, L>,
    strides: [usize; N],
    region: &Region<N>,
    params: &PassParams,
) {
    let len = region.size[params.axis];
    let mut s = LineScratch::<L>::new(len);

    for scanline in ScanlineIter::new(region, params.axis, strides) {
        gather_line(input, &scanline, &mut s.labels);
        find_runs(&s.labels, &mut s.runs);

        if params.first_pass {
            s.dist.fill(0.0);
        } else {
            // SAFETY: the caller owns the scanline
            unsafe { dist.gather(&scanline, &mut s.dist) };
        }

        for run in s.runs.iter() {
            let left_end = if run.first == 0 { params.base_sigma } else { 0.0 };
            let right_end = if run.last == len - 1 { params.base_sigma } else { 0.0 };
            let values = &mut s.dist[run.first..=run.last];

            if params.first_pass {
                line::erode_first_pass(
                    values,
                    left_end,
                    right_end,
                    params.magnitude,
                    params.base_sigma,
                );
            } else {
                s.pad.clear();
                s.pad.push(left_end);
                s.pad.extend_from_slice(values);
                s.pad.push(right_end);
                s.pad_tmp.resize(s.pad.len(), 0.0);

                line::envelope(
                    &mut s.pad,
                    &mut s.pad_tmp,
                    params.magnitude,
                    MorphologyMode::Erode,
                );
                values.copy_from_slice(&s.pad[1..s.pad.len() - 1]);
            }
        }

        // SAFETY: the caller owns the scanline
        unsafe { dist.scatter(&scanline, &s.dist) };

        if params.last_pass {
            for ((out, &label), &d) in s.tmp_labels.iter_mut().zip(&s.labels).zip(&s.dist) {
                *out = if d >= params.base_sigma {
                    label
                } else {
                    L::background()
                };
            }
            // SAFETY: the caller owns the scanline
            unsafe { labels.scatter(&scanline, &s.tmp_labels) };
        }
    }
}

/// Dilate the scanlines of a region along `params.axis`.
///
/// The first pass seeds labeled voxels at `base_sigma` and the background at
/// zero, then spreads labels with the closed form first pass. Later passes
/// take the envelope of the running distance and carry the labels with it.
///
/// # Safety
///
/// No other thread may access the scanlines of `region` along `params.axis`
/// in `dist` or `labels` during the call.
pub(crate) unsafe fn dilate_region<L: LabelType, const N: usize>(
    input: &[L],
    dist: &SharedBuffer<'_, f32>,
    labels: &SharedBuffer<'_, L>,
    strides: [usize; N],
    region: &Region<N>,
    params: &PassParams,
) {
    let len = region.size[params.axis];
    let mut s = LineScratch::<L>::new(len);

    for scanline in ScanlineIter::new(region, params.axis, strides) {
        if params.first_pass {
            gather_line(input, &scanline, &mut s.labels);
            for (d, label) in s.dist.iter_mut().zip(&s.labels) {
                *d = if label.is_background() {
                    0.0
                } else {
                    params.base_sigma
                };
            }

            line::dilate_first_pass(
                &mut s.dist,
                &mut s.tmp,
                &s.labels,
                &mut s.tmp_labels,
                params.magnitude,
            );

            // SAFETY: the caller owns the scanline
            unsafe {
                dist.scatter(&scanline, &s.dist);
                labels.scatter(&scanline, &s.tmp_labels);
            }
        } else {
            // SAFETY: the caller owns the scanline
            unsafe {
                dist.gather(&scanline, &mut s.dist);
                labels.gather(&scanline, &mut s.labels);
            }

            line::envelope_with_labels(
                &mut s.dist,
                &mut s.tmp,
                &mut s.labels,
                &mut s.tmp_labels,
                params.magnitude,
                MorphologyMode::Dilate,
            );

            // SAFETY: the caller owns the scanline
            unsafe {
                dist.scatter(&scanline, &s.dist);
                labels.scatter(&scanline, &s.labels);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelset_image::volume::get_strides_from_shape;

    fn params(axis: usize, first_pass: bool, last_pass: bool) -> PassParams {
        PassParams {
            axis,
            magnitude: 0.5,
            base_sigma: 1.5,
            first_pass,
            last_pass,
        }
    }

    #[test]
    fn runs_split_on_label_change() {
        let mut runs = Vec::new();
        find_runs(&[0u8, 1, 1, 2, 0, 0, 2, 2], &mut runs);
        assert_eq!(
            runs,
            vec![
                Run { first: 1, last: 2 },
                Run { first: 3, last: 3 },
                Run { first: 6, last: 7 },
            ]
        );

        find_runs(&[0u8, 0], &mut runs);
        assert!(runs.is_empty());
    }

    #[test]
    fn erode_single_pass_rows() {
        // radius 1 along the rows only: a voxel survives when both row
        // neighbours carry the same label or lie outside the image
        let shape = [2, 5];
        let input: Vec<u8> = vec![1, 1, 1, 1, 0, 2, 2, 3, 3, 3];
        let mut dist = vec![0.0f32; 10];
        let mut labels = vec![0u8; 10];

        let dist_buf = SharedBuffer::new(&mut dist);
        let label_buf = SharedBuffer::new(&mut labels);
        unsafe {
            erode_region(
                &input,
                &dist_buf,
                &label_buf,
                get_strides_from_shape(shape),
                &Region::full(shape),
                &params(1, true, true),
            );
        }

        assert_eq!(labels, vec![1, 1, 1, 0, 0, 2, 0, 0, 3, 3]);
        assert_eq!(dist[4], 0.0);
        assert_eq!(dist[3], 0.5);
    }

    #[test]
    fn dilate_two_passes() {
        let shape = [3, 3];
        let strides = get_strides_from_shape(shape);
        let region = Region::full(shape);
        let mut input = vec![0u16; 9];
        input[4] = 9;

        let mut dist = vec![0.0f32; 9];
        let mut labels = vec![0u16; 9];
        let dist_buf = SharedBuffer::new(&mut dist);
        let label_buf = SharedBuffer::new(&mut labels);
        unsafe {
            let first = params(0, true, false);
            dilate_region(&input, &dist_buf, &label_buf, strides, &region, &first);
            let last = params(1, false, true);
            dilate_region(&input, &dist_buf, &label_buf, strides, &region, &last);
        }

        // r = 1 in voxel units claims the full 3x3 neighbourhood
        assert_eq!(labels, vec![9; 9]);
        assert_eq!(dist[4], 1.5);
        assert_eq!(dist[0], 0.5);
    }
}
