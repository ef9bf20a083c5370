//! One dimensional parabolic operations on scanline buffers.
//!
//! Every routine works on a single line of samples. Magnitudes are always
//! positive: erosion adds `magnitude * k^2` to a sample `k` positions away,
//! dilation subtracts it.

use crate::config::MorphologyMode;

/// Closed form erosion of a single run during the first active pass.
///
/// On the first pass the heights inside a run are flat, so the result is the
/// lower of the two parabolas rooted just outside each end of the run, capped
/// at `sigma`. An end touching the image border passes `sigma` as its end
/// value and therefore never erodes the run.
///
/// # Arguments
///
/// * `line` - The run, overwritten with the eroded heights.
/// * `left_end` - Height of the virtual sample before the run.
/// * `right_end` - Height of the virtual sample after the run.
/// * `magnitude` - Curvature of the parabola.
/// * `sigma` - Height of the run interior.
pub fn erode_first_pass(
    line: &mut [f32],
    left_end: f32,
    right_end: f32,
    magnitude: f32,
    sigma: f32,
) {
    let len = line.len();
    if len == 1 {
        line[0] = (left_end + magnitude).min(right_end + magnitude).min(sigma);
        return;
    }

    for (pos, val) in line.iter_mut().enumerate() {
        let left = (pos + 1) as f32;
        let right = (len - pos) as f32;
        let left = left_end + magnitude * left * left;
        let right = right_end + magnitude * right * right;
        *val = left.min(right).min(sigma);
    }
}

/// Closed form dilation with label propagation during the first active pass.
///
/// Two sweeps, left to right into `tmp` and right to left back into `line`.
/// Each sweep remembers the last sample that reached the running maximum and
/// decays its height along the parabola. A sample takes the label of that
/// seed only when the decayed height is strictly above its own.
///
/// # Arguments
///
/// * `line` - The heights, overwritten with the dilated heights.
/// * `tmp` - Scratch buffer of the same length.
/// * `labels` - The input labels of the line.
/// * `new_labels` - Receives the propagated labels.
/// * `magnitude` - Curvature of the parabola.
pub fn dilate_first_pass<L: Copy>(
    line: &mut [f32],
    tmp: &mut [f32],
    labels: &[L],
    new_labels: &mut [L],
    magnitude: f32,
) {
    let len = line.len();
    if len == 0 {
        return;
    }

    let mut last_contact = 0;
    let mut last_val = line[0];
    for pos in 0..len {
        let krange = (pos - last_contact) as f32;
        let this_val = last_val - magnitude * krange * krange;

        if line[pos] >= line[last_contact] {
            last_contact = pos;
            last_val = line[pos];
        }
        tmp[pos] = line[pos].max(this_val);
        new_labels[pos] = if this_val > line[pos] {
            labels[last_contact]
        } else {
            labels[pos]
        };
    }

    last_contact = len - 1;
    last_val = tmp[last_contact];
    for pos in (0..len).rev() {
        let krange = (last_contact - pos) as f32;
        let this_val = last_val - magnitude * krange * krange;

        if tmp[pos] >= tmp[last_contact] {
            last_contact = pos;
            last_val = tmp[pos];
        }
        line[pos] = tmp[pos].max(this_val);
        if this_val > tmp[pos] {
            new_labels[pos] = labels[last_contact];
        }
    }
}

/// Parabolic envelope of a line, used on every pass after the first one.
///
/// For each position, keeps the extremal value of `line[p + k] -/+ magnitude * k^2`
/// over all offsets `k`. The search for a position starts at the contact point
/// of the previous position, so the work stays close to linear in the line
/// length.
///
/// # Arguments
///
/// * `line` - The heights, overwritten with the envelope.
/// * `tmp` - Scratch buffer of the same length.
/// * `magnitude` - Curvature of the parabola.
/// * `mode` - Keep the maximum (dilation) or the minimum (erosion).
pub fn envelope(line: &mut [f32], tmp: &mut [f32], magnitude: f32, mode: MorphologyMode) {
    match mode {
        MorphologyMode::Dilate => envelope_impl::<true>(line, tmp, magnitude),
        MorphologyMode::Erode => envelope_impl::<false>(line, tmp, magnitude),
    }
}

/// Parabolic envelope that also carries the label of the retained sample.
///
/// Same search as [`envelope`]. `labels` holds the labels of the input samples
/// and is overwritten with the label of the sample each output came from.
pub fn envelope_with_labels<L: Copy>(
    line: &mut [f32],
    tmp: &mut [f32],
    labels: &mut [L],
    tmp_labels: &mut [L],
    magnitude: f32,
    mode: MorphologyMode,
) {
    match mode {
        MorphologyMode::Dilate => {
            envelope_with_labels_impl::<true, L>(line, tmp, labels, tmp_labels, magnitude)
        }
        MorphologyMode::Erode => {
            envelope_with_labels_impl::<false, L>(line, tmp, labels, tmp_labels, magnitude)
        }
    }
}

#[inline(always)]
fn parabola<const DILATE: bool>(height: f32, magnitude: f32, krange: isize) -> f32 {
    let k2 = (krange * krange) as f32;
    if DILATE {
        height - magnitude * k2
    } else {
        height + magnitude * k2
    }
}

#[inline(always)]
fn keeps<const DILATE: bool>(candidate: f32, best: f32) -> bool {
    if DILATE {
        candidate >= best
    } else {
        candidate <= best
    }
}

#[inline(always)]
fn sentinel<const DILATE: bool>() -> f32 {
    if DILATE {
        MorphologyMode::Dilate.sentinel()
    } else {
        MorphologyMode::Erode.sentinel()
    }
}

fn envelope_impl<const DILATE: bool>(line: &mut [f32], tmp: &mut [f32], magnitude: f32) {
    let len = line.len() as isize;
    let mut koffset: isize = 0;
    let mut new_contact: isize = 0;

    // samples at or before the position
    for pos in 0..len {
        let mut best = sentinel::<DILATE>();
        for krange in koffset..=0 {
            let t = parabola::<DILATE>(line[(pos + krange) as usize], magnitude, krange);
            if keeps::<DILATE>(t, best) {
                best = t;
                new_contact = krange;
            }
        }
        tmp[pos as usize] = best;
        koffset = new_contact - 1;
    }

    // samples at or after the position
    koffset = 0;
    new_contact = 0;
    for pos in (0..len).rev() {
        let mut best = sentinel::<DILATE>();
        for krange in (0..=koffset).rev() {
            let t = parabola::<DILATE>(tmp[(pos + krange) as usize], magnitude, krange);
            if keeps::<DILATE>(t, best) {
                best = t;
                new_contact = krange;
            }
        }
        line[pos as usize] = best;
        koffset = new_contact + 1;
    }
}

fn envelope_with_labels_impl<const DILATE: bool, L: Copy>(
    line: &mut [f32],
    tmp: &mut [f32],
    labels: &mut [L],
    tmp_labels: &mut [L],
    magnitude: f32,
) {
    let len = line.len() as isize;
    let mut koffset: isize = 0;
    let mut new_contact: isize = 0;

    for pos in 0..len {
        let mut best = sentinel::<DILATE>();
        let mut best_label = labels[pos as usize];
        for krange in koffset..=0 {
            let idx = (pos + krange) as usize;
            let t = parabola::<DILATE>(line[idx], magnitude, krange);
            if keeps::<DILATE>(t, best) {
                best = t;
                new_contact = krange;
                best_label = labels[idx];
            }
        }
        tmp[pos as usize] = best;
        tmp_labels[pos as usize] = best_label;
        koffset = new_contact - 1;
    }

    koffset = 0;
    new_contact = 0;
    for pos in (0..len).rev() {
        let mut best = sentinel::<DILATE>();
        let mut best_label = tmp_labels[pos as usize];
        for krange in (0..=koffset).rev() {
            let idx = (pos + krange) as usize;
            let t = parabola::<DILATE>(tmp[idx], magnitude, krange);
            if keeps::<DILATE>(t, best) {
                best = t;
                new_contact = krange;
                best_label = tmp_labels[idx];
            }
        }
        line[pos as usize] = best;
        labels[pos as usize] = best_label;
        koffset = new_contact + 1;
    }
}
