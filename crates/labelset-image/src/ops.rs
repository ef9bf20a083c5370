use std::collections::BTreeMap;

use crate::{label::LabelType, volume::Volume};

/// A labeled voxel with its index and physical position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPoint<L, const N: usize> {
    /// The label stored at the voxel.
    pub label: L,
    /// The voxel index.
    pub index: [usize; N],
    /// The physical coordinate of the voxel.
    pub point: [f32; N],
}

/// Report every non-background voxel in memory order.
///
/// Useful to diff the output of two runs voxel by voxel.
pub fn labeled_points<L: LabelType, const N: usize>(src: &Volume<L, N>) -> Vec<LabelPoint<L, N>> {
    src.as_slice()
        .iter()
        .enumerate()
        .filter(|(_, label)| !label.is_background())
        .filter_map(|(offset, &label)| {
            let index = src.unravel(offset).ok()?;
            Some(LabelPoint {
                label,
                index,
                point: src.index_to_physical(index),
            })
        })
        .collect()
}

/// Replace the given labels with the background.
///
/// Used to restrict a dilation to a subset of the regions.
pub fn remove_labels<L: LabelType, const N: usize>(
    src: &Volume<L, N>,
    labels: &[L],
) -> Volume<L, N> {
    src.map(|&label| {
        if labels.contains(&label) {
            L::background()
        } else {
            label
        }
    })
}

/// Number of voxels per non-background label.
pub fn label_counts<L: LabelType, const N: usize>(src: &Volume<L, N>) -> BTreeMap<L, usize> {
    let mut counts = BTreeMap::new();
    for &label in src.as_slice().iter().filter(|l| !l.is_background()) {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Number of non-background voxels.
pub fn count_labeled<L: LabelType, const N: usize>(src: &Volume<L, N>) -> usize {
    src.as_slice()
        .iter()
        .filter(|l| !l.is_background())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VolumeError;

    #[test]
    fn labeled_points_report_physical_position() -> Result<(), VolumeError> {
        let volume = Volume::<u8, 2>::new([2, 2], vec![0, 3, 0, 4])?
            .with_spacing([2.0, 0.5])?
            .with_origin([1.0, 1.0]);
        let points = labeled_points(&volume);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, 3);
        assert_eq!(points[0].index, [0, 1]);
        assert_eq!(points[0].point, [1.0, 1.5]);
        assert_eq!(points[1].index, [1, 1]);
        assert_eq!(points[1].point, [3.0, 1.5]);
        Ok(())
    }

    #[test]
    fn remove_and_count() -> Result<(), VolumeError> {
        let volume = Volume::<u16, 2>::new([2, 3], vec![1, 1, 2, 0, 3, 3])?;
        let removed = remove_labels(&volume, &[3]);
        assert_eq!(removed.as_slice(), &[1, 1, 2, 0, 0, 0]);
        assert_eq!(count_labeled(&volume), 5);
        assert_eq!(count_labeled(&removed), 3);

        let counts = label_counts(&volume);
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&3), Some(&2));
        assert_eq!(counts.get(&0), None);
        Ok(())
    }
}
