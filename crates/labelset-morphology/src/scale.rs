/// Per-axis parabola scales derived from the radius vector.
///
/// The scale of an axis is `0.5 * r^2`, plus one in voxel units to give a
/// discrete radius a small margin, and zero for an axis with zero radius.
/// The first axis with a nonzero radius sets `base_sigma`; every later axis
/// is expressed relative to it so elliptical elements come out right.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScales {
    scales: Vec<f32>,
    base_sigma: f32,
    first_axis: Option<usize>,
    last_axis: Option<usize>,
    use_image_spacing: bool,
}

impl AxisScales {
    /// Compute the scales of a validated radius vector.
    ///
    /// # Arguments
    ///
    /// * `radius` - One non-negative radius per axis.
    /// * `use_image_spacing` - Whether the radius is in physical units.
    pub fn new(radius: &[f32], use_image_spacing: bool) -> Self {
        let mut scales: Vec<f32> = radius
            .iter()
            .map(|&r| {
                if r == 0.0 {
                    0.0
                } else if use_image_spacing {
                    0.5 * r * r
                } else {
                    0.5 * r * r + 1.0
                }
            })
            .collect();

        let first_axis = scales.iter().position(|&s| s > 0.0);
        let last_axis = scales.iter().rposition(|&s| s > 0.0);

        let base_sigma = first_axis.map_or(0.0, |axis| scales[axis]);
        if let Some(first) = first_axis {
            for scale in scales.iter_mut().skip(first) {
                *scale /= base_sigma;
            }
        }

        Self {
            scales,
            base_sigma,
            first_axis,
            last_axis,
            use_image_spacing,
        }
    }

    /// Scale of the first active axis, the height that survives an erosion.
    #[inline]
    pub fn base_sigma(&self) -> f32 {
        self.base_sigma
    }

    /// Scale of an axis relative to `base_sigma`, zero for inactive axes.
    ///
    /// # Panics
    ///
    /// Panics if `axis` is not smaller than the number of axes.
    #[inline]
    pub fn scale(&self, axis: usize) -> f32 {
        self.scales[axis]
    }

    /// Returns true if the axis takes part in the filter.
    ///
    /// # Panics
    ///
    /// Panics if `axis` is not smaller than the number of axes.
    #[inline]
    pub fn is_active(&self, axis: usize) -> bool {
        self.scales[axis] > 0.0
    }

    /// The first axis with a nonzero radius.
    #[inline]
    pub fn first_active_axis(&self) -> Option<usize> {
        self.first_axis
    }

    /// The last axis with a nonzero radius.
    #[inline]
    pub fn last_active_axis(&self) -> Option<usize> {
        self.last_axis
    }

    /// Returns true if every radius is zero and the filter is the identity.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.first_axis.is_none()
    }

    /// Curvature of the parabola along an active axis.
    ///
    /// `magnitude = iscale^2 / (2 * scale)` where `iscale` is the voxel spacing
    /// in physical units and 1 in voxel units.
    ///
    /// # Panics
    ///
    /// Panics if `axis` is not smaller than the number of axes.
    pub fn magnitude(&self, axis: usize, spacing: f32) -> f32 {
        let iscale = if self.use_image_spacing { spacing } else { 1.0 };
        (iscale * iscale) / (2.0 * self.scales[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::AxisScales;
    use approx::assert_relative_eq;

    #[test]
    fn isotropic_voxel_units() {
        let scales = AxisScales::new(&[1.0, 1.0], false);
        assert_eq!(scales.base_sigma(), 1.5);
        assert_eq!(scales.scale(0), 1.0);
        assert_eq!(scales.scale(1), 1.0);
        assert_eq!(scales.magnitude(1, 3.0), 0.5);
        assert_eq!(scales.first_active_axis(), Some(0));
        assert_eq!(scales.last_active_axis(), Some(1));
    }

    #[test]
    fn zero_radius_axes_are_inactive() {
        let scales = AxisScales::new(&[0.0, 2.0, 0.0], false);
        assert!(!scales.is_active(0));
        assert!(scales.is_active(1));
        assert!(!scales.is_active(2));
        assert_eq!(scales.base_sigma(), 3.0);
        assert_eq!(scales.first_active_axis(), Some(1));
        assert_eq!(scales.last_active_axis(), Some(1));
        assert!(!scales.is_identity());
    }

    #[test]
    fn all_zero_is_identity() {
        let scales = AxisScales::new(&[0.0, 0.0, 0.0], true);
        assert!(scales.is_identity());
        assert_eq!(scales.last_active_axis(), None);
    }

    #[test]
    fn elliptical_world_units() {
        let scales = AxisScales::new(&[1.0, 3.0], true);
        assert_eq!(scales.base_sigma(), 0.5);
        assert_relative_eq!(scales.scale(1), 9.0);
        // spacing enters squared in world units
        assert_relative_eq!(scales.magnitude(0, 2.0), 2.0);
        assert_relative_eq!(scales.magnitude(1, 1.0), 1.0 / 18.0);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn axis_past_the_end_panics() {
        let scales = AxisScales::new(&[1.0, 1.0], false);
        scales.is_active(2);
    }
}
