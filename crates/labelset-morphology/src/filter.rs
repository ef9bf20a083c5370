use labelset_image::{LabelType, Volume};

use crate::config::{MorphologyConfig, MorphologyMode, RadiusSpec};
use crate::driver::{dilate_region, erode_region, PassParams};
use crate::error::MorphologyError;
use crate::parallel::{build_pool, for_each_region, split_region};
use crate::scale::AxisScales;
use crate::scanline::SharedBuffer;

/// The result of a label set filter.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphologyOutput<L, const N: usize> {
    /// The filtered labels, with the geometry of the input.
    pub labels: Volume<L, N>,
    /// The parabola height of every voxel after the last pass.
    ///
    /// Erosion leaves `base_sigma` inside the surviving regions, dilation
    /// leaves the decayed height of the nearest seed.
    pub distance: Volume<f32, N>,
}

/// Dilation or erosion of a label image with a parabolic structuring element.
///
/// The filter is separable: every axis with a nonzero radius is processed in
/// turn, from axis 0 to the last one, each pass reading the result of the
/// previous pass. Within a pass the scanlines are shared between the worker
/// threads.
///
/// # Examples
///
/// ```rust
/// use labelset_image::Volume;
/// use labelset_morphology::LabelSetFilter;
///
/// let mut data = vec![0u8; 25];
/// data[12] = 4;
/// let src = Volume::<u8, 2>::new([5, 5], data).unwrap();
///
/// let out = LabelSetFilter::dilate()
///     .with_uniform_radius(1.0)
///     .with_num_threads(1)
///     .apply(&src)
///     .unwrap();
///
/// // the 3x3 neighbourhood of the marker takes its label
/// assert_eq!(out.labels.get([1, 1]), Some(&4));
/// assert_eq!(out.labels.get([0, 2]), Some(&0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSetFilter {
    mode: MorphologyMode,
    config: MorphologyConfig,
}

impl LabelSetFilter {
    /// Create a filter with the default configuration.
    pub fn new(mode: MorphologyMode) -> Self {
        Self {
            mode,
            config: MorphologyConfig::default(),
        }
    }

    /// Create a dilation filter.
    pub fn dilate() -> Self {
        Self::new(MorphologyMode::Dilate)
    }

    /// Create an erosion filter.
    pub fn erode() -> Self {
        Self::new(MorphologyMode::Erode)
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: MorphologyConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the radius, either one value or one value per axis.
    pub fn with_radius(mut self, radius: impl Into<RadiusSpec>) -> Self {
        self.config.radius = radius.into();
        self
    }

    /// Set the same radius along every axis.
    pub fn with_uniform_radius(mut self, radius: f32) -> Self {
        self.config.radius = RadiusSpec::Uniform(radius);
        self
    }

    /// Interpret the radius in physical units.
    pub fn with_image_spacing(mut self, use_image_spacing: bool) -> Self {
        self.config.use_image_spacing = use_image_spacing;
        self
    }

    /// Set the number of worker threads.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.config.num_threads = num_threads;
        self
    }

    /// The operation of the filter.
    pub fn mode(&self) -> MorphologyMode {
        self.mode
    }

    /// The configuration of the filter.
    pub fn config(&self) -> &MorphologyConfig {
        &self.config
    }

    /// Compute the per-axis scales the filter would use on `src`.
    ///
    /// The thread count plays no part in the scales and is not checked.
    ///
    /// # Errors
    ///
    /// Fails for images that are not 2D or 3D, for empty axes and for an
    /// invalid radius.
    pub fn scales_for<L, const N: usize>(
        &self,
        src: &Volume<L, N>,
    ) -> Result<AxisScales, MorphologyError> {
        if N != 2 && N != 3 {
            return Err(MorphologyError::UnsupportedDimension(N));
        }
        if let Some(axis) = src.shape().iter().position(|&len| len == 0) {
            return Err(MorphologyError::EmptyAxis(axis));
        }
        let radius = self.config.radius.resolve(N)?;
        Ok(AxisScales::new(&radius, self.config.use_image_spacing))
    }

    /// Run the filter on a 2D or 3D label image.
    ///
    /// The input is left untouched; the labels and the distance volume are
    /// fresh volumes with the geometry of the input.
    ///
    /// # Errors
    ///
    /// Returns an error for images that are not 2D or 3D, for empty axes,
    /// for an invalid radius and for a zero thread count. Nothing is
    /// allocated before the input is validated.
    pub fn apply<L: LabelType, const N: usize>(
        &self,
        src: &Volume<L, N>,
    ) -> Result<MorphologyOutput<L, N>, MorphologyError> {
        let scales = self.scales_for(src)?;
        if self.config.num_threads == 0 {
            return Err(MorphologyError::InvalidThreadCount(0));
        }

        let mut labels = src.clone();
        let mut distance = src.like(0.0f32);

        if scales.is_identity() {
            log::debug!("all radii are zero, returning the input labels");
            return Ok(MorphologyOutput { labels, distance });
        }

        log::debug!(
            "{:?} of {:?} labels, base sigma {}, {} threads",
            self.mode,
            src.shape(),
            scales.base_sigma(),
            self.config.num_threads
        );

        let pool = build_pool(self.config.num_threads)?;
        let shape = src.shape();
        let strides = src.strides();
        let spacing = src.spacing();
        let input = src.as_slice();

        let dist_buf = SharedBuffer::new(distance.as_slice_mut());
        let label_buf = SharedBuffer::new(labels.as_slice_mut());

        for axis in 0..N {
            if !scales.is_active(axis) {
                log::trace!("axis {} has zero radius, skipping", axis);
                continue;
            }

            let params = PassParams {
                axis,
                magnitude: scales.magnitude(axis, spacing[axis]),
                base_sigma: scales.base_sigma(),
                first_pass: scales.first_active_axis() == Some(axis),
                last_pass: scales.last_active_axis() == Some(axis),
            };
            let regions = split_region(shape, axis, self.config.num_threads);
            log::debug!(
                "axis {}: magnitude {}, {} regions of up to {} voxels",
                axis,
                params.magnitude,
                regions.len(),
                regions.first().map_or(0, |r| r.numel())
            );

            let now = std::time::Instant::now();
            // SAFETY: the regions are disjoint and each spans the whole scan
            // axis, so every scanline along `axis` belongs to one region only.
            for_each_region(pool.as_ref(), &regions, |region| match self.mode {
                MorphologyMode::Dilate => unsafe {
                    dilate_region(input, &dist_buf, &label_buf, strides, region, &params)
                },
                MorphologyMode::Erode => unsafe {
                    erode_region(input, &dist_buf, &label_buf, strides, region, &params)
                },
            });
            log::debug!("axis {} elapsed: {:?}", axis, now.elapsed());
        }

        Ok(MorphologyOutput { labels, distance })
    }
}

/// Dilate a label image, growing every region into the background.
///
/// Each background voxel within the radius of a region takes the label of
/// the nearest one.
pub fn label_set_dilate<L: LabelType, const N: usize>(
    src: &Volume<L, N>,
    config: &MorphologyConfig,
) -> Result<MorphologyOutput<L, N>, MorphologyError> {
    LabelSetFilter::dilate()
        .with_config(config.clone())
        .apply(src)
}

/// Erode a label image, shrinking every region.
///
/// Touching regions are eroded from their shared border, so they separate.
pub fn label_set_erode<L: LabelType, const N: usize>(
    src: &Volume<L, N>,
    config: &MorphologyConfig,
) -> Result<MorphologyOutput<L, N>, MorphologyError> {
    LabelSetFilter::erode()
        .with_config(config.clone())
        .apply(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_by_five() -> Result<Volume<u8, 2>, MorphologyError> {
        let row = [1u8, 1, 2, 1, 1];
        let data = row.iter().cycle().take(25).copied().collect();
        Ok(Volume::new([5, 5], data)?)
    }

    #[test]
    fn erode_separates_touching_columns() -> Result<(), MorphologyError> {
        let src = five_by_five()?;
        let out = LabelSetFilter::erode()
            .with_uniform_radius(1.0)
            .with_num_threads(1)
            .apply(&src)?;

        for r in 0..5 {
            for c in 0..5 {
                let expected = if c == 0 || c == 4 { 1 } else { 0 };
                assert_eq!(out.labels.get([r, c]), Some(&expected), "at ({r}, {c})");
            }
        }
        assert_eq!(out.distance.get([2, 0]), Some(&1.5));
        Ok(())
    }

    #[test]
    fn zero_radius_is_identity() -> Result<(), MorphologyError> {
        let src = five_by_five()?;
        for filter in [LabelSetFilter::dilate(), LabelSetFilter::erode()] {
            let out = filter.with_radius([0.0, 0.0]).apply(&src)?;
            assert_eq!(out.labels, src);
            assert!(out.distance.as_slice().iter().all(|&d| d == 0.0));
        }
        Ok(())
    }

    #[test]
    fn single_axis_dilation() -> Result<(), MorphologyError> {
        let mut src = Volume::<u16, 2>::from_shape_val([5, 5], 0);
        if let Some(v) = src.get_mut([2, 2]) {
            *v = 3;
        }
        let out = LabelSetFilter::dilate()
            .with_radius([0.0, 2.0])
            .with_num_threads(2)
            .apply(&src)?;

        // r = 2 in voxel units reaches k^2 < 6 along the rows only
        assert_eq!(&out.labels.as_slice()[10..15], &[3, 3, 3, 3, 3]);
        assert_eq!(out.labels.get([1, 2]), Some(&0));
        Ok(())
    }

    #[test]
    fn input_is_validated_first() -> Result<(), MorphologyError> {
        let src = Volume::<u8, 2>::from_shape_val([4, 0], 0);
        assert_eq!(
            LabelSetFilter::dilate().apply(&src),
            Err(MorphologyError::EmptyAxis(1))
        );

        let src = five_by_five()?;
        let res = LabelSetFilter::erode().with_num_threads(0).apply(&src);
        assert_eq!(res, Err(MorphologyError::InvalidThreadCount(0)));

        let res = LabelSetFilter::erode().with_radius(vec![1.0]).apply(&src);
        assert!(res.is_err_and(|e| e.is_invalid_input()));

        let line = Volume::<u8, 1>::from_shape_val([8], 1);
        assert_eq!(
            LabelSetFilter::dilate().apply(&line),
            Err(MorphologyError::UnsupportedDimension(1))
        );
        Ok(())
    }

    #[test]
    fn scales_follow_radius() -> Result<(), MorphologyError> {
        let src = Volume::<u8, 3>::from_shape_val([2, 3, 4], 1);
        let scales = LabelSetFilter::dilate()
            .with_radius([0.0, 2.0, 4.0])
            .scales_for(&src)?;
        assert_eq!(scales.first_active_axis(), Some(1));
        assert_eq!(scales.base_sigma(), 3.0);
        assert_eq!(scales.scale(2), 3.0);
        Ok(())
    }

    #[test]
    fn scales_ignore_thread_count() -> Result<(), MorphologyError> {
        let src = Volume::<u8, 2>::from_shape_val([3, 3], 1);
        let filter = LabelSetFilter::erode().with_num_threads(0);
        let scales = filter.scales_for(&src)?;
        assert_eq!(scales.base_sigma(), 1.5);
        assert_eq!(
            filter.apply(&src),
            Err(MorphologyError::InvalidThreadCount(0))
        );

        let empty = Volume::<u8, 2>::from_shape_val([0, 3], 0);
        assert_eq!(
            filter.scales_for(&empty),
            Err(MorphologyError::EmptyAxis(0))
        );
        Ok(())
    }
}
