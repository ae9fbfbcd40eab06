use crate::error::{CoreError, CoreResult};

/// Fixed-step sampling geometry between a source image and its character grid.
///
/// `w_step = image_width / output_width`, `h_step = image_height / output_height`
/// (floor). `columns`/`rows` are the effective counts the sampler visits,
/// i.e. `ceil(image / step)`, which can exceed the requested output size when
/// the division is not exact.
///
/// # Example
/// ```
/// use ap_core::grid::SamplingGrid;
/// let grid = SamplingGrid::new(10, 7, 3, 2).unwrap();
/// assert_eq!((grid.w_step, grid.h_step), (3, 3));
/// assert_eq!((grid.columns, grid.rows), (4, 3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingGrid {
    /// Horizontal step in source pixels.
    pub w_step: u32,
    /// Vertical step in source pixels.
    pub h_step: u32,
    /// Sampled cells per row.
    pub columns: u32,
    /// Sampled rows.
    pub rows: u32,
}

impl SamplingGrid {
    /// Derive the grid, validating that both steps are at least 1.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if an output side is zero or
    /// larger than the matching image side.
    pub fn new(
        image_width: u32,
        image_height: u32,
        output_width: u32,
        output_height: u32,
    ) -> CoreResult<Self> {
        if output_width == 0 || output_height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: output_width,
                height: output_height,
            });
        }
        let w_step = image_width / output_width;
        let h_step = image_height / output_height;
        if w_step == 0 || h_step == 0 {
            return Err(CoreError::InvalidDimensions {
                width: output_width,
                height: output_height,
            });
        }
        Ok(Self {
            w_step,
            h_step,
            columns: image_width.div_ceil(w_step),
            rows: image_height.div_ceil(h_step),
        })
    }

    /// Total sampled cells.
    #[must_use]
    pub fn cells(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_division() {
        let grid = SamplingGrid::new(4, 4, 2, 2).unwrap();
        assert_eq!(
            grid,
            SamplingGrid {
                w_step: 2,
                h_step: 2,
                columns: 2,
                rows: 2
            }
        );
        assert_eq!(grid.cells(), 4);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(matches!(
            SamplingGrid::new(10, 10, 11, 5),
            Err(CoreError::InvalidDimensions { width: 11, height: 5 })
        ));
        assert!(SamplingGrid::new(10, 10, 0, 5).is_err());
        assert!(SamplingGrid::new(10, 10, 5, 0).is_err());
    }

    #[test]
    fn effective_size_matches_loop_count() {
        for (iw, ih, ow, oh) in [(13, 9, 4, 2), (100, 37, 7, 5), (5, 5, 5, 5), (640, 480, 64, 24)] {
            let grid = SamplingGrid::new(iw, ih, ow, oh).unwrap();
            let cols = (0..iw).step_by(grid.w_step as usize).count() as u32;
            let rows = (0..ih).step_by(grid.h_step as usize).count() as u32;
            assert_eq!((grid.columns, grid.rows), (cols, rows));
            assert!(grid.columns >= ow && grid.rows >= oh);
        }
    }
}
