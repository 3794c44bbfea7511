//! Result grid for percolation sweeps.
//!
//! A [`ReliabilitySurface`] is the row-major grid a sweep produces: one row
//! per forced-removal step, one column per uniform-reliability step, each
//! cell the mean all-terminal reliability of that parameter pair.

use std::slice::ChunksExact;

use thiserror::Error;

/// Mean all-terminal reliability over a (removal fraction, reliability)
/// grid.
///
/// # Examples
/// ```
/// use relnet_core::ReliabilitySurface;
///
/// let surface = ReliabilitySurface::try_from_values(
///     vec![0.1, 0.2, 0.3, 0.4],
///     2,
///     0.5,
///     0.5,
/// )
/// .expect("values fill the grid");
/// assert_eq!(surface.removal_steps(), 2);
/// assert_eq!(surface.get(1, 0), Some(0.3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilitySurface {
    values: Vec<f64>,
    reliability_steps: usize,
    removal_step: f64,
    reliability_step: f64,
}

/// Error returned when raw values cannot fill a rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SurfaceShapeError {
    /// A surface needs at least one reliability column.
    #[error("surface must have at least one reliability column")]
    ZeroColumns,
    /// The value vector does not divide into whole rows.
    #[error("{len} values do not fill rows of {columns} columns")]
    RaggedValues {
        /// Number of raw values supplied.
        len: usize,
        /// Configured column count.
        columns: usize,
    },
}

impl ReliabilitySurface {
    /// Builds a surface from row-major values.
    ///
    /// `reliability_steps` is the column count; `removal_step` and
    /// `reliability_step` are the per-index increments of the two axes.
    ///
    /// # Errors
    /// Returns [`SurfaceShapeError::ZeroColumns`] for an empty reliability
    /// axis and [`SurfaceShapeError::RaggedValues`] when the values do not
    /// divide into whole rows.
    pub fn try_from_values(
        values: Vec<f64>,
        reliability_steps: usize,
        removal_step: f64,
        reliability_step: f64,
    ) -> Result<Self, SurfaceShapeError> {
        if reliability_steps == 0 {
            return Err(SurfaceShapeError::ZeroColumns);
        }
        if values.len() % reliability_steps != 0 {
            return Err(SurfaceShapeError::RaggedValues {
                len: values.len(),
                columns: reliability_steps,
            });
        }
        Ok(Self {
            values,
            reliability_steps,
            removal_step,
            reliability_step,
        })
    }

    /// Builds a surface from row-major values.
    ///
    /// # Panics
    /// Panics when the values cannot fill a rectangular grid with at least
    /// one column; use [`Self::try_from_values`] to handle malformed shapes.
    #[must_use]
    pub fn from_values(
        values: Vec<f64>,
        reliability_steps: usize,
        removal_step: f64,
        reliability_step: f64,
    ) -> Self {
        Self::try_from_values(values, reliability_steps, removal_step, reliability_step)
            .expect("surface values must fill a rectangular grid")
    }

    /// Returns the number of removal-fraction rows.
    #[must_use]
    pub fn removal_steps(&self) -> usize {
        self.values.len() / self.reliability_steps
    }

    /// Returns the number of reliability columns.
    #[rustfmt::skip]
    #[must_use]
    pub fn reliability_steps(&self) -> usize { self.reliability_steps }

    /// Returns the increment between removal-fraction rows.
    #[rustfmt::skip]
    #[must_use]
    pub fn removal_step(&self) -> f64 { self.removal_step }

    /// Returns the increment between reliability columns.
    #[rustfmt::skip]
    #[must_use]
    pub fn reliability_step(&self) -> f64 { self.reliability_step }

    /// Returns the forced-removal fraction for a row index.
    #[must_use]
    pub fn removal_fraction(&self, row: usize) -> f64 {
        index_value(row, self.removal_step)
    }

    /// Returns the uniform reliability for a column index.
    #[must_use]
    pub fn reliability(&self, column: usize) -> f64 {
        index_value(column, self.reliability_step)
    }

    /// Returns the cell for a (row, column) pair when it is on the grid.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if column >= self.reliability_steps {
            return None;
        }
        self.values
            .get(row * self.reliability_steps + column)
            .copied()
    }

    /// Iterates the rows in removal-fraction order.
    pub fn rows(&self) -> ChunksExact<'_, f64> {
        self.values.chunks_exact(self.reliability_steps)
    }

    /// Returns the raw row-major values.
    #[rustfmt::skip]
    #[must_use]
    pub fn values(&self) -> &[f64] { &self.values }
}

/// Computes an axis value by multiplying the index by the step, so repeated
/// addition cannot accumulate rounding error across a long axis.
#[expect(
    clippy::cast_precision_loss,
    reason = "grid indices stay far below 2^53"
)]
pub(crate) fn index_value(index: usize, step: f64) -> f64 {
    index as f64 * step
}
