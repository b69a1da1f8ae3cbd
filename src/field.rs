//! The computed escape-time field.
//!
//! A field is a row-major grid of iteration counts. A cell holding a value
//! below the iteration budget is the iteration at which that pixel's orbit
//! left the escape radius; a cell holding the budget itself is the
//! "did not escape" sentinel.

use ndarray::Array2;

use crate::coord::Viewport;
use crate::error::{Error, Result};

/// Outcome for a single pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Escape {
    /// The orbit left the escape radius at this iteration.
    Escaped(u32),
    /// The orbit stayed bounded for the whole budget.
    Bounded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EscapeField {
    values: Array2<u32>,
    max_iterations: u32,
    viewport: Viewport,
}

impl EscapeField {
    pub fn new(values: Array2<u32>, max_iterations: u32, viewport: Viewport) -> Self {
        Self {
            values,
            max_iterations,
            viewport,
        }
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Raw cell values, indexed `[[y, x]]`.
    pub fn values(&self) -> &Array2<u32> {
        &self.values
    }

    pub fn i_value(&self, x: usize, y: usize) -> u32 {
        self.values[[y, x]]
    }

    pub fn escape(&self, x: usize, y: usize) -> Escape {
        self.classify(self.i_value(x, y))
    }

    pub fn classify(&self, i_value: u32) -> Escape {
        if i_value >= self.max_iterations {
            Escape::Bounded
        } else {
            Escape::Escaped(i_value)
        }
    }
}

/// Allocates an empty vector for `len` items, reporting failure instead of
/// aborting.
pub(crate) fn try_alloc<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { pixels: len })?;
    Ok(v)
}

pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut v = try_alloc(len)?;
    v.resize(len, value);
    Ok(v)
}
