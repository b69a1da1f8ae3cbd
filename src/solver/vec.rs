use log::trace;
use ndarray::Array2;

use crate::cancel::CancelToken;
use crate::coord::{Dimensions, Viewport};
use crate::error::{Error, Result};
use crate::field::{try_alloc, EscapeField};
use crate::solver::{escape_time, MbState, Solver};
use crate::threads::{Join, RangeSplitter, Split};

/// A band of grid rows. Pixel values are filled in by `VecSolver`; an
/// unsolved band carries only the geometry needed to compute them.
#[derive(Clone, Debug)]
pub struct VecState {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) first_row: usize,
    pub(crate) grid_height: usize,
    pub(crate) max_iterations: u32,
    pub(crate) viewport: Viewport,
    pub(crate) cancel: CancelToken,
    pub(crate) values: Vec<u32>,
}

impl VecState {
    pub fn is_solved(&self) -> bool {
        self.values.len() == self.width * self.height
    }
}

impl MbState for VecState {
    fn initialize(
        dims: Dimensions,
        max_iterations: u32,
        viewport: &Viewport,
        cancel: CancelToken,
    ) -> Result<Self> {
        Ok(Self {
            width: dims.width(),
            height: dims.height(),
            first_row: 0,
            grid_height: dims.height(),
            max_iterations,
            viewport: *viewport,
            cancel,
            values: Vec::new(),
        })
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn into_field(self) -> Result<EscapeField> {
        if !self.is_solved() {
            return Err(Error::NoData);
        }
        let values = Array2::from_shape_vec((self.height, self.width), self.values)?;
        Ok(EscapeField::new(values, self.max_iterations, self.viewport))
    }
}

impl Split for VecState {
    fn split_to_vec(self, n: usize) -> Vec<Self> {
        let solved = self.is_solved();
        RangeSplitter::split(0, self.height, n)
            .into_iter()
            .map(|(m, k)| Self {
                height: k - m,
                first_row: self.first_row + m,
                values: if solved {
                    self.values[m * self.width..k * self.width].to_vec()
                } else {
                    Vec::new()
                },
                ..self.clone_geometry()
            })
            .collect()
    }
}

impl VecState {
    fn clone_geometry(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            first_row: self.first_row,
            grid_height: self.grid_height,
            max_iterations: self.max_iterations,
            viewport: self.viewport,
            cancel: self.cancel.clone(),
            values: Vec::new(),
        }
    }
}

impl Join for VecState {
    fn join_vec(parts: Vec<Self>) -> Result<Self> {
        let first = match parts.first() {
            Some(first) => first.clone_geometry(),
            None => return Err(Error::NoData),
        };

        let mut height = 0;
        let mut next_row = first.first_row;
        for part in &parts {
            if part.width != first.width {
                return Err(Error::BandMismatch("different width"));
            }
            if part.first_row != next_row {
                return Err(Error::BandMismatch("bands out of order"));
            }
            next_row += part.height;
            height += part.height;
        }

        let mut values = try_alloc(first.width * height)?;
        for part in parts {
            values.extend(part.values);
        }
        Ok(Self {
            height,
            values,
            ..first
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct VecSolver;

impl Solver<VecState> for VecSolver {
    fn solve(&self, mut state: VecState) -> Result<VecState> {
        let mut values = try_alloc(state.width * state.height)?;
        let rows = state.first_row..state.first_row + state.height;
        trace!("solving rows {:?}", rows);
        for y in rows {
            if state.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            for x in 0..state.width {
                let c = state.viewport.point(x, y, state.width, state.grid_height);
                values.push(escape_time(c, state.max_iterations));
            }
        }
        state.values = values;
        Ok(state)
    }
}
