use ndarray::{concatenate, s, Array2, ArrayView2, Axis, Zip};

use crate::cancel::CancelToken;
use crate::complex::*;
use crate::coord::{Dimensions, Viewport};
use crate::error::{Error, Result};
use crate::field::{try_alloc, try_filled, EscapeField};
use crate::solver::{MbState, Solver};
use crate::threads::{Join, RangeSplitter, Split};

/// Whole-band arrays of c, z and iteration values, advanced one iteration
/// at a time across every cell. Holds 36 bytes per pixel, against 4 for
/// `VecState`.
#[derive(Clone, Debug)]
pub struct ArrayState {
    pub(crate) iteration: u32,
    pub(crate) max_iterations: u32,
    pub(crate) viewport: Viewport,
    pub(crate) cancel: CancelToken,
    pub(crate) ca: Array2<C<f64>>,
    pub(crate) za: Array2<C<f64>>,
    pub(crate) ia: Array2<u32>,
}

impl MbState for ArrayState {
    fn initialize(
        dims: Dimensions,
        max_iterations: u32,
        viewport: &Viewport,
        cancel: CancelToken,
    ) -> Result<Self> {
        let (width, height) = (dims.width(), dims.height());
        let shape = (height, width);

        let mut cs = try_alloc(dims.len())?;
        for y in 0..height {
            for x in 0..width {
                cs.push(viewport.point(x, y, width, height));
            }
        }
        let ca = Array2::from_shape_vec(shape, cs)?;
        let za = Array2::from_shape_vec(shape, try_filled(dims.len(), zero())?)?;
        let ia = Array2::from_shape_vec(shape, try_filled(dims.len(), max_iterations)?)?;

        Ok(Self {
            iteration: 0,
            max_iterations,
            viewport: *viewport,
            cancel,
            ca,
            za,
            ia,
        })
    }

    fn width(&self) -> usize {
        self.ia.ncols()
    }

    fn height(&self) -> usize {
        self.ia.nrows()
    }

    fn into_field(self) -> Result<EscapeField> {
        if self.iteration < self.max_iterations {
            return Err(Error::NoData);
        }
        Ok(EscapeField::new(self.ia, self.max_iterations, self.viewport))
    }
}

impl Split for ArrayState {
    fn split_to_vec(self, n: usize) -> Vec<Self> {
        RangeSplitter::split(0, self.height(), n)
            .into_iter()
            .map(|(m, k)| {
                let slice = s![m..k, ..];
                Self {
                    iteration: self.iteration,
                    max_iterations: self.max_iterations,
                    viewport: self.viewport,
                    cancel: self.cancel.clone(),
                    ca: self.ca.slice(slice).to_owned(),
                    za: self.za.slice(slice).to_owned(),
                    ia: self.ia.slice(slice).to_owned(),
                }
            })
            .collect()
    }
}

impl Join for ArrayState {
    fn join_vec(parts: Vec<Self>) -> Result<Self> {
        let first = parts.first().ok_or(Error::NoData)?;
        for part in &parts {
            if part.width() != first.width() {
                return Err(Error::BandMismatch("different width"));
            }
            if part.iteration != first.iteration {
                return Err(Error::BandMismatch("different iteration"));
            }
        }

        let cas: Vec<ArrayView2<C<f64>>> = parts.iter().map(|p| p.ca.view()).collect();
        let zas: Vec<ArrayView2<C<f64>>> = parts.iter().map(|p| p.za.view()).collect();
        let ias: Vec<ArrayView2<u32>> = parts.iter().map(|p| p.ia.view()).collect();

        Ok(Self {
            iteration: first.iteration,
            max_iterations: first.max_iterations,
            viewport: first.viewport,
            cancel: first.cancel.clone(),
            ca: concatenate(Axis(0), &cas)?,
            za: concatenate(Axis(0), &zas)?,
            ia: concatenate(Axis(0), &ias)?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct ArraySolver;

impl ArraySolver {
    fn iterate(&self, state: &mut ArrayState) {
        let n = state.iteration;
        let max = state.max_iterations;

        Zip::from(&mut state.ia)
            .and(&mut state.za)
            .and(&state.ca)
            .for_each(|iv, zv, &cv| {
                if *iv == max {
                    if zv.norm_sqr() > BAILOUT {
                        *iv = n;
                    } else {
                        *zv = *zv * *zv + cv;
                    }
                }
            });

        state.iteration += 1;
    }
}

impl Solver<ArrayState> for ArraySolver {
    fn solve(&self, mut state: ArrayState) -> Result<ArrayState> {
        while state.iteration < state.max_iterations {
            if state.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.iterate(&mut state);
        }
        Ok(state)
    }
}
