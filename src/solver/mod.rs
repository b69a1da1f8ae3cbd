//! Escape-time solvers.
//!
//! A solver takes an unsolved state covering a band of grid rows and fills
//! in the iteration count of every pixel. States split into row bands and
//! rejoin, so any solver can run on a [`WorkerPool`]; every solver must
//! produce the same field as [`escape_time`] applied pixel by pixel.

use crate::cancel::CancelToken;
use crate::complex::{zero, BAILOUT, C};
use crate::coord::{Dimensions, Viewport};
use crate::error::Result;
use crate::field::EscapeField;
use crate::threads::{Call, Join, Split, WorkerPool};

pub mod array;
pub mod vec;

pub use array::{ArraySolver, ArrayState};
pub use vec::{VecSolver, VecState};

pub trait Solver<T> {
    fn solve(&self, state: T) -> Result<T>;

    fn threaded(self, n: usize) -> WorkerPool<T, T>
    where
        Self: Sized + Clone + Send + 'static,
        T: Send + 'static,
    {
        WorkerPool::with(n, || {
            let solver = self.clone();
            move |state| solver.solve(state)
        })
    }
}

impl<T> Solver<T> for WorkerPool<T, T>
where
    T: MbState + Split + Join,
{
    fn solve(&self, state: T) -> Result<T> {
        self.call(state)
    }
}

pub trait MbState: Sized {
    /// An unsolved state for the whole grid.
    fn initialize(
        dims: Dimensions,
        max_iterations: u32,
        viewport: &Viewport,
        cancel: CancelToken,
    ) -> Result<Self>;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Converts a solved state into a field. Fails with `NoData` if the
    /// state was never solved.
    fn into_field(self) -> Result<EscapeField>;
}

/// Iteration at which the orbit of `c` leaves the disc `|z| <= 2`, or
/// `max_iterations` if it never does within the budget.
pub fn escape_time(c: C<f64>, max_iterations: u32) -> u32 {
    let mut z = zero();
    for n in 0..max_iterations {
        if z.norm_sqr() > BAILOUT {
            return n;
        }
        z = z * z + c;
    }
    max_iterations
}

/// A single-threaded solver for `threads <= 1`, otherwise a worker pool of
/// `threads` solvers.
pub fn make_solver<S, T>(threads: usize) -> Box<dyn Solver<T>>
where
    T: MbState + Split + Join + Send + 'static,
    S: Solver<T> + Default + Clone + Send + 'static,
{
    if threads <= 1 {
        Box::<S>::default()
    } else {
        Box::new(S::default().threaded(threads))
    }
}
