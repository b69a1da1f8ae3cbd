//! Escape-time Mandelbrot generator.
//!
//! A [`Mandelbrot`] computes, for every pixel of a grid laid over a region
//! of the complex plane, the iteration at which the orbit of that point
//! escapes, then paints the result and writes it out as a PNG.
//!
//! ```no_run
//! let mut m = mandelgen::Mandelbrot::new();
//! m.generate(900, 600, 100)?;
//! m.save("mandelbrot.png")?;
//! # Ok::<(), mandelgen::Error>(())
//! ```

use std::path::Path;
use std::time::Instant;

use log::{info, warn};

use crate::coord::Dimensions;
use crate::field::EscapeField;
use crate::solver::{make_solver, MbState, Solver};
use crate::threads::{Join, Split};

pub mod bench;
pub mod cancel;
pub mod complex;
pub mod config;
pub mod coord;
pub mod encoder;
pub mod error;
pub mod ffi;
pub mod field;
pub mod painter;
pub mod solver;
pub mod threads;

pub use cancel::CancelToken;
pub use config::GeneratorConfig;
pub use coord::Viewport;
pub use error::{Error, Result};
pub use field::Escape;

pub mod defaults {
    use crate::solver::{VecSolver, VecState};
    pub type Solver = VecSolver;
    pub type State = VecState;
}

/// Owns the most recently generated field. Each `generate` replaces it;
/// `save` paints and writes it.
pub struct Mandelbrot<T = defaults::State> {
    solver: Box<dyn Solver<T>>,
    config: GeneratorConfig,
    field: Option<EscapeField>,
}

impl Mandelbrot<defaults::State> {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self::with_solver::<defaults::Solver>(config)
    }
}

impl Default for Mandelbrot<defaults::State> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mandelbrot<T>
where
    T: MbState + Split + Join + Send + 'static,
{
    pub fn with_solver<S>(config: GeneratorConfig) -> Self
    where
        S: Solver<T> + Default + Clone + Send + 'static,
    {
        Self {
            solver: make_solver::<S, T>(config.threads),
            config,
            field: None,
        }
    }

    /// Computes a `width` x `height` field with the given iteration budget
    /// and stores it, replacing any earlier field.
    pub fn generate(&mut self, width: usize, height: usize, max_iterations: usize) -> Result<()> {
        self.generate_with(width, height, max_iterations, &CancelToken::new())
    }

    /// As `generate`, stopping early with `Error::Cancelled` once `cancel`
    /// fires. On any error the previously stored field is kept.
    pub fn generate_with(
        &mut self,
        width: usize,
        height: usize,
        max_iterations: usize,
        cancel: &CancelToken,
    ) -> Result<()> {
        let dims = Dimensions::new(width, height)?;
        let max_iterations =
            u32::try_from(max_iterations).map_err(|_| Error::InvalidIterations(max_iterations))?;

        let start = Instant::now();
        let initial = T::initialize(dims, max_iterations, &self.config.viewport, cancel.clone())?;
        let field = match self.solver.solve(initial) {
            Ok(solved) => solved.into_field()?,
            Err(Error::Cancelled) => {
                warn!("generation of {}x{} cancelled", width, height);
                return Err(Error::Cancelled);
            }
            Err(e) => return Err(e),
        };
        info!(
            "generated {}x{} field, {} iterations, in {:?}",
            width,
            height,
            max_iterations,
            start.elapsed()
        );

        self.field = Some(field);
        Ok(())
    }

    /// Paints the stored field and writes it to `path` as a PNG.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let field = self.field.as_ref().ok_or(Error::NoData)?;
        let painter = self.config.painter();
        encoder::encode_and_save(field, painter.as_ref(), path.as_ref())
    }

    pub fn field(&self) -> Option<&EscapeField> {
        self.field.as_ref()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Drops the stored field, as if nothing had been generated.
    pub fn clear(&mut self) {
        self.field = None;
    }
}
