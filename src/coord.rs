use std::fmt;
use std::str::FromStr;

use num::{Float, Num, NumCast};

use crate::complex::*;
use crate::error::{Error, Result};

/// Largest accepted width or height.
pub const MAX_SIDE: usize = 65_535;
/// Largest accepted pixel count (2^28).
pub const MAX_PIXELS: usize = 1 << 28;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Axis<T> {
    pub min: T,
    pub max: T,
}

impl<T> Axis<T>
where
    T: Num + Copy,
{
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn length(&self) -> T {
        self.max - self.min
    }

    /// Center of cell `n` when the axis is cut into `cells` equal cells.
    pub fn sample(&self, n: usize, cells: usize) -> T
    where
        T: Float,
    {
        let n = <T as NumCast>::from(n).unwrap_or_else(T::zero);
        let cells = <T as NumCast>::from(cells).unwrap_or_else(T::one);
        let half = T::one() / (T::one() + T::one());
        self.min + (n + half) / cells * self.length()
    }
}

impl<T> Axis<T>
where
    T: Float,
{
    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

/// Rectangle of the complex plane mapped onto the pixel grid. `x` is the
/// real axis, `y` the imaginary one; pixel row 0 samples `y.min`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub x: Axis<f64>,
    pub y: Axis<f64>,
}

impl Viewport {
    /// The classic full-set view, [-2.5, 1] x [-1, 1].
    pub const CLASSIC: Viewport = Viewport {
        x: Axis::new(-2.5, 1.0),
        y: Axis::new(-1.0, 1.0),
    };

    pub fn new(x: Axis<f64>, y: Axis<f64>) -> Result<Self> {
        let viewport = Self { x, y };
        if !x.is_valid() {
            return Err(Error::InvalidViewport(format!(
                "real axis [{}, {}]",
                x.min, x.max
            )));
        }
        if !y.is_valid() {
            return Err(Error::InvalidViewport(format!(
                "imaginary axis [{}, {}]",
                y.min, y.max
            )));
        }
        Ok(viewport)
    }

    pub fn from_nums(min_re: f64, max_re: f64, min_im: f64, max_im: f64) -> Result<Self> {
        Self::new(Axis::new(min_re, max_re), Axis::new(min_im, max_im))
    }

    /// The point sampled by pixel (`px`, `py`) on a `width` x `height` grid.
    pub fn point(&self, px: usize, py: usize, width: usize, height: usize) -> C<f64> {
        c(self.x.sample(px, width), self.y.sample(py, height))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::CLASSIC
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.x.min, self.x.max, self.y.min, self.y.max
        )
    }
}

/// Parses `min_re,max_re,min_im,max_im`.
impl FromStr for Viewport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bounds = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| Error::InvalidViewport(format!("'{}': {}", s, e)))?;
        match bounds[..] {
            [min_re, max_re, min_im, max_im] => Self::from_nums(min_re, max_re, min_im, max_im),
            _ => Err(Error::InvalidViewport(format!(
                "'{}': expected four comma-separated bounds",
                s
            ))),
        }
    }
}

/// Validated grid size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dimensions {
    width: usize,
    height: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let in_range = |side: usize| (1..=MAX_SIDE).contains(&side);
        if !in_range(width) || !in_range(height) || width * height > MAX_PIXELS {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }
}
