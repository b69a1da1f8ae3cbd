use num::complex::Complex;

pub type C<T> = Complex<T>;

/// Squared escape radius. Orbits leaving the radius-2 disc diverge.
pub const BAILOUT: f64 = 4.0;

pub fn c(re: f64, im: f64) -> C<f64> {
    Complex::new(re, im)
}

pub fn zero() -> C<f64> {
    c(0.0, 0.0)
}
