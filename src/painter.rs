use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage};

use crate::error::{Error, Result};
use crate::field::{try_alloc, Escape, EscapeField};

/// Color for pixels whose orbit never escaped.
pub const BOUNDED_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Maps a fraction in `[0, 1)` to a color. Implementations must never
/// return `BOUNDED_COLOR`.
pub trait ColorScale {
    fn color(&self, frac: f64) -> Rgb<u8>;
}

/// White for the fastest escapes, fading to dark grey near the budget.
#[derive(Copy, Clone, Debug, Default)]
pub struct Greyscale;

impl ColorScale for Greyscale {
    fn color(&self, frac: f64) -> Rgb<u8> {
        let frac = frac.clamp(0.0, 1.0);
        let v = 255 - (frac * 207.0).round() as u8;
        Rgb([v, v, v])
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Rainbow;

fn rainbow_color(n: usize) -> [u8; 3] {
    match n {
        0 => [0xbe, 0x0a, 0xff],
        1 => [0x58, 0x0a, 0xff],
        2 => [0x14, 0x7d, 0xf5],
        3 => [0x0a, 0xef, 0xff],
        4 => [0x0a, 0xff, 0x99],
        5 => [0xa1, 0xff, 0x0a],
        6 => [0xde, 0xff, 0x0a],
        7 => [0xff, 0xd3, 0x00],
        8 => [0xff, 0x87, 0x00],
        _ => [0xff, 0x00, 0x00],
    }
}

fn mix(a: u8, b: u8, frac: f64) -> u8 {
    let m = a as f64 * (1.0 - frac) + b as f64 * frac;
    m.round() as u8
}

impl ColorScale for Rainbow {
    fn color(&self, frac: f64) -> Rgb<u8> {
        let scaled = 9.0 * frac.clamp(0.0, 1.0);
        let n = scaled.floor() as usize;
        let frac = scaled - n as f64;
        let rgb1 = rainbow_color(n);
        let rgb2 = rainbow_color(n + 1);
        Rgb([
            mix(rgb1[0], rgb2[0], frac),
            mix(rgb1[1], rgb2[1], frac),
            mix(rgb1[2], rgb2[2], frac),
        ])
    }
}

/// Fully saturated hue sweep, red through the spectrum and back towards red.
#[derive(Copy, Clone, Debug, Default)]
pub struct Hsv;

/// RGB for `hue` in degrees at full saturation and value. One channel is
/// always 255, so the result is never black.
fn hue_to_rgb(hue: f64) -> Rgb<u8> {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let channel = |v: f64| (v * 255.0).round() as u8;
    Rgb([channel(r), channel(g), channel(b)])
}

impl ColorScale for Hsv {
    fn color(&self, frac: f64) -> Rgb<u8> {
        hue_to_rgb(360.0 * frac.clamp(0.0, 1.0))
    }
}

/// How an escape iteration is turned into a fraction of the budget.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Ramp {
    Linear,
    /// `ln(1 + i) / ln(1 + max)`; spreads the many fast escapes apart.
    #[default]
    Logarithmic,
}

impl Ramp {
    pub fn frac(&self, i_value: u32, max_iterations: u32) -> f64 {
        if max_iterations == 0 {
            return 0.0;
        }
        let i = i_value as f64;
        let max = max_iterations as f64;
        match self {
            Ramp::Linear => i / max,
            Ramp::Logarithmic => i.ln_1p() / max.ln_1p(),
        }
    }
}

pub trait Painter {
    fn escape_color(&self, escape: Escape, max_iterations: u32) -> Rgb<u8>;

    fn paint(&self, field: &EscapeField) -> Result<RgbImage> {
        let width: u32 = field.width().try_into().map_err(|_| Error::InvalidDimensions {
            width: field.width(),
            height: field.height(),
        })?;
        let height: u32 = field.height().try_into().map_err(|_| Error::InvalidDimensions {
            width: field.width(),
            height: field.height(),
        })?;

        let mut raw = try_alloc(field.len() * 3)?;
        let max = field.max_iterations();
        // `values` is row-major, matching the image's top-left origin.
        for &i_value in field.values().iter() {
            let Rgb(rgb) = self.escape_color(field.classify(i_value), max);
            raw.extend_from_slice(&rgb);
        }
        RgbImage::from_raw(width, height, raw).ok_or(Error::Allocation {
            pixels: field.len(),
        })
    }
}

pub struct IValuePainter<C> {
    scale: C,
    ramp: Ramp,
}

impl<C: ColorScale> IValuePainter<C> {
    pub fn new(scale: C, ramp: Ramp) -> Self {
        Self { scale, ramp }
    }
}

impl<C: ColorScale> Painter for IValuePainter<C> {
    fn escape_color(&self, escape: Escape, max_iterations: u32) -> Rgb<u8> {
        match escape {
            Escape::Bounded => BOUNDED_COLOR,
            Escape::Escaped(i) => self.scale.color(self.ramp.frac(i, max_iterations)),
        }
    }
}

/// Named color scales selectable at run time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Greyscale,
    Rainbow,
    Hsv,
}

impl Palette {
    pub fn painter(self, ramp: Ramp) -> Box<dyn Painter + Send + Sync> {
        match self {
            Palette::Greyscale => Box::new(IValuePainter::new(Greyscale, ramp)),
            Palette::Rainbow => Box::new(IValuePainter::new(Rainbow, ramp)),
            Palette::Hsv => Box::new(IValuePainter::new(Hsv, ramp)),
        }
    }
}

impl FromStr for Palette {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "greyscale" | "grayscale" | "grey" | "gray" => Ok(Palette::Greyscale),
            "rainbow" => Ok(Palette::Rainbow),
            "hsv" | "hue" => Ok(Palette::Hsv),
            _ => Err(Error::UnknownPalette(s.to_string())),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Palette::Greyscale => write!(f, "greyscale"),
            Palette::Rainbow => write!(f, "rainbow"),
            Palette::Hsv => write!(f, "hsv"),
        }
    }
}
