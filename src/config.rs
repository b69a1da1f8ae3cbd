use crate::coord::Viewport;
use crate::painter::{Painter, Palette, Ramp};

/// Settings fixed for the life of a generator.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub viewport: Viewport,
    /// Worker threads; 0 or 1 solves on the calling thread.
    pub threads: usize,
    pub palette: Palette,
    pub ramp: Ramp,
}

impl GeneratorConfig {
    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn ramp(mut self, ramp: Ramp) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn painter(&self) -> Box<dyn Painter + Send + Sync> {
        self.palette.painter(self.ramp)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::CLASSIC,
            threads: num_cpus::get_physical(),
            palette: Palette::default(),
            ramp: Ramp::default(),
        }
    }
}
