use std::path::PathBuf;
use std::process;
use std::time::Duration;

use log::info;
use structopt::StructOpt;

use mandelgen::painter::{Palette, Ramp};
use mandelgen::{CancelToken, GeneratorConfig, Mandelbrot, Viewport};

#[derive(Debug, StructOpt)]
#[structopt(name = "mandelgen", about = "Render the Mandelbrot set to a PNG image")]
struct Opt {
    /// Image width in pixels
    #[structopt(short, long, default_value = "9000")]
    width: usize,

    /// Image height in pixels
    #[structopt(short = "H", long, default_value = "6000")]
    height: usize,

    /// Iteration budget per pixel
    #[structopt(short, long, default_value = "100")]
    iterations: usize,

    /// Output PNG file
    #[structopt(short, long, default_value = "mandelbrot.png", parse(from_os_str))]
    output: PathBuf,

    /// Worker threads [default: physical cores]
    #[structopt(short, long)]
    threads: Option<usize>,

    /// Color palette: greyscale, rainbow or hsv
    #[structopt(short, long, default_value = "greyscale")]
    palette: Palette,

    /// Use a linear instead of a logarithmic color ramp
    #[structopt(long)]
    linear: bool,

    /// Region of the complex plane as min_re,max_re,min_im,max_im
    #[structopt(long, allow_hyphen_values = true)]
    viewport: Option<Viewport>,

    /// Give up after this many seconds
    #[structopt(long)]
    timeout: Option<u64>,
}

impl Opt {
    fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::default()
            .palette(self.palette)
            .ramp(if self.linear {
                Ramp::Linear
            } else {
                Ramp::Logarithmic
            });
        if let Some(threads) = self.threads {
            config = config.threads(threads);
        }
        if let Some(viewport) = self.viewport {
            config = config.viewport(viewport);
        }
        config
    }

    fn cancel_token(&self) -> CancelToken {
        match self.timeout {
            Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
            None => CancelToken::new(),
        }
    }
}

fn run(opt: &Opt) -> mandelgen::Result<()> {
    let config = opt.config();
    info!(
        "{}x{}, {} iterations, viewport {}, {} threads",
        opt.width, opt.height, opt.iterations, config.viewport, config.threads
    );

    let mut mandelbrot = Mandelbrot::with_config(config);
    mandelbrot.generate_with(opt.width, opt.height, opt.iterations, &opt.cancel_token())?;
    mandelbrot.save(&opt.output)
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();

    if let Err(e) = run(&opt) {
        eprintln!("mandelgen: {}", e);
        process::exit(1);
    }
}
