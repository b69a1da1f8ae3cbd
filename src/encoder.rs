//! PNG output.
//!
//! Images are written to a hidden sibling file and renamed into place, so a
//! failed save never leaves a truncated image at the target path.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError, RgbImage};
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::field::EscapeField;
use crate::painter::Painter;

pub fn encode_and_save(field: &EscapeField, painter: &dyn Painter, path: &Path) -> Result<()> {
    let img = painter.paint(field)?;
    save_png(&img, path)?;
    info!(
        "saved {}x{} image to {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}

pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    let partial = partial_path(path)?;
    debug!("writing {}", partial.display());

    let result = write_png(img, &partial, path).and_then(|()| {
        fs::rename(&partial, path).map_err(|source| write_error(path, source))
    });
    if result.is_err() {
        discard(&partial);
    }
    result
}

fn write_png(img: &RgbImage, partial: &Path, path: &Path) -> Result<()> {
    let file = File::create(partial).map_err(|source| write_error(path, source))?;
    let mut writer = BufWriter::new(file);

    PngEncoder::new(&mut writer)
        .write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)
        .map_err(|source| match source {
            ImageError::IoError(source) => write_error(path, source),
            source => Error::Encode {
                path: path.to_path_buf(),
                source,
            },
        })?;

    writer.flush().map_err(|source| write_error(path, source))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|source| write_error(path, source))
}

fn partial_path(path: &Path) -> Result<PathBuf> {
    match path.file_name() {
        Some(name) => {
            let mut partial = std::ffi::OsString::from(".");
            partial.push(name);
            partial.push(".partial");
            Ok(path.with_file_name(partial))
        }
        None => Err(write_error(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )),
    }
}

fn discard(partial: &Path) {
    match fs::remove_file(partial) {
        Ok(()) => debug!("removed {}", partial.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => (),
        Err(e) => warn!("could not remove {}: {}", partial.display(), e),
    }
}

fn write_error(path: &Path, source: io::Error) -> Error {
    Error::Write {
        path: path.to_path_buf(),
        source,
    }
}
