use std::fs;
use std::time::Duration;

use mandelgen::coord::Viewport;
use mandelgen::painter::{Palette, Ramp};
use mandelgen::{CancelToken, Error, Escape, GeneratorConfig, Mandelbrot};

fn generator(threads: usize) -> Mandelbrot {
    Mandelbrot::with_config(GeneratorConfig::default().threads(threads))
}

#[test]
fn field_has_requested_shape_and_range() {
    let mut m = generator(4);
    for &(w, h, max) in &[(1, 1, 1), (37, 23, 50), (120, 80, 255), (5, 200, 3)] {
        m.generate(w, h, max).unwrap();
        let field = m.field().unwrap();
        assert_eq!((field.width(), field.height()), (w, h));
        assert_eq!(field.len(), w * h);
        assert!(field.values().iter().all(|&i| i <= max as u32));
    }
}

#[test]
fn origin_never_escapes() {
    let viewport = Viewport::from_nums(-2.0, 2.0, -2.0, 2.0).unwrap();
    let mut m = Mandelbrot::with_config(GeneratorConfig::default().threads(2).viewport(viewport));
    for max in [1, 2, 10, 500] {
        m.generate(5, 5, max).unwrap();
        assert_eq!(m.field().unwrap().escape(2, 2), Escape::Bounded);
    }
}

#[test]
fn pixel_nearest_origin_in_classic_view_never_escapes() {
    // pixel (71, 49) samples c = 0.0025 - 0.01i
    let mut m = generator(3);
    m.generate(100, 100, 2000).unwrap();
    assert_eq!(m.field().unwrap().escape(71, 49), Escape::Bounded);
}

#[test]
fn far_points_escape_at_first_iteration() {
    let viewport = Viewport::from_nums(2.5, 3.5, -0.5, 0.5).unwrap();
    let mut m = Mandelbrot::with_config(GeneratorConfig::default().threads(2).viewport(viewport));
    m.generate(16, 16, 100).unwrap();
    let field = m.field().unwrap();
    assert!(field.values().iter().all(|&i| i == 1));
    assert_eq!(field.escape(0, 0), Escape::Escaped(1));
}

#[test]
fn zero_budget_is_all_bounded() {
    let mut m = generator(2);
    m.generate(20, 10, 0).unwrap();
    let field = m.field().unwrap();
    assert!((0..10).all(|y| (0..20).all(|x| field.escape(x, y) == Escape::Bounded)));
}

#[test]
fn identical_across_thread_counts() {
    let mut reference = generator(1);
    reference.generate(90, 61, 80).unwrap();
    for threads in [2, 3, 7, 16] {
        let mut m = generator(threads);
        m.generate(90, 61, 80).unwrap();
        assert_eq!(m.field(), reference.field(), "threads={}", threads);
    }
    // and run to run
    let again = reference.field().cloned();
    reference.generate(90, 61, 80).unwrap();
    assert_eq!(reference.field().cloned(), again);
}

#[test]
fn deadline_stops_a_running_generation() {
    let mut m = generator(4);
    m.generate(30, 20, 40).unwrap();
    let before = m.field().cloned();

    let cancel = CancelToken::with_timeout(Duration::from_millis(5));
    assert!(matches!(
        m.generate_with(4000, 4000, 5000, &cancel),
        Err(Error::Cancelled)
    ));
    assert!(cancel.is_cancelled());
    assert_eq!(m.field().cloned(), before);

    // the pool is still usable afterwards
    m.generate(30, 20, 40).unwrap();
    assert_eq!(m.field().cloned(), before);
}

#[test]
fn save_before_generate_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");
    let m = generator(1);
    assert!(matches!(m.save(&path), Err(Error::NoData)));
    assert!(!path.exists());
}

#[test]
fn zero_dimensions_are_rejected() {
    let mut m = generator(2);
    assert!(matches!(
        m.generate(0, 100, 10),
        Err(Error::InvalidDimensions {
            width: 0,
            height: 100
        })
    ));
    assert!(matches!(
        m.generate(100, 0, 10),
        Err(Error::InvalidDimensions { .. })
    ));
    assert!(m.field().is_none());
}

#[test]
fn oversized_dimensions_are_rejected() {
    let mut m = generator(1);
    assert!(matches!(
        m.generate(100_000, 1, 10),
        Err(Error::InvalidDimensions { .. })
    ));
    assert!(matches!(
        m.generate(30_000, 30_000, 10),
        Err(Error::InvalidDimensions { .. })
    ));
}

#[test]
fn end_to_end_png_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.png");
    let second = dir.path().join("second.png");

    let mut m = generator(4);
    m.generate(100, 100, 50).unwrap();
    m.save(&first).unwrap();

    let mut m = generator(1);
    m.generate(100, 100, 50).unwrap();
    m.save(&second).unwrap();

    let img = image::open(&first).unwrap();
    assert_eq!((img.width(), img.height()), (100, 100));
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn image_pixels_follow_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("px.png");
    let config = GeneratorConfig::default()
        .threads(2)
        .palette(Palette::Rainbow)
        .ramp(Ramp::Linear);
    let mut m = Mandelbrot::with_config(config.clone());
    m.generate(64, 40, 60).unwrap();
    m.save(&path).unwrap();

    let field = m.field().unwrap();
    let painter = config.painter();
    let img = image::open(&path).unwrap().to_rgb8();
    for (x, y, px) in img.enumerate_pixels() {
        let expected = painter.escape_color(field.escape(x as usize, y as usize), 60);
        assert_eq!(*px, expected, "pixel ({}, {})", x, y);
    }
}

#[test]
fn second_generate_replaces_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    let mut m = generator(2);
    m.generate(40, 30, 20).unwrap();
    m.generate(25, 60, 35).unwrap();
    m.save(&path).unwrap();

    let field = m.field().unwrap();
    assert_eq!((field.width(), field.height(), field.max_iterations()), (25, 60, 35));
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (25, 60));

    let mut fresh = generator(1);
    fresh.generate(25, 60, 35).unwrap();
    assert_eq!(fresh.field(), m.field());
}

#[test]
fn unwritable_path_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent").join("out.png");
    let mut m = generator(1);
    m.generate(10, 10, 10).unwrap();
    match m.save(&path) {
        Err(Error::Write { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected a write error, got {:?}", other),
    }
}
