use super::*;
use crate::config::options::ImageFormat;

fn red_square_figure() -> Figure {
    let mut fig = Figure::new(1.0, 1.0, 32.0);
    fig.set_xlim(-1.0, 1.0).set_ylim(-1.0, 1.0);
    fig.add_artist(Artist::Rect {
        x0: -0.5,
        y0: -0.5,
        x1: 0.5,
        y1: 0.5,
        color: Rgba8::new(255, 0, 0, 255),
    });
    fig
}

fn pixel(raster: &FigureRaster, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * raster.width + x) * 4) as usize;
    [
        raster.data[i],
        raster.data[i + 1],
        raster.data[i + 2],
        raster.data[i + 3],
    ]
}

#[test]
fn validate_rejects_empty_or_degenerate_figures() {
    assert!(Figure::new(4.0, 4.0, 120.0).validate().is_ok());
    assert!(matches!(
        Figure::new(0.0, 4.0, 120.0).validate(),
        Err(AnimError::RenderContract(_))
    ));
    assert!(Figure::new(4.0, 4.0, 0.0).validate().is_err());
    let mut fig = Figure::new(1.0, 1.0, 10.0);
    fig.set_xlim(1.0, 1.0);
    assert!(fig.validate().is_err());
}

#[test]
fn plot_splits_lines_at_nan() {
    let mut fig = Figure::new(1.0, 1.0, 10.0);
    fig.plot(
        &[0.0, 0.1, f64::NAN, 0.3, 0.4],
        &[0.0, 0.1, 0.2, 0.3, 0.4],
        1.0,
        Rgba8::BLACK,
    );
    assert_eq!(fig.artists().len(), 2);
}

#[test]
fn scatter_skips_missing_points_and_reuses_last_radius() {
    let mut fig = Figure::new(1.0, 1.0, 10.0);
    fig.scatter(&[0.1, f64::NAN, 0.3], &[0.1, 0.2, 0.3], &[2.0], Rgba8::BLACK);
    assert_eq!(fig.artists().len(), 2);
    assert!(
        fig.artists()
            .iter()
            .all(|a| matches!(a, Artist::Marker { radius, .. } if *radius == 2.0))
    );
}

#[test]
fn rasterize_paints_background_and_artists() {
    let raster = red_square_figure().rasterize(None, false).unwrap();
    assert_eq!((raster.width, raster.height), (32, 32));
    assert_eq!(pixel(&raster, 16, 16), [255, 0, 0, 255]);
    assert_eq!(pixel(&raster, 1, 1), [255, 255, 255, 255]);

    let transparent = red_square_figure().rasterize(None, true).unwrap();
    assert_eq!(pixel(&transparent, 1, 1)[3], 0);
}

#[test]
fn dpi_override_scales_the_raster() {
    let raster = red_square_figure().rasterize(Some(64.0), false).unwrap();
    assert_eq!((raster.width, raster.height), (64, 64));
}

#[test]
fn save_writes_a_readable_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("img_0.png");
    red_square_figure()
        .save(&path, &SaveOptions::default())
        .unwrap();
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (32, 32));
    assert_eq!(img.get_pixel(16, 16).0, [255, 0, 0, 255]);

    let jpg = dir.path().join("img_0.jpg");
    let opts = SaveOptions {
        format: ImageFormat::Jpeg,
        ..SaveOptions::default()
    };
    red_square_figure().save(&jpg, &opts).unwrap();
    assert!(jpg.is_file());
}

#[test]
fn save_into_missing_directory_is_a_save_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("img_0.png");
    let err = red_square_figure()
        .save(&path, &SaveOptions::default())
        .unwrap_err();
    assert!(matches!(err, AnimError::Save(_)));
}

#[test]
fn clear_removes_artists() {
    let mut fig = red_square_figure();
    fig.clear();
    assert!(fig.artists().is_empty());
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    let src = vec![64u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    unpremultiply_rgba8(&mut dst, &src).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 128]);
}

#[test]
fn polygon_fills_over_the_facecolor() {
    let blue = Rgba8::new(0, 0, 255, 255);
    let green = Rgba8::new(0, 200, 0, 255);
    let mut fig = Figure::new(1.0, 1.0, 32.0);
    fig.set_xlim(-1.0, 1.0).set_ylim(-1.0, 1.0).set_facecolor(blue);
    fig.add_artist(Artist::Polygon {
        points: vec![
            Point::new(-0.8, -0.8),
            Point::new(0.8, -0.8),
            Point::new(0.0, 0.8),
        ],
        color: green,
    });

    let raster = fig.rasterize(None, false).unwrap();
    assert_eq!(pixel(&raster, 16, 20), green.to_array());
    assert_eq!(pixel(&raster, 0, 0), blue.to_array());
    assert_eq!(pixel(&raster, 31, 0), blue.to_array());
}
