use std::path::Path;

use kurbo::{PathEl, Point, Shape as _};

use crate::config::options::{Rgba8, SaveOptions};
use crate::foundation::error::{AnimError, AnimResult};

const PATH_TOLERANCE: f64 = 0.1;

/// One drawable element of a [`Figure`], in data coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Artist {
    /// Axis-aligned filled rectangle.
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: Rgba8,
    },
    /// Filled disc; `radius` is in pixels at the figure's dpi.
    Marker {
        center: Point,
        radius: f64,
        color: Rgba8,
    },
    /// Open line through `points`; `width` is in pixels at the figure's dpi.
    Line {
        points: Vec<Point>,
        width: f64,
        color: Rgba8,
    },
    /// Closed filled polygon.
    Polygon { points: Vec<Point>, color: Rgba8 },
}

/// Drawing surface returned by a render callback.
///
/// A figure has a physical size (inches at a dpi), a data window (`xlim`/`ylim`, y pointing up)
/// and a list of artists. Pixels only exist while saving.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    width_in: f64,
    height_in: f64,
    dpi: f64,
    xlim: (f64, f64),
    ylim: (f64, f64),
    facecolor: Rgba8,
    artists: Vec<Artist>,
}

/// Premultiplied RGBA8 pixels of a rasterized figure.
#[derive(Clone, Debug)]
pub struct FigureRaster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Figure {
    /// New figure of `width_in` x `height_in` inches at `dpi`, data window `[0, 1] x [0, 1]`.
    pub fn new(width_in: f64, height_in: f64, dpi: f64) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
            xlim: (0.0, 1.0),
            ylim: (0.0, 1.0),
            facecolor: Rgba8::WHITE,
            artists: Vec::new(),
        }
    }

    pub fn set_xlim(&mut self, x0: f64, x1: f64) -> &mut Self {
        self.xlim = (x0, x1);
        self
    }

    pub fn set_ylim(&mut self, y0: f64, y1: f64) -> &mut Self {
        self.ylim = (y0, y1);
        self
    }

    pub fn set_facecolor(&mut self, color: Rgba8) -> &mut Self {
        self.facecolor = color;
        self
    }

    pub fn add_artist(&mut self, artist: Artist) -> &mut Self {
        self.artists.push(artist);
        self
    }

    /// Line plot through `(xs[i], ys[i])`. NaN points break the line.
    pub fn plot(&mut self, xs: &[f64], ys: &[f64], width: f64, color: Rgba8) -> &mut Self {
        let mut run = Vec::new();
        for (&x, &y) in xs.iter().zip(ys) {
            if x.is_finite() && y.is_finite() {
                run.push(Point::new(x, y));
            } else if !run.is_empty() {
                self.artists.push(Artist::Line {
                    points: std::mem::take(&mut run),
                    width,
                    color,
                });
            }
        }
        if !run.is_empty() {
            self.artists.push(Artist::Line {
                points: run,
                width,
                color,
            });
        }
        self
    }

    /// One marker per finite point; `radii[i]` falls back to the last radius given.
    pub fn scatter(&mut self, xs: &[f64], ys: &[f64], radii: &[f64], color: Rgba8) -> &mut Self {
        for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            let radius = radii.get(i).or(radii.last()).copied().unwrap_or(3.0);
            self.artists.push(Artist::Marker {
                center: Point::new(x, y),
                radius,
                color,
            });
        }
        self
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    /// Pixel size at the figure's own dpi.
    pub fn pixel_size(&self) -> (u32, u32) {
        self.pixel_size_at(self.dpi)
    }

    fn pixel_size_at(&self, dpi: f64) -> (u32, u32) {
        let w = (self.width_in * dpi).round();
        let h = (self.height_in * dpi).round();
        let clamp = |v: f64| if v.is_finite() && v > 0.0 { v as u32 } else { 0 };
        (clamp(w), clamp(h))
    }

    /// Check that the figure can be rasterized.
    pub fn validate(&self) -> AnimResult<()> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(AnimError::render_contract(format!(
                "figure dpi must be positive, got {}",
                self.dpi
            )));
        }
        let (w, h) = self.pixel_size();
        if w == 0 || h == 0 {
            return Err(AnimError::render_contract(format!(
                "figure has an empty pixel size {w}x{h}"
            )));
        }
        if w > u32::from(u16::MAX) || h > u32::from(u16::MAX) {
            return Err(AnimError::render_contract(format!(
                "figure pixel size {w}x{h} exceeds {}",
                u16::MAX
            )));
        }
        if self.xlim.0 == self.xlim.1 || self.ylim.0 == self.ylim.1 {
            return Err(AnimError::render_contract("figure data window is degenerate"));
        }
        Ok(())
    }

    /// Remove every artist. Used to tear the figure down after it was saved.
    pub fn clear(&mut self) {
        self.artists.clear();
        self.artists.shrink_to_fit();
    }

    /// Rasterize at `dpi` (the figure's own dpi when `None`).
    pub fn rasterize(&self, dpi: Option<f64>, transparent: bool) -> AnimResult<FigureRaster> {
        self.validate()?;
        let dpi = dpi.unwrap_or(self.dpi);
        let (w, h) = self.pixel_size_at(dpi);
        let w16: u16 = w
            .try_into()
            .map_err(|_| AnimError::render_contract("figure width exceeds u16"))?;
        let h16: u16 = h
            .try_into()
            .map_err(|_| AnimError::render_contract("figure height exceeds u16"))?;
        if w16 == 0 || h16 == 0 {
            return Err(AnimError::render_contract("figure rasterizes to zero pixels"));
        }

        let scale = dpi / self.dpi;
        let map = DataToPixel::new(self.xlim, self.ylim, f64::from(w), f64::from(h));

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);

        if !transparent {
            set_color(&mut ctx, self.facecolor);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(w),
                f64::from(h),
            ));
        }

        for artist in &self.artists {
            let (path, color) = match artist {
                Artist::Rect {
                    x0,
                    y0,
                    x1,
                    y1,
                    color,
                } => {
                    let a = map.apply(Point::new(*x0, *y0));
                    let b = map.apply(Point::new(*x1, *y1));
                    (kurbo::Rect::from_points(a, b).to_path(PATH_TOLERANCE), *color)
                }
                Artist::Marker {
                    center,
                    radius,
                    color,
                } => (
                    kurbo::Circle::new(map.apply(*center), radius * scale)
                        .to_path(PATH_TOLERANCE),
                    *color,
                ),
                Artist::Line {
                    points,
                    width,
                    color,
                } => {
                    let line = polyline(points.iter().map(|p| map.apply(*p)), false);
                    let stroked = kurbo::stroke(
                        line,
                        &kurbo::Stroke::new(width * scale),
                        &kurbo::StrokeOpts::default(),
                        PATH_TOLERANCE,
                    );
                    (stroked, *color)
                }
                Artist::Polygon { points, color } => {
                    (polyline(points.iter().map(|p| map.apply(*p)), true), *color)
                }
            };
            set_color(&mut ctx, color);
            ctx.fill_path(&bezpath_to_cpu(&path));
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FigureRaster {
            width: w,
            height: h,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }

    /// Rasterize and write the figure to `path`.
    ///
    /// The parent directory must exist; any IO failure is a [`AnimError::Save`].
    pub fn save(&self, path: &Path, opts: &SaveOptions) -> AnimResult<()> {
        let transparent = opts.transparent && opts.format.supports_alpha();
        let raster = self.rasterize(opts.dpi, transparent)?;

        let mut straight = vec![0u8; raster.data.len()];
        let (bytes, color) = if transparent {
            unpremultiply_rgba8(&mut straight, &raster.data)?;
            (straight, image::ColorType::Rgba8)
        } else {
            flatten_premul_over_bg(&mut straight, &raster.data, opts.background.to_array())?;
            if opts.format.supports_alpha() {
                (straight, image::ColorType::Rgba8)
            } else {
                let rgb = straight
                    .chunks_exact(4)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect::<Vec<_>>();
                (rgb, image::ColorType::Rgb8)
            }
        };

        image::save_buffer_with_format(
            path,
            &bytes,
            raster.width,
            raster.height,
            color,
            opts.format.to_image_format(),
        )
        .map_err(|e| AnimError::save(format!("failed to write '{}': {e}", path.display())))
    }
}

struct DataToPixel {
    x0: f64,
    sx: f64,
    y0: f64,
    sy: f64,
    height: f64,
}

impl DataToPixel {
    fn new(xlim: (f64, f64), ylim: (f64, f64), width: f64, height: f64) -> Self {
        Self {
            x0: xlim.0,
            sx: width / (xlim.1 - xlim.0),
            y0: ylim.0,
            sy: height / (ylim.1 - ylim.0),
            height,
        }
    }

    fn apply(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.x0) * self.sx,
            self.height - (p.y - self.y0) * self.sy,
        )
    }
}

fn polyline(points: impl Iterator<Item = Point>, close: bool) -> kurbo::BezPath {
    let mut path = kurbo::BezPath::new();
    for (i, p) in points.enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    if close && !path.elements().is_empty() {
        path.close_path();
    }
    path
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u16 {
    // (x*y + 127) / 255 with exact rounding for u8 inputs.
    let t = x * y + 128;
    (t + (t >> 8)) >> 8
}

fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg_rgba: [u8; 4]) -> AnimResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(AnimError::save(
            "flatten_premul_over_bg expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (s[0] as u16 + mul_div255(bg_r, inv)).min(255) as u8;
        d[1] = (s[1] as u16 + mul_div255(bg_g, inv)).min(255) as u8;
        d[2] = (s[2] as u16 + mul_div255(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
    Ok(())
}

fn unpremultiply_rgba8(dst: &mut [u8], src_premul: &[u8]) -> AnimResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(AnimError::save(
            "unpremultiply_rgba8 expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 0 {
            d.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for c in 0..3 {
            d[c] = ((s[c] as u16 * 255 + a / 2) / a).min(255) as u8;
        }
        d[3] = s[3];
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/figure.rs"]
mod tests;
