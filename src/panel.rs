//! Image panels
//!
//! A [Panel] renders one FITS image into a PNG bitmap with [plotters]:
//! false-color raster, sky offset axis, contours of a reference image,
//! the beam ellipse and a scale bar in physical units.
//! The [RenderedPanel] it returns carries what a page needs to lay it out
//! and to drive the crosshair cursor.

use crate::{
    colormap::{ColorMapper, ColormapError, Palette, N_COLOR},
    contour::ContourOverlay,
    fits::FitsImage,
};
use plotters::prelude::*;
use std::{
    fmt::Display,
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("failed to set the color range")]
    Colormap(#[from] ColormapError),
    #[error("failed to draw the panel: {0}")]
    Drawing(String),
}
type Result<T> = std::result::Result<T, PanelError>;

fn drawing<E: Display>(e: E) -> PanelError {
    PanelError::Drawing(e.to_string())
}

/// Half width of the default field of view [arcsec]
pub const HALF_WIDTH: f64 = 7.5;
/// Distance to the source [pc]
pub const DISTANCE: f64 = 151.;

/// Field of view
///
/// Panels created with the same view are spatially aligned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// x offset range [arcsec]
    pub x: (f64, f64),
    /// y offset range [arcsec]
    pub y: (f64, f64),
    /// x offset range at the source distance [au]
    pub distance: (f64, f64),
}
impl Default for View {
    fn default() -> Self {
        Self::square(HALF_WIDTH, DISTANCE)
    }
}
impl View {
    /// Square field of view of `half_width` arcsec for a source at `distance` parsec
    pub fn square(half_width: f64, distance: f64) -> Self {
        Self {
            x: (-half_width, half_width),
            y: (-half_width, half_width),
            distance: (-half_width * distance, half_width * distance),
        }
    }
    /// Sets the x offset range at the source distance [au]
    pub fn distance_range(self, distance: (f64, f64)) -> Self {
        Self { distance, ..self }
    }
}

/// Pixel bounds of the plotting area within the panel bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}
impl PlotArea {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
    /// Sky coordinates at the center of bitmap pixel (`px`,`py`)
    pub fn to_sky(&self, view: &View, px: i32, py: i32) -> (f64, f64) {
        let u = (px - self.left) as f64 + 0.5;
        let v = (py - self.top) as f64 + 0.5;
        (
            view.x.0 + u / self.width() as f64 * (view.x.1 - view.x.0),
            view.y.1 - v / self.height() as f64 * (view.y.1 - view.y.0),
        )
    }
}

/// Number of value samples along each side of the cursor readout map
pub const N_SAMPLE: usize = 100;

/// Image values sampled on a regular lattice over a view, for the cursor readout
///
/// Samples are row-major, first row at the top of the view.
/// Samples falling outside the image are NaN
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMap {
    pub nx: usize,
    pub ny: usize,
    pub values: Vec<f64>,
}
impl ValueMap {
    /// Samples `image` at the centers of `nx` by `ny` cells covering `view`
    pub fn sample(image: &FitsImage, view: &View, nx: usize, ny: usize) -> Self {
        let grid = image.grid();
        let values = (0..ny)
            .flat_map(|j| (0..nx).map(move |i| (i, j)))
            .map(|(i, j)| {
                let x = view.x.0 + (i as f64 + 0.5) / nx as f64 * (view.x.1 - view.x.0);
                let y = view.y.1 - (j as f64 + 0.5) / ny as f64 * (view.y.1 - view.y.0);
                grid.pixel_at(x, y)
                    .and_then(|(col, row)| image.pixel(col, row))
                    .unwrap_or(f64::NAN)
            })
            .collect();
        Self { nx, ny, values }
    }
}

/// Quantity displayed by the cursor readout, e.g. `("Intensity", "Jy/beam")`
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub name: String,
    pub unit: String,
}
impl Quantity {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }
}
impl Default for Quantity {
    fn default() -> Self {
        Self::new("Intensity", "Jy/beam")
    }
}

/// Rounds `value` down to 1, 2 or 5 times a power of ten
pub fn nice_value(value: f64) -> f64 {
    if value <= 0f64 || !value.is_finite() {
        return value;
    }
    let decade = 10f64.powf(value.log10().floor());
    let mantissa = value / decade;
    let nice = [10., 5., 2., 1.]
        .into_iter()
        .find(|&m| m <= mantissa * (1. + 1e-12))
        .unwrap_or(1.);
    nice * decade
}

/// Physical scale bar
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    /// length of the bar in distance axis units
    pub value: f64,
    /// length of the bar [px]
    pub length: f64,
    pub unit: String,
}
impl ScaleBar {
    /// Scale bar at most `max_length` pixel long over a `range` spanning `width` pixels
    pub fn new(range: (f64, f64), width: i32, max_length: f64, unit: impl Into<String>) -> Self {
        let per_pixel = (range.1 - range.0) / width as f64;
        let value = nice_value(max_length * per_pixel);
        Self {
            value,
            length: value / per_pixel,
            unit: unit.into(),
        }
    }
    pub fn label(&self) -> String {
        format!("{:.2} {}", self.value, self.unit)
    }
}

/// Outline of the beam ellipse centered on `center`, sky coordinates [arcsec]
///
/// The position angle is counted from the +y axis toward -x
pub fn beam_outline(
    major: f64,
    minor: f64,
    position_angle: f64,
    center: (f64, f64),
    n: usize,
) -> Vec<(f64, f64)> {
    let (a, b) = (major * 0.5, minor * 0.5);
    let (s, c) = position_angle.to_radians().sin_cos();
    (0..n)
        .map(|i| {
            let t = 2. * std::f64::consts::PI * i as f64 / n as f64;
            let (u, v) = (a * t.cos(), b * t.sin());
            (center.0 - u * s + v * c, center.1 + u * c + v * s)
        })
        .collect()
}

/// A rendered panel
#[derive(Debug, Clone)]
pub struct RenderedPanel {
    pub path: PathBuf,
    pub title: String,
    pub quantity: Quantity,
    pub size: (u32, u32),
    pub plot_area: PlotArea,
    pub view: View,
    pub crosshair: bool,
    /// color range
    pub range: (f64, f64),
    pub values: ValueMap,
}

/// Panel builder
pub struct Panel<'a> {
    image: &'a FitsImage,
    palette: Vec<colorous::Color>,
    low: Option<f64>,
    high: Option<f64>,
    title: String,
    quantity: Quantity,
    contours: Option<&'a ContourOverlay>,
    view: View,
    size: (u32, u32),
    scale_bar_length: f64,
    beam: bool,
    crosshair: bool,
}
impl<'a> Panel<'a> {
    pub fn new(image: &'a FitsImage) -> Self {
        Self {
            image,
            palette: Palette::Inferno.colors(N_COLOR),
            low: None,
            high: None,
            title: String::new(),
            quantity: Quantity::default(),
            contours: None,
            view: View::default(),
            size: (500, 500),
            scale_bar_length: 50.,
            beam: true,
            crosshair: true,
        }
    }
    pub fn palette(self, palette: Vec<colorous::Color>) -> Self {
        Self { palette, ..self }
    }
    /// Lower bound of the color range, defaults to the image minimum
    pub fn low(self, low: f64) -> Self {
        Self {
            low: Some(low),
            ..self
        }
    }
    /// Upper bound of the color range, defaults to the image maximum
    pub fn high(self, high: f64) -> Self {
        Self {
            high: Some(high),
            ..self
        }
    }
    pub fn title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }
    pub fn quantity(self, quantity: Quantity) -> Self {
        Self { quantity, ..self }
    }
    /// Overlays the contours of a reference image
    pub fn contours(self, contours: &'a ContourOverlay) -> Self {
        Self {
            contours: Some(contours),
            ..self
        }
    }
    /// Shares the field of view of another panel
    pub fn view(self, view: View) -> Self {
        Self { view, ..self }
    }
    pub fn size(self, width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..self
        }
    }
    pub fn scale_bar_length(self, scale_bar_length: f64) -> Self {
        Self {
            scale_bar_length,
            ..self
        }
    }
    pub fn beam(self, beam: bool) -> Self {
        Self { beam, ..self }
    }
    pub fn crosshair(self, crosshair: bool) -> Self {
        Self { crosshair, ..self }
    }
    /// Renders the panel into a PNG file
    pub fn render<P: AsRef<Path>>(self, path: P) -> Result<RenderedPanel> {
        let now = Instant::now();
        let path = path.as_ref();
        let mapper = ColorMapper::stretch(
            self.palette.clone(),
            self.image.data(),
            self.low,
            self.high,
        )?;
        let grid = self.image.grid();
        let View { x, y, .. } = self.view;

        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 55)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x.0..x.1, y.0..y.1)
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("Δ R.A. (arcsec)")
            .y_desc("Δ Dec. (arcsec)")
            .label_style(("sans-serif", 13))
            .draw()
            .map_err(drawing)?;

        let (xr, yr) = chart.plotting_area().get_pixel_range();
        let plot_area = PlotArea {
            left: xr.start,
            top: yr.start,
            right: xr.end,
            bottom: yr.end,
        };
        for py in yr.clone() {
            for px in xr.clone() {
                let (sx, sy) = plot_area.to_sky(&self.view, px, py);
                let color = grid
                    .pixel_at(sx, sy)
                    .and_then(|(col, row)| self.image.pixel(col, row))
                    .map(|value| mapper.color(value));
                if let Some(colorous::Color { r, g, b }) = color {
                    root.draw_pixel((px, py), &RGBColor(r, g, b))
                        .map_err(drawing)?;
                }
            }
        }

        if let Some(contours) = self.contours {
            chart
                .draw_series(
                    contours
                        .segments()
                        .map(|s| PathElement::new(vec![s.start, s.end], BLACK.stroke_width(1))),
                )
                .map_err(drawing)?;
        }

        if self.beam {
            let beam = self.image.beam();
            let margin = 0.5 * beam.major.max(beam.minor) + 0.04 * (x.1 - x.0);
            let outline = beam_outline(
                beam.major,
                beam.minor,
                beam.position_angle,
                (x.0 + margin, y.0 + margin),
                64,
            );
            chart
                .draw_series(std::iter::once(Polygon::new(
                    outline.clone(),
                    WHITE.mix(0.8).filled(),
                )))
                .map_err(drawing)?;
            let mut closed = outline;
            closed.push(closed[0]);
            chart
                .draw_series(std::iter::once(PathElement::new(closed, &BLACK)))
                .map_err(drawing)?;
        }

        let scale_bar = ScaleBar::new(
            self.view.distance,
            plot_area.width(),
            self.scale_bar_length,
            "au",
        );
        let (pad, box_height) = (6, 34);
        let box_width = scale_bar.length.round() as i32 + 4 * pad + 30;
        let (bx1, by0) = (plot_area.right - pad, plot_area.top + pad);
        let bx0 = bx1 - box_width;
        root.draw(&Rectangle::new(
            [(bx0, by0), (bx1, by0 + box_height)],
            WHITE.mix(0.8).filled(),
        ))
        .map_err(drawing)?;
        let bar_x0 = bx0 + (box_width - scale_bar.length.round() as i32) / 2;
        let bar_y = by0 + pad + 2;
        root.draw(&PathElement::new(
            vec![
                (bar_x0, bar_y),
                (bar_x0 + scale_bar.length.round() as i32, bar_y),
            ],
            BLACK.stroke_width(2),
        ))
        .map_err(drawing)?;
        root.draw(&Text::new(
            scale_bar.label(),
            (bx0 + 2 * pad, bar_y + pad),
            ("sans-serif", 12).into_font(),
        ))
        .map_err(drawing)?;

        root.present().map_err(drawing)?;
        log::info!(
            "{:?} rendered in {:}ms",
            path,
            now.elapsed().as_millis()
        );
        Ok(RenderedPanel {
            path: path.to_path_buf(),
            title: self.title,
            quantity: self.quantity,
            size: self.size,
            plot_area,
            view: self.view,
            crosshair: self.crosshair,
            range: (mapper.low(), mapper.high()),
            values: ValueMap::sample(self.image, &self.view, N_SAMPLE, N_SAMPLE),
        })
    }
}
