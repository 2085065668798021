//! CB68 dashboard
//!
//! Continuum image next to the 12CO peak intensity and peak velocity maps,
//! with the continuum contours overlaid on the moment maps

use moment_maps::{
    colormap::{Palette, N_COLOR},
    ContourLevels, ContourOverlay, Dashboard, FitsImage, Panel, Quantity, View,
};
use std::{fs, path::PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "cb68", about = "CB68 continuum and 12CO moment maps dashboard")]
struct Opt {
    /// Path to the FITS files repository
    #[structopt(short, long, default_value = ".", parse(from_os_str))]
    data: PathBuf,
    /// Dashboard output directory
    #[structopt(short, long, default_value = "dashboard", parse(from_os_str))]
    output: PathBuf,
    /// Continuum image
    #[structopt(long, default_value = "CB68_SBLB_continuum_robust_2.0.pbcor.tt0.fits")]
    continuum: String,
    /// Continuum color palette: inferno, spectral, rdbu or cubehelix
    #[structopt(long, default_value = "inferno")]
    palette: Palette,
    /// Peak intensity map
    #[structopt(long, default_value = "CB68_SBLB_12CO_robust_2.0_mom8_15arcsec.fits")]
    mom8: String,
    /// Peak velocity map
    #[structopt(long, default_value = "CB68_SBLB_12CO_robust_2.0_mom9_15arcsec.fits")]
    mom9: String,
    /// Lowest contour level in noise unit
    #[structopt(long, default_value = "5")]
    contour_start: f64,
    /// Highest contour level in noise unit
    #[structopt(long, default_value = "405")]
    contour_end: f64,
    /// Continuum noise [Jy/beam]
    #[structopt(long, default_value = "1.8528968e-05")]
    noise: f64,
    /// Half width of the field of view [arcsec]
    #[structopt(long, default_value = "7.5")]
    half_width: f64,
    /// Distance to the source [pc]
    #[structopt(long, default_value = "151")]
    distance: f64,
    /// Panel width and height [px]
    #[structopt(long, default_value = "500")]
    panel_size: u32,
    /// Longest scale bar [px]
    #[structopt(long, default_value = "50")]
    scale_bar: f64,
    /// Hides the beam ellipse
    #[structopt(long)]
    no_beam: bool,
    /// Disables the crosshair cursor
    #[structopt(long)]
    no_crosshair: bool,
}

/// Panel with the layout options of the command line
fn panel<'a>(opt: &Opt, image: &'a FitsImage) -> Panel<'a> {
    Panel::new(image)
        .size(opt.panel_size, opt.panel_size)
        .scale_bar_length(opt.scale_bar)
        .beam(!opt.no_beam)
        .crosshair(!opt.no_crosshair)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let continuum = FitsImage::open(opt.data.join(&opt.continuum))?;
    let levels = ContourLevels::default()
        .start(opt.contour_start)
        .end(opt.contour_end)
        .noise(opt.noise);
    let contours = ContourOverlay::new(continuum.data(), &continuum.grid(), &levels.levels());

    fs::create_dir_all(&opt.output)?;
    let continuum_panel = panel(&opt, &continuum)
        .title("Continuum")
        .palette(opt.palette.colors(N_COLOR))
        .view(View::square(opt.half_width, opt.distance))
        .render(opt.output.join("continuum.png"))?;
    let view = continuum_panel.view;
    let mut panels = vec![continuum_panel];

    for (file, title, palette, quantity, png) in [
        (
            &opt.mom8,
            "12CO peak intensity",
            Palette::Spectral,
            Quantity::new("Intensity", "Jy/beam"),
            "mom8.png",
        ),
        (
            &opt.mom9,
            "12CO peak velocity",
            Palette::RedBlue,
            Quantity::new("Velocity", "km/s"),
            "mom9.png",
        ),
    ] {
        let path = opt.data.join(file);
        if !path.exists() {
            log::warn!("{:?} not found, skipping", path);
            continue;
        }
        let image = FitsImage::open(&path)?;
        panels.push(
            panel(&opt, &image)
                .title(title)
                .palette(palette.reversed(N_COLOR))
                .quantity(quantity)
                .contours(&contours)
                .view(view)
                .render(opt.output.join(png))?,
        );
    }

    Dashboard::new("CB68")
        .row(panels)
        .write(opt.output.join("index.html"))?;
    Ok(())
}
