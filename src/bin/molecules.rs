//! Molecular lines dashboard
//!
//! One page per molecule with its peak intensity and peak velocity maps,
//! the continuum contours overlaid on both, and a sidebar to switch molecule

use indicatif::{ProgressBar, ProgressStyle};
use moment_maps::{
    colormap::{Palette, N_COLOR},
    ContourLevels, ContourOverlay, Dashboard, FitsImage, Molecule, MomentMaps, Panel, Quantity,
    Sidebar, View,
};
use std::{fs, path::PathBuf};
use strum::IntoEnumIterator;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "molecules", about = "CB68 molecular lines moment maps dashboard")]
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
    /// Only renders the page of this molecule
    #[structopt(short, long)]
    molecule: Option<Molecule>,
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

fn page(molecule: Molecule) -> String {
    format!("{}.html", molecule)
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
    let view = View::square(opt.half_width, opt.distance);

    let sidebar = Molecule::iter().fold(Sidebar::new("Molecule"), |sidebar, molecule| {
        sidebar.option(molecule.to_string(), page(molecule))
    });
    let molecules: Vec<Molecule> = match opt.molecule {
        Some(molecule) => vec![molecule],
        None => Molecule::iter().collect(),
    };

    fs::create_dir_all(&opt.output)?;
    let pb = ProgressBar::new(molecules.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    for molecule in molecules {
        pb.set_message(molecule.to_string());
        let maps = MomentMaps::discover(&opt.data, molecule)?;

        let mom8 = FitsImage::open(&maps.peak_intensity)?;
        let mom8_panel = panel(&opt, &mom8)
            .title(format!("{} peak intensity", molecule))
            .palette(Palette::Spectral.reversed(N_COLOR))
            .quantity(Quantity::new("Intensity", "Jy/beam"))
            .contours(&contours)
            .view(view)
            .render(opt.output.join(format!("{}_mom8.png", molecule)))?;

        let mom9 = FitsImage::open(&maps.peak_velocity)?;
        let mom9_panel = panel(&opt, &mom9)
            .title(format!("{} peak velocity", molecule))
            .palette(Palette::RedBlue.reversed(N_COLOR))
            .quantity(Quantity::new("Velocity", "km/s"))
            .contours(&contours)
            .view(mom8_panel.view)
            .render(opt.output.join(format!("{}_mom9.png", molecule)))?;

        Dashboard::new(format!("CB68 {}", molecule))
            .sidebar(sidebar.clone().selected(molecule.to_string()))
            .row(vec![mom8_panel, mom9_panel])
            .write(opt.output.join(page(molecule)))?;
        pb.inc(1);
    }
    pb.finish_with_message("dashboard written");
    Ok(())
}
