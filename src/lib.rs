//! Radio images dashboard
//!
//! Renders continuum and molecular line moment maps FITS images into
//! false-color panels, with the contours of a reference continuum image,
//! and lays them out on browser dashboard pages.
//!
//! ```no_run
//! use moment_maps::{ContourLevels, ContourOverlay, Dashboard, FitsImage, Panel};
//!
//! # fn main() -> Result<(), moment_maps::Error> {
//! let continuum = FitsImage::open("CB68_SBLB_continuum_robust_2.0.pbcor.tt0.fits")?;
//! let contours = ContourOverlay::new(
//!     continuum.data(),
//!     &continuum.grid(),
//!     &ContourLevels::default().levels(),
//! );
//! let panel = Panel::new(&continuum)
//!     .title("Continuum")
//!     .contours(&contours)
//!     .render("dashboard/continuum.png")?;
//! Dashboard::new("CB68").row(vec![panel]).write("dashboard/index.html")?;
//! # Ok(())
//! # }
//! ```

pub mod colormap;
pub mod contour;
pub mod dashboard;
mod error;
pub mod fits;
pub mod grid;
pub mod molecule;
pub mod panel;

pub use colormap::{ColorMapper, Palette};
pub use contour::{contour_levels, ContourLevels, ContourOverlay};
pub use dashboard::{Dashboard, Sidebar};
pub use error::Error;
pub use fits::{Beam, FitsImage};
pub use grid::Grid;
pub use molecule::{Molecule, MomentMaps};
pub use panel::{Panel, Quantity, RenderedPanel, ValueMap, View};
