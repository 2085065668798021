use crate::{
    colormap::ColormapError, dashboard::DashboardError, fits::FitsError,
    molecule::MoleculeError, panel::PanelError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `fits` module")]
    Fits(#[from] FitsError),
    #[error("Error in the `colormap` module")]
    Colormap(#[from] ColormapError),
    #[error("Error in the `panel` module")]
    Panel(#[from] PanelError),
    #[error("Error in the `molecule` module")]
    Molecule(#[from] MoleculeError),
    #[error("Error in the `dashboard` module")]
    Dashboard(#[from] DashboardError),
}
