//! Molecular line moment maps
//!
//! Moment maps are found by globbing a data directory and matching the
//! molecule name against the file names.

use glob::glob;
use std::path::{Path, PathBuf};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(Debug, thiserror::Error)]
pub enum MoleculeError {
    #[error("no file name matches {0}")]
    NoMatch(String),
    #[error("invalid glob pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("failed to read a glob entry")]
    Glob(#[from] glob::GlobError),
}
type Result<T> = std::result::Result<T, MoleculeError>;

/// Observed molecular species
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, Display, AsRefStr)]
pub enum Molecule {
    #[strum(serialize = "12CO")]
    TwelveCo,
    #[strum(serialize = "13CO")]
    ThirteenCo,
    #[strum(serialize = "C18O")]
    CEighteenO,
    #[strum(serialize = "SO")]
    SulfurMonoxide,
    #[strum(serialize = "H2CO")]
    Formaldehyde,
    #[strum(serialize = "CH3OH")]
    Methanol,
    #[strum(serialize = "c-C3H2")]
    Cyclopropenylidene,
    #[strum(serialize = "SiO")]
    SiliconMonoxide,
}

/// Moment map kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
pub enum Moment {
    /// peak intensity
    #[strum(serialize = "mom8")]
    Eight,
    /// velocity of the peak intensity
    #[strum(serialize = "mom9")]
    Nine,
}
impl Moment {
    /// File name glob pattern
    pub fn pattern(&self) -> String {
        format!("*{}*.fits", self)
    }
}

/// Returns the first path in `paths` which file name contains `name`
pub fn select<P: AsRef<Path>>(paths: &[P], name: &str) -> Result<PathBuf> {
    let mut matches = paths.iter().map(|path| -> &Path { path.as_ref() }).filter(|path| {
        path.file_name()
            .and_then(|file_name| file_name.to_str())
            .map_or(false, |file_name| file_name.contains(name))
    });
    let first = matches
        .next()
        .ok_or_else(|| MoleculeError::NoMatch(name.to_string()))?;
    let others = matches.count();
    if others > 0 {
        log::warn!(
            "{} matches {} more file(s), using {:?}",
            name,
            others,
            first
        );
    }
    Ok(first.to_path_buf())
}

/// Returns the sorted paths matching `pattern` in `dir`
pub fn find<P: AsRef<Path>>(dir: P, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.as_ref().join(pattern);
    let mut paths = glob(&pattern.to_string_lossy())?.collect::<std::result::Result<Vec<_>, _>>()?;
    paths.sort();
    log::debug!("{} file(s) match {:?}", paths.len(), pattern);
    Ok(paths)
}

/// Peak intensity and peak velocity maps of a molecule
#[derive(Debug, Clone, PartialEq)]
pub struct MomentMaps {
    pub molecule: Molecule,
    pub peak_intensity: PathBuf,
    pub peak_velocity: PathBuf,
}
impl MomentMaps {
    /// Finds the moment maps of `molecule` in `dir`
    pub fn discover<P: AsRef<Path>>(dir: P, molecule: Molecule) -> Result<Self> {
        let dir = dir.as_ref();
        let peak_intensity = select(&find(dir, &Moment::Eight.pattern())?, molecule.as_ref())?;
        let peak_velocity = select(&find(dir, &Moment::Nine.pattern())?, molecule.as_ref())?;
        log::info!(
            "{}: {:?} & {:?}",
            molecule,
            peak_intensity.file_name().unwrap_or_default(),
            peak_velocity.file_name().unwrap_or_default()
        );
        Ok(Self {
            molecule,
            peak_intensity,
            peak_velocity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, fs};
    use strum::IntoEnumIterator;

    const FILES: [&str; 4] = [
        "CB68_SBLB_12CO_robust_2.0_mom8_15arcsec.fits",
        "CB68_SBLB_13CO_robust_2.0_mom8_15arcsec.fits",
        "CB68_SBLB_C18O_robust_2.0_mom8_15arcsec.fits",
        "CB68_SBLB_SiO_robust_2.0_mom8_15arcsec.fits",
    ];

    #[test]
    fn select_single_match() {
        let path = select(&FILES, "13CO").unwrap();
        assert_eq!(path, PathBuf::from(FILES[1]));
        let path = select(&FILES, Molecule::SiliconMonoxide.as_ref()).unwrap();
        assert_eq!(path, PathBuf::from(FILES[3]));
    }

    #[test]
    fn select_no_match() {
        let result = select(&FILES, "H2CO");
        assert!(matches!(result, Err(MoleculeError::NoMatch(name)) if name == "H2CO"));
        let empty: [&str; 0] = [];
        assert!(select(&empty, "12CO").is_err());
    }

    #[test]
    fn select_matches_file_name_only() {
        let paths = ["data/12CO/CB68_continuum.fits", "data/CB68_12CO_mom8.fits"];
        assert_eq!(
            select(&paths, "12CO").unwrap(),
            PathBuf::from("data/CB68_12CO_mom8.fits")
        );
    }

    #[test]
    fn molecule_names() {
        let names: Vec<String> = Molecule::iter().map(|m| m.to_string()).collect();
        assert_eq!(names[0], "12CO");
        assert_eq!(names.len(), 8);
        assert_eq!("c-C3H2".parse::<Molecule>().unwrap(), Molecule::Cyclopropenylidene);
        assert!("CO".parse::<Molecule>().is_err());
        assert_eq!(Moment::Nine.pattern(), "*mom9*.fits");
    }

    #[test]
    fn discover_moment_maps() -> std::result::Result<(), Box<dyn Error>> {
        let dir = std::env::temp_dir().join(format!("moment-maps_discover_{}", std::process::id()));
        fs::create_dir_all(&dir)?;
        for name in [
            "CB68_SBLB_SO_robust_2.0_mom8_15arcsec.fits",
            "CB68_SBLB_SO_robust_2.0_mom9_15arcsec.fits",
            "CB68_SBLB_12CO_robust_2.0_mom9_15arcsec.fits",
        ] {
            fs::write(dir.join(name), b"")?;
        }
        let maps = MomentMaps::discover(&dir, Molecule::SulfurMonoxide)?;
        assert_eq!(
            maps.peak_velocity,
            dir.join("CB68_SBLB_SO_robust_2.0_mom9_15arcsec.fits")
        );
        assert!(matches!(
            MomentMaps::discover(&dir, Molecule::TwelveCo),
            Err(MoleculeError::NoMatch(_))
        ));
        fs::remove_dir_all(dir)?;
        Ok(())
    }
}
