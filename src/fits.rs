//! FITS image reader
//!
//! Loads the primary HDU of a radio interferometric image together with the
//! world coordinate and beam header keywords needed to lay it out on the sky.

use crate::grid::Grid;
use fitrs::{Fits, FitsData, HeaderValue};
use std::{path::Path, time::Instant};

#[derive(Debug, thiserror::Error)]
pub enum FitsError {
    #[error("failed to open the FITS file")]
    Io(#[from] std::io::Error),
    #[error("{0} has no primary HDU")]
    Format(String),
    #[error("{0} primary HDU holds no numeric image")]
    NoImage(String),
    #[error("header keyword {0} is missing or is not a number")]
    MissingKey(&'static str),
    #[error("expected {expected} pixels, found {found}")]
    Size { expected: usize, found: usize },
}
type Result<T> = std::result::Result<T, FitsError>;

/// Header keywords of interest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    /// pixel increment along the first axis [deg]
    pub cdelt1: f64,
    /// beam major axis FWHM [deg]
    pub bmaj: f64,
    /// beam minor axis FWHM [deg]
    pub bmin: f64,
    /// beam position angle [deg]
    pub bpa: f64,
}

/// Synthesized beam
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    /// major axis FWHM [arcsec]
    pub major: f64,
    /// minor axis FWHM [arcsec]
    pub minor: f64,
    /// position angle east of north [deg]
    pub position_angle: f64,
}

/// 2D FITS image
///
/// Pixels are stored row-major, first row at the bottom of the image
#[derive(Debug, Clone)]
pub struct FitsImage {
    data: Vec<f64>,
    nx: usize,
    ny: usize,
    header: Header,
}
impl FitsImage {
    /// Creates an image from `nx` columns by `ny` rows of pixels
    pub fn new(data: Vec<f64>, nx: usize, ny: usize, header: Header) -> Result<Self> {
        if data.len() != nx * ny {
            return Err(FitsError::Size {
                expected: nx * ny,
                found: data.len(),
            });
        }
        Ok(Self {
            data,
            nx,
            ny,
            header,
        })
    }
    /// Loads the image in the primary HDU of a FITS file
    ///
    /// Only the first plane of images with more than 2 axis is kept
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let now = Instant::now();
        let path = path.as_ref();
        let name = path.display().to_string();
        log::info!("Loading {:?}...", path);
        let fits = Fits::open(path)?;
        let hdu = fits.get(0).ok_or_else(|| FitsError::Format(name.clone()))?;

        let header = Header {
            cdelt1: float_key(hdu.value("CDELT1"), "CDELT1")?,
            bmaj: float_key(hdu.value("BMAJ"), "BMAJ")?,
            bmin: float_key(hdu.value("BMIN"), "BMIN")?,
            bpa: float_key(hdu.value("BPA"), "BPA")?,
        };
        let bscale = float_key(hdu.value("BSCALE"), "BSCALE").unwrap_or(1f64);
        let bzero = float_key(hdu.value("BZERO"), "BZERO").unwrap_or(0f64);

        let (shape, data): (Vec<usize>, Vec<f64>) = match hdu.read_data() {
            FitsData::FloatingPoint32(array) => (
                array.shape.clone(),
                array.data.iter().map(|&x| x as f64).collect(),
            ),
            FitsData::FloatingPoint64(array) => (array.shape.clone(), array.data.clone()),
            FitsData::IntegersI32(array) => (
                array.shape.clone(),
                array
                    .data
                    .iter()
                    .map(|x| x.map_or(f64::NAN, |x| bzero + bscale * x as f64))
                    .collect(),
            ),
            FitsData::IntegersU32(array) => (
                array.shape.clone(),
                array
                    .data
                    .iter()
                    .map(|x| x.map_or(f64::NAN, |x| bscale * x as f64))
                    .collect(),
            ),
            _ => return Err(FitsError::NoImage(name)),
        };
        let (nx, ny) = match shape.as_slice() {
            [nx, ny, ..] if nx * ny > 0 => (*nx, *ny),
            _ => return Err(FitsError::NoImage(name)),
        };
        let plane = data.into_iter().take(nx * ny).collect();
        let this = Self::new(plane, nx, ny, header)?;
        log::info!(
            "... loaded {}x{} pixels in {:}ms",
            nx,
            ny,
            now.elapsed().as_millis()
        );
        Ok(this)
    }
    /// Pixels, row-major
    pub fn data(&self) -> &[f64] {
        &self.data
    }
    /// Number of columns
    pub fn nx(&self) -> usize {
        self.nx
    }
    /// Number of rows
    pub fn ny(&self) -> usize {
        self.ny
    }
    /// Pixel value at column `col` and row `row`
    pub fn pixel(&self, col: usize, row: usize) -> Option<f64> {
        if col < self.nx && row < self.ny {
            Some(self.data[row * self.nx + col])
        } else {
            None
        }
    }
    /// Pixel size [arcsec]
    pub fn pixel_size(&self) -> f64 {
        -self.header.cdelt1 * 3600.
    }
    /// Angular size of the image along the first axis [arcsec]
    pub fn full_size(&self) -> f64 {
        self.nx as f64 * self.pixel_size()
    }
    pub fn beam(&self) -> Beam {
        Beam {
            major: self.header.bmaj * 3600.,
            minor: self.header.bmin * 3600.,
            position_angle: self.header.bpa,
        }
    }
    /// Sky coordinates of the pixels, centered on the image
    pub fn grid(&self) -> Grid {
        let full_size = self.full_size();
        log::debug!(
            "pixel size: {:.4}arcsec, full size: {:.3}arcsec",
            self.pixel_size(),
            full_size
        );
        Grid::centered(self.nx, self.ny, full_size)
    }
}

fn float_key(value: Option<&HeaderValue>, key: &'static str) -> Result<f64> {
    match value {
        Some(HeaderValue::RealFloatingNumber(x)) => Ok(*x),
        Some(HeaderValue::IntegerNumber(x)) => Ok(*x as f64),
        _ => Err(FitsError::MissingKey(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        error::Error,
        fs::File,
        io::Write,
        path::{Path, PathBuf},
    };

    fn card(key: &str, value: &str) -> String {
        format!("{:<8}= {:>20}{:50}", key, value, "")
    }

    /// Writes a single HDU float32 FITS file
    fn write_fits(
        path: &Path,
        shape: &[usize],
        data: &[f32],
        keys: &[(&str, &str)],
    ) -> std::io::Result<()> {
        let mut header = vec![
            card("SIMPLE", "T"),
            card("BITPIX", "-32"),
            card("NAXIS", &shape.len().to_string()),
        ];
        for (i, n) in shape.iter().enumerate() {
            header.push(card(&format!("NAXIS{}", i + 1), &n.to_string()));
        }
        for (key, value) in keys {
            header.push(card(key, value));
        }
        header.push(format!("{:80}", "END"));
        let mut bytes: Vec<u8> = header.concat().into_bytes();
        bytes.resize(bytes.len().div_ceil(2880) * 2880, b' ');
        let mut payload: Vec<u8> = data.iter().flat_map(|x| x.to_be_bytes()).collect();
        payload.resize(payload.len().div_ceil(2880) * 2880, 0u8);
        bytes.extend(payload);
        File::create(path)?.write_all(&bytes)
    }

    const RADIO_KEYS: [(&str, &str); 4] = [
        ("CDELT1", "-2.0E-05"),
        ("BMAJ", "1.0E-05"),
        ("BMIN", "5.0E-06"),
        ("BPA", "30.0"),
    ];

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("moment-maps_{}_{}", std::process::id(), name))
    }

    #[test]
    fn open_radio_image() -> std::result::Result<(), Box<dyn Error>> {
        let path = temp_file("cube.fits");
        let data: Vec<f32> = (0..12).map(|x| x as f32).collect();
        // NAXIS3 and NAXIS4 are the degenerate frequency and Stokes axis
        write_fits(&path, &[4, 3, 1, 1], &data, &RADIO_KEYS)?;
        let image = FitsImage::open(&path)?;
        assert_eq!((image.nx(), image.ny()), (4, 3));
        assert_eq!(image.pixel(1, 2), Some(9.));
        assert!((image.pixel_size() - 0.072).abs() < 1e-9);
        let beam = image.beam();
        assert!((beam.major - 0.036).abs() < 1e-9);
        assert!((beam.minor - 0.018).abs() < 1e-9);
        assert_eq!(beam.position_angle, 30.);
        let grid = image.grid();
        assert!((grid.x[0] + 4. * 0.072 / 2.).abs() < 1e-9);
        assert!((grid.x[3] - 4. * 0.072 / 2.).abs() < 1e-9);
        assert_eq!(grid.ny(), 3);
        std::fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn missing_beam_keyword() -> std::result::Result<(), Box<dyn Error>> {
        let path = temp_file("nobeam.fits");
        write_fits(&path, &[2, 2], &[0f32; 4], &RADIO_KEYS[..2])?;
        let result = FitsImage::open(&path);
        assert!(matches!(result, Err(FitsError::MissingKey("BMIN"))));
        std::fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn missing_file() {
        let result = FitsImage::open(temp_file("does_not_exist.fits"));
        assert!(matches!(result, Err(FitsError::Io(_))));
    }

    #[test]
    fn size_mismatch() {
        let header = Header {
            cdelt1: -1. / 3600.,
            bmaj: 0.,
            bmin: 0.,
            bpa: 0.,
        };
        assert!(FitsImage::new(vec![0.; 5], 2, 2, header).is_err());
        let image = FitsImage::new(vec![0.; 6], 3, 2, header).unwrap();
        assert_eq!(image.pixel_size(), 1.);
        assert_eq!(image.pixel(3, 0), None);
    }
}
