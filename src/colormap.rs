//! Intensity to color mapping

use colorous::{Color, Gradient};
use itertools::Itertools;
use strum_macros::{Display, EnumString};

#[derive(Debug, thiserror::Error)]
pub enum ColormapError {
    #[error("cannot compute the range of an image with only NaN values")]
    Empty,
    #[error("percentile {0} is outside [0,100]")]
    Percentile(f64),
}
type Result<T> = std::result::Result<T, ColormapError>;

/// Palette size
pub const N_COLOR: usize = 256;
/// Color of not-a-number pixels
pub const NAN_COLOR: Color = Color {
    r: 255,
    g: 255,
    b: 255,
};

/// Color gradients
#[derive(Debug, Clone, Copy, PartialEq, EnumString, Display)]
pub enum Palette {
    #[strum(serialize = "inferno")]
    Inferno,
    #[strum(serialize = "spectral")]
    Spectral,
    #[strum(serialize = "rdbu")]
    RedBlue,
    #[strum(serialize = "cubehelix")]
    Cubehelix,
}
impl Palette {
    fn gradient(&self) -> Gradient {
        match self {
            Palette::Inferno => colorous::INFERNO,
            Palette::Spectral => colorous::SPECTRAL,
            Palette::RedBlue => colorous::RED_BLUE,
            Palette::Cubehelix => colorous::CUBEHELIX,
        }
    }
    /// Samples the gradient into `n` colors
    pub fn colors(&self, n: usize) -> Vec<Color> {
        let gradient = self.gradient();
        (0..n).map(|i| gradient.eval_rational(i, n)).collect()
    }
    /// Samples the gradient into `n` colors, last color first
    pub fn reversed(&self, n: usize) -> Vec<Color> {
        let mut colors = self.colors(n);
        colors.reverse();
        colors
    }
}

/// Returns the `q`th percentile of `data`, NaN entries are ignored
///
/// Ranks falling between two samples are linearly interpolated
pub fn percentile(data: &[f64], q: f64) -> Result<f64> {
    if !(0f64..=100f64).contains(&q) {
        return Err(ColormapError::Percentile(q));
    }
    let sorted: Vec<f64> = data
        .iter()
        .copied()
        .filter(|x| !x.is_nan())
        .sorted_by(|a, b| a.total_cmp(b))
        .collect();
    if sorted.is_empty() {
        return Err(ColormapError::Empty);
    }
    let rank = q / 100. * (sorted.len() - 1) as f64;
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    let t = rank - lo as f64;
    Ok(sorted[lo] + t * (sorted[hi] - sorted[lo]))
}

/// Returns the (min,max) range of `data`, NaN entries are ignored
pub fn value_range(data: &[f64]) -> Result<(f64, f64)> {
    data.iter()
        .copied()
        .filter(|x| !x.is_nan())
        .minmax_by(|a, b| a.total_cmp(b))
        .into_option()
        .ok_or(ColormapError::Empty)
}

/// Linear mapping of values in [low,high] onto a palette
#[derive(Debug, Clone)]
pub struct ColorMapper {
    palette: Vec<Color>,
    low: f64,
    high: f64,
}
impl ColorMapper {
    pub fn new(palette: Vec<Color>, low: f64, high: f64) -> Self {
        Self {
            palette,
            low,
            high,
        }
    }
    /// Creates a mapper with `low` and `high` set to the 0th and 100th percentiles of `data`
    /// when they are not given
    pub fn stretch(
        palette: Vec<Color>,
        data: &[f64],
        low: Option<f64>,
        high: Option<f64>,
    ) -> Result<Self> {
        let (low, high) = match (low, high) {
            (Some(low), Some(high)) => (low, high),
            (low, high) => {
                let (min, max) = value_range(data)?;
                (low.unwrap_or(min), high.unwrap_or(max))
            }
        };
        log::debug!("color range: [{:e},{:e}]", low, high);
        Ok(Self::new(palette, low, high))
    }
    pub fn low(&self) -> f64 {
        self.low
    }
    pub fn high(&self) -> f64 {
        self.high
    }
    /// Color of `value`, values outside [low,high] are clipped to the palette ends
    pub fn color(&self, value: f64) -> Color {
        if value.is_nan() || self.palette.is_empty() {
            return NAN_COLOR;
        }
        let n = self.palette.len();
        let span = self.high - self.low;
        let idx = if span > 0f64 {
            (((value - self.low) / span) * n as f64).floor()
        } else if value > self.low {
            n as f64
        } else {
            0f64
        };
        self.palette[(idx.max(0f64) as usize).min(n - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn percentile_interpolation() {
        let data = [4., 1., f64::NAN, 3., 2.];
        assert_eq!(percentile(&data, 0.).unwrap(), 1.);
        assert_eq!(percentile(&data, 100.).unwrap(), 4.);
        assert_eq!(percentile(&data, 50.).unwrap(), 2.5);
        assert!((percentile(&data, 10.).unwrap() - 1.3).abs() < 1e-12);
        assert!(matches!(
            percentile(&data, 101.),
            Err(ColormapError::Percentile(_))
        ));
        assert!(matches!(
            percentile(&[f64::NAN], 50.),
            Err(ColormapError::Empty)
        ));
    }

    #[test]
    fn default_range_is_min_max() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let data: Vec<f64> = (0..500)
                .map(|_| {
                    if rng.gen_bool(0.1) {
                        f64::NAN
                    } else {
                        rng.gen_range(-1e-3..1e-2)
                    }
                })
                .collect();
            let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let mapper = ColorMapper::stretch(Palette::Inferno.colors(N_COLOR), &data, None, None)
                .unwrap();
            assert_eq!((mapper.low(), mapper.high()), (min, max));
            assert_eq!(percentile(&data, 0.).unwrap(), min);
            assert_eq!(percentile(&data, 100.).unwrap(), max);
        }
    }

    #[test]
    fn explicit_bound() {
        let data = [0., 1., 2.];
        let mapper =
            ColorMapper::stretch(Palette::Spectral.colors(8), &data, Some(-1.), None).unwrap();
        assert_eq!((mapper.low(), mapper.high()), (-1., 2.));
    }

    #[test]
    fn clipping_and_nan() {
        let palette = Palette::RedBlue.colors(N_COLOR);
        let (first, last) = (palette[0], palette[N_COLOR - 1]);
        let mapper = ColorMapper::new(palette, 0., 1.);
        assert_eq!(mapper.color(-5.).as_tuple(), first.as_tuple());
        assert_eq!(mapper.color(0.).as_tuple(), first.as_tuple());
        assert_eq!(mapper.color(1.).as_tuple(), last.as_tuple());
        assert_eq!(mapper.color(5.).as_tuple(), last.as_tuple());
        assert_eq!(mapper.color(f64::NAN).as_tuple(), (255, 255, 255));
    }

    #[test]
    fn reversed_palette() {
        let colors = Palette::Spectral.colors(16);
        let reversed = Palette::Spectral.reversed(16);
        assert_eq!(colors[0].as_tuple(), reversed[15].as_tuple());
        assert_eq!(colors[15].as_tuple(), reversed[0].as_tuple());
        assert_eq!("rdbu".parse::<Palette>().unwrap(), Palette::RedBlue);
        assert_eq!("cubehelix".parse::<Palette>().unwrap(), Palette::Cubehelix);
    }
}
