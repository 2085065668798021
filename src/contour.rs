//! Iso-intensity contours
//!
//! Contour levels are multiples of the image noise floor, geometrically spaced
//! and mirrored around zero so that negative artifacts show up as well.
//! Contour lines are traced with the marching squares algorithm.

use crate::grid::Grid;

/// Number of positive (and negative) contour levels
pub const N_LEVEL: usize = 5;

/// Returns `n` samples evenly spaced on a log scale over `[start, end]`
///
/// Samples are powers of ten of the evenly spaced decimal logarithms, both ends are exact
pub fn geomspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let log_start = start.log10();
            let step = (end.log10() - log_start) / (n - 1) as f64;
            (0..n)
                .map(|i| match i {
                    0 => start,
                    i if i == n - 1 => end,
                    i => 10f64.powf(log_start + i as f64 * step),
                })
                .collect()
        }
    }
}

/// Signed contour levels
///
/// `start` and `end` are expected to satisfy `0 < start < end`
pub fn contour_levels(start: f64, end: f64, noise: f64) -> Vec<f64> {
    let positive = geomspace(start, end, N_LEVEL);
    positive
        .iter()
        .rev()
        .map(|x| -x)
        .chain(positive.iter().copied())
        .map(|x| x * noise)
        .collect()
}

/// Contour levels in units of the image noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourLevels {
    pub start: f64,
    pub end: f64,
    pub noise: f64,
}
impl Default for ContourLevels {
    fn default() -> Self {
        Self {
            start: 5.,
            end: 405.,
            noise: 1.8528968e-05,
        }
    }
}
impl ContourLevels {
    pub fn start(self, start: f64) -> Self {
        Self { start, ..self }
    }
    pub fn end(self, end: f64) -> Self {
        Self { end, ..self }
    }
    pub fn noise(self, noise: f64) -> Self {
        Self { noise, ..self }
    }
    pub fn levels(&self) -> Vec<f64> {
        contour_levels(self.start, self.end, self.noise)
    }
}

/// Contour line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// Cell corners are taken counter-clockwise from the cell origin:
/// (i,j), (i+1,j), (i+1,j+1), (i,j+1)
/// and edges are numbered after their first corner
const EDGES: [[(usize, usize); 2]; 4] = [
    [(0, 0), (1, 0)],
    [(1, 0), (1, 1)],
    [(1, 1), (0, 1)],
    [(0, 1), (0, 0)],
];

/// Traces the `level` contour of the row-major `data` sampled on `grid`
///
/// Cells with a NaN corner are skipped
pub fn isolines(data: &[f64], grid: &Grid, level: f64) -> Vec<Segment> {
    let (nx, ny) = (grid.nx(), grid.ny());
    if nx < 2 || ny < 2 || data.len() != nx * ny {
        return vec![];
    }
    let value = |i: usize, j: usize| data[j * nx + i];
    let mut segments = vec![];
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let corners = [
                value(i, j),
                value(i + 1, j),
                value(i + 1, j + 1),
                value(i, j + 1),
            ];
            if corners.iter().any(|x| x.is_nan()) {
                continue;
            }
            let case = corners
                .iter()
                .enumerate()
                .filter(|&(_, &x)| x >= level)
                .fold(0u8, |case, (k, _)| case | (1 << k));
            let crossing = |edge: usize| -> (f64, f64) {
                let [(di0, dj0), (di1, dj1)] = EDGES[edge];
                let (v0, v1) = (value(i + di0, j + dj0), value(i + di1, j + dj1));
                let t = if v1 == v0 {
                    0.5
                } else {
                    ((level - v0) / (v1 - v0)).clamp(0., 1.)
                };
                let (x0, x1) = (grid.x[i + di0], grid.x[i + di1]);
                let (y0, y1) = (grid.y[j + dj0], grid.y[j + dj1]);
                (x0 + t * (x1 - x0), y0 + t * (y1 - y0))
            };
            let mut push = |a: usize, b: usize| {
                segments.push(Segment {
                    start: crossing(a),
                    end: crossing(b),
                })
            };
            match case {
                0 | 15 => (),
                1 | 14 => push(3, 0),
                2 | 13 => push(0, 1),
                3 | 12 => push(3, 1),
                4 | 11 => push(1, 2),
                6 | 9 => push(0, 2),
                7 | 8 => push(2, 3),
                5 | 10 => {
                    // saddle: the cell center decides which corners are connected
                    let center = corners.iter().sum::<f64>() * 0.25;
                    let center_above = center >= level;
                    if (case == 5) == center_above {
                        push(3, 2);
                        push(0, 1);
                    } else {
                        push(3, 0);
                        push(1, 2);
                    }
                }
                _ => unreachable!(),
            }
        }
    }
    segments
}

/// Contour lines of a reference image, shared by all the panels it is overlaid on
#[derive(Debug, Clone)]
pub struct ContourOverlay {
    lines: Vec<(f64, Vec<Segment>)>,
}
impl ContourOverlay {
    /// Traces all the `levels` contours of `data` sampled on `grid`
    pub fn new(data: &[f64], grid: &Grid, levels: &[f64]) -> Self {
        let lines: Vec<_> = levels
            .iter()
            .map(|&level| (level, isolines(data, grid, level)))
            .collect();
        log::debug!(
            "{} contour segments over {} levels",
            lines.iter().map(|(_, s)| s.len()).sum::<usize>(),
            lines.len()
        );
        Self { lines }
    }
    /// Iterator over the contour levels and their segments
    pub fn iter(&self) -> impl Iterator<Item = &(f64, Vec<Segment>)> {
        self.lines.iter()
    }
    pub fn levels(&self) -> Vec<f64> {
        self.lines.iter().map(|(level, _)| *level).collect()
    }
    /// Iterator over all the segments
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.lines.iter().flat_map(|(_, segments)| segments.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
    }

    #[test]
    fn geomspace_ratio() {
        let v = geomspace(5., 405., 5);
        let expected = [5., 15., 45., 135., 405.];
        assert_eq!(v.len(), 5);
        assert!(v.iter().zip(expected).all(|(a, b)| close(*a, b)));
        assert_eq!(v[0], 5.);
        assert_eq!(v[4], 405.);
    }

    #[test]
    fn geomspace_decimal_log_samples() {
        assert_eq!(
            geomspace(5., 405., 5),
            vec![5.0, 15.000000000000004, 45.00000000000003, 135.0, 405.0]
        );
    }

    #[test]
    fn default_levels() {
        let noise = 1.8528968e-05;
        let levels = ContourLevels::default().levels();
        assert_eq!(levels.len(), 2 * N_LEVEL);
        let positive: Vec<f64> = [5.0, 15.000000000000004, 45.00000000000003, 135.0, 405.0]
            .into_iter()
            .map(|x| x * noise)
            .collect();
        assert_eq!(&levels[N_LEVEL..], positive.as_slice());
        let negative: Vec<f64> = positive.iter().rev().map(|x| -x).collect();
        assert_eq!(&levels[..N_LEVEL], negative.as_slice());
    }

    #[test]
    fn levels_are_ordered() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let start = rng.gen_range(0.1..10.);
            let end = start + rng.gen_range(0.1..1000.);
            let noise = rng.gen_range(1e-6..1e-3);
            let levels = contour_levels(start, end, noise);
            assert_eq!(levels.len(), 10);
            assert!(levels[..5].iter().all(|x| *x < 0.));
            assert!(levels[5..].iter().all(|x| *x > 0.));
            assert!(levels.windows(2).all(|w| w[0] < w[1]));
            assert!(close(levels[5], start * noise));
            assert!(close(levels[9], end * noise));
            assert!(close(levels[0], -end * noise));
        }
    }

    #[test]
    fn single_peak_is_enclosed() {
        let grid = Grid::centered(5, 5, 4.);
        let mut data = vec![0f64; 25];
        data[12] = 1.;
        let segments = isolines(&data, &grid, 0.5);
        // one segment per cell around the peak
        assert_eq!(segments.len(), 4);
        for s in &segments {
            for (x, y) in [s.start, s.end] {
                assert!(close(x.abs() + y.abs(), 0.5) || (x.abs() - 0.5).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn nan_cells_are_skipped() {
        let grid = Grid::centered(3, 3, 2.);
        let mut data = vec![0f64, 0., 0., 0., 1., 0., 0., 0., 0.];
        assert_eq!(isolines(&data, &grid, 0.5).len(), 4);
        data[0] = f64::NAN;
        assert_eq!(isolines(&data, &grid, 0.5).len(), 3);
        assert!(isolines(&data[..8], &grid, 0.5).is_empty());
    }

    #[test]
    fn vertical_edge_interpolation() {
        let grid = Grid::centered(2, 2, 1.);
        let data = [0., 1., 0., 1.];
        let segments = isolines(&data, &grid, 0.25);
        assert_eq!(segments.len(), 1);
        let Segment { start, end } = segments[0];
        assert!(close(start.0, -0.25) && close(end.0, -0.25));
    }

    #[test]
    fn overlay_levels() {
        let grid = Grid::centered(3, 3, 2.);
        let data = vec![0f64, 0., 0., 0., 1., 0., 0., 0., 0.];
        let overlay = ContourOverlay::new(&data, &grid, &[-0.5, 0.5, 2.]);
        assert_eq!(overlay.levels(), vec![-0.5, 0.5, 2.]);
        assert_eq!(overlay.segments().count(), 4);
    }
}
