//! Sky coordinate grid centered on the image phase center

/// Returns `n` evenly spaced samples over `[start, end]`
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// Pixel centers coordinates in arcsec
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
impl Grid {
    /// Creates a grid of `nx` by `ny` samples spanning `full_size` arcsec along both axis
    pub fn centered(nx: usize, ny: usize, full_size: f64) -> Self {
        let half = full_size * 0.5;
        Self {
            x: linspace(-half, half, nx),
            y: linspace(-half, half, ny),
        }
    }
    pub fn nx(&self) -> usize {
        self.x.len()
    }
    pub fn ny(&self) -> usize {
        self.y.len()
    }
    /// Returns the (min,max) range of the x coordinate
    pub fn x_range(&self) -> (f64, f64) {
        range(&self.x)
    }
    /// Returns the (min,max) range of the y coordinate
    pub fn y_range(&self) -> (f64, f64) {
        range(&self.y)
    }
    /// Maps a sky coordinate to the (column,row) of the pixel it falls into
    ///
    /// The image is stretched between the first and last samples of both axis, each pixel covering
    /// an equal share of that area
    pub fn pixel_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        if x < x0 || x > x1 || y < y0 || y > y1 || x1 <= x0 || y1 <= y0 {
            return None;
        }
        let col = (((x - x0) / (x1 - x0)) * self.nx() as f64).floor() as usize;
        let row = (((y - y0) / (y1 - y0)) * self.ny() as f64).floor() as usize;
        Some((col.min(self.nx() - 1), row.min(self.ny() - 1)))
    }
}

fn range(v: &[f64]) -> (f64, f64) {
    match (v.first(), v.last()) {
        (Some(&a), Some(&b)) => (a, b),
        _ => (0f64, 0f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_endpoints() {
        let v = linspace(-1., 1., 5);
        assert_eq!(v, vec![-1., -0.5, 0., 0.5, 1.]);
        assert_eq!(linspace(3., 4., 1), vec![3.]);
        assert!(linspace(3., 4., 0).is_empty());
    }

    #[test]
    fn centered_grid_span() {
        let (n, s) = (301usize, 0.05f64);
        let grid = Grid::centered(n, n, n as f64 * s);
        assert_eq!(grid.nx(), n);
        assert_eq!(grid.x[0], -(n as f64) * s / 2.);
        assert_eq!(grid.x[n - 1], n as f64 * s / 2.);
        assert_eq!(grid.x, grid.y);
    }

    #[test]
    fn pixel_lookup() {
        let grid = Grid::centered(4, 2, 4.);
        assert_eq!(grid.pixel_at(-2., -2.), Some((0, 0)));
        assert_eq!(grid.pixel_at(2., 2.), Some((3, 1)));
        assert_eq!(grid.pixel_at(0.1, 0.1), Some((2, 1)));
        assert_eq!(grid.pixel_at(2.5, 0.), None);
    }
}
