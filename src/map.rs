//! J-factor sky maps
//!
//! The sky is sampled on a longitude-latitude grid of uniform spacing; every
//! cell J-factor is weighted by the cell solid angle (aperture). Cells are
//! evaluated in parallel and a failed cell does not abort the map: it is set to
//! `NaN` and reported in [FactorMap::failures].

use std::{f64::consts::FRAC_PI_2, fmt, ops::Index, time::Instant};

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::{
    coordinates::{angular_separation, aperture},
    error::{Error, Result},
    jfactor::{j_factor, FactorType},
    profile::DensityProfile,
    quadrature::QuadOptions,
};

// rounding allowance on the pole edges of a full sky grid
const LATITUDE_SLACK: f64 = 1e-9;

/// Galactic longitude and latitude grids [rad] with their uniform spacing [rad]
#[derive(Debug, Clone, PartialEq)]
pub struct AngularGrid {
    l: DMatrix<f64>,
    b: DMatrix<f64>,
    delta_l: f64,
    delta_b: f64,
}
impl AngularGrid {
    /// Creates a grid from the longitudes `l` and latitudes `b` of the cell centers
    pub fn new(l: DMatrix<f64>, b: DMatrix<f64>, delta_l: f64, delta_b: f64) -> Result<Self> {
        if l.shape() != b.shape() {
            return Err(Error::invalid(format!(
                "longitude and latitude grids shape mismatch: {:?} vs {:?}",
                l.shape(),
                b.shape()
            )));
        }
        for (name, delta) in [("longitude", delta_l), ("latitude", delta_b)] {
            if !(delta.is_finite() && delta > 0.) {
                return Err(Error::invalid(format!(
                    "{name} spacing must be finite and positive, found {delta}"
                )));
            }
        }
        if let Some(x) = l.iter().chain(b.iter()).find(|x| !x.is_finite()) {
            return Err(Error::invalid(format!("non finite grid coordinate: {x}")));
        }
        // latitude bands must stay within the poles for the apertures to be solid angles
        if let Some(x) = b
            .iter()
            .find(|b| b.abs() + 0.5 * delta_b > FRAC_PI_2 + LATITUDE_SLACK)
        {
            return Err(Error::invalid(format!(
                "latitude band {x}+/-{} rad extends beyond the poles",
                0.5 * delta_b
            )));
        }
        Ok(Self {
            l,
            b,
            delta_l,
            delta_b,
        })
    }
    /// Regular grid of `n_l` x `n_b` cells spanning `l_range` x `b_range`
    ///
    /// Rows run along latitude and columns along longitude.
    /// `b_range` must lie within `[-pi/2, pi/2]`.
    pub fn regular(
        l_range: (f64, f64),
        n_l: usize,
        b_range: (f64, f64),
        n_b: usize,
    ) -> Result<Self> {
        for (name, (lo, hi), n) in [("longitude", l_range, n_l), ("latitude", b_range, n_b)] {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) || n == 0 {
                return Err(Error::invalid(format!(
                    "invalid {name} sampling: {n} cells in [{lo}, {hi}]"
                )));
            }
        }
        let delta_l = (l_range.1 - l_range.0) / n_l as f64;
        let delta_b = (b_range.1 - b_range.0) / n_b as f64;
        let l = DMatrix::from_fn(n_b, n_l, |_, j| l_range.0 + (j as f64 + 0.5) * delta_l);
        let b = DMatrix::from_fn(n_b, n_l, |i, _| b_range.0 + (i as f64 + 0.5) * delta_b);
        Self::new(l, b, delta_l, delta_b)
    }
    /// Number of (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.l.shape()
    }
    pub fn len(&self) -> usize {
        self.l.len()
    }
    pub fn is_empty(&self) -> bool {
        self.l.is_empty()
    }
    pub fn longitudes(&self) -> &DMatrix<f64> {
        &self.l
    }
    pub fn latitudes(&self) -> &DMatrix<f64> {
        &self.b
    }
    pub fn delta_l(&self) -> f64 {
        self.delta_l
    }
    pub fn delta_b(&self) -> f64 {
        self.delta_b
    }
    /// The cell at the row-major index `k`
    pub fn cell(&self, k: usize) -> Cell {
        let ncols = self.l.ncols();
        let (row, col) = (k / ncols, k % ncols);
        Cell {
            row,
            col,
            l: self.l[(row, col)],
            b: self.b[(row, col)],
        }
    }
    /// Iterator over the cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.len()).map(move |k| self.cell(k))
    }
    /// Cell solid angles [sr]
    pub fn apertures(&self) -> DMatrix<f64> {
        self.b.map(|b| aperture(b, self.delta_l, self.delta_b))
    }
    /// Angles [rad] between the cell centers and the Galactic center
    pub fn thetas(&self) -> DMatrix<f64> {
        self.l.zip_map(&self.b, angular_separation)
    }
}

/// Grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub l: f64,
    pub b: f64,
}
impl Cell {
    /// Angle [rad] to the Galactic center
    pub fn theta(&self) -> f64 {
        angular_separation(self.l, self.b)
    }
    /// Solid angle [sr] of the cell
    pub fn aperture(&self, delta_l: f64, delta_b: f64) -> f64 {
        aperture(self.b, delta_l, delta_b)
    }
}

/// Cell solid angles [sr]
pub fn apertures_map(grid: &AngularGrid) -> DMatrix<f64> {
    grid.apertures()
}

/// A grid cell where the J-factor could not be computed
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("J-factor failed in cell ({row}, {col}) at l={l} rad, b={b} rad (theta={theta} rad)")]
pub struct CellError {
    pub row: usize,
    pub col: usize,
    pub l: f64,
    pub b: f64,
    pub theta: f64,
    #[source]
    pub source: Error,
}

/// Aperture weighted J-factors
#[derive(Debug, Clone)]
pub struct FactorMap {
    values: DMatrix<f64>,
    failures: Vec<CellError>,
}
impl FactorMap {
    /// The map, failed cells are `NaN`
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }
    pub fn into_values(self) -> DMatrix<f64> {
        self.values
    }
    /// Failed cells in row-major order
    pub fn failures(&self) -> &[CellError] {
        &self.failures
    }
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
    /// The cell value, `None` if the cell failed
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied().filter(|x| !x.is_nan())
    }
    /// Sum of the valid cells
    pub fn total(&self) -> f64 {
        self.values.iter().filter(|x| !x.is_nan()).sum()
    }
}
impl Index<(usize, usize)> for FactorMap {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.values[index]
    }
}
impl fmt::Display for FactorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nrows, ncols) = self.values.shape();
        write!(
            f,
            "{nrows}x{ncols} J-factor map: total={:.6e}, {} failed cells",
            self.total(),
            self.failures.len()
        )
    }
}

/// J-factors of `profile` in the cells of `grid` weighted by the cell apertures
pub fn j_factor_map<P>(
    profile: &P,
    grid: &AngularGrid,
    factor: FactorType,
    options: &QuadOptions,
) -> FactorMap
where
    P: DensityProfile + ?Sized,
{
    let now = Instant::now();
    let (nrows, ncols) = grid.shape();
    let cells: Vec<std::result::Result<f64, CellError>> = (0..grid.len())
        .into_par_iter()
        .map(|k| {
            let cell = grid.cell(k);
            let theta = cell.theta();
            j_factor(profile, theta, factor, options)
                .map(|j| cell.aperture(grid.delta_l, grid.delta_b) * j.value)
                .map_err(|source| CellError {
                    row: cell.row,
                    col: cell.col,
                    l: cell.l,
                    b: cell.b,
                    theta,
                    source,
                })
        })
        .collect();
    let mut failures = vec![];
    let values: Vec<f64> = cells
        .into_iter()
        .map(|cell| match cell {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{e}: {}", e.source);
                failures.push(e);
                f64::NAN
            }
        })
        .collect();
    log::info!(
        "{} {factor} J-factor map ({nrows}x{ncols}) computed in {}ms",
        profile.label(),
        now.elapsed().as_millis()
    );
    FactorMap {
        values: DMatrix::from_row_slice(nrows, ncols, &values),
        failures,
    }
}
