//! Discretized cylindrical shell and cylindrical-to-Cartesian conversion
//!
//! The sampler owns the coordinate-system crossing: field models work in
//! `(r, z)` and hand their components back here to get Cartesian vectors.

use std::f64::consts::PI;
use std::sync::OnceLock;

use nalgebra::{Point3, Vector3};

use crate::error::{FieldError, Result};

/// Floor applied to radii and magnitudes before dividing by them
pub const NUMERIC_FLOOR: f64 = 1e-15;

const MIN_RADIAL_SAMPLES: usize = 10;
const MIN_ANGULAR_SAMPLES: usize = 20;
const MIN_AXIAL_SAMPLES: usize = 5;

/// Upper bound on grid samples; finer pitches are rejected before allocating
pub const MAX_SAMPLES: usize = 16_000_000;

/// Per-axis sample coordinates of the shell
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalGrid {
    /// Radii from `r_i` to `r_o`, both included
    pub r: Vec<f64>,
    /// Angles over `[0, 2π)`, seam excluded
    pub theta: Vec<f64>,
    /// Axial positions from `-L/2` to `L/2`, both included
    pub z: Vec<f64>,
}

impl CylindricalGrid {
    /// Total number of samples in the outer product
    pub fn len(&self) -> usize {
        self.r
            .len()
            .saturating_mul(self.theta.len())
            .saturating_mul(self.z.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cartesian view of a cylindrical vector field
#[derive(Debug, Clone)]
pub struct CartesianField {
    pub points: Vec<Point3<f64>>,
    /// Field direction; the zero vector where the field vanishes
    pub unit_vectors: Vec<Vector3<f64>>,
    /// Raw Euclidean norm of each field vector
    pub magnitudes: Vec<f64>,
}

/// Hollow cylinder between `r_i` and `r_o`, centred on the origin along z.
///
/// The grid and the flattened points are computed on first access and kept
/// for the lifetime of the instance.
#[derive(Debug, Clone)]
pub struct CylinderGeometry {
    r_i: f64,
    r_o: f64,
    length: f64,
    spacing: f64,
    counts: (usize, usize, usize),
    grid: OnceLock<CylindricalGrid>,
    points: OnceLock<Vec<Point3<f64>>>,
    rz: OnceLock<(Vec<f64>, Vec<f64>)>,
}

impl CylinderGeometry {
    pub fn new(r_i: f64, r_o: f64, length: f64, spacing: f64) -> Result<Self> {
        let counts = checked_sample_counts(r_i, r_o, length, spacing)?;

        Ok(Self {
            r_i,
            r_o,
            length,
            spacing,
            counts,
            grid: OnceLock::new(),
            points: OnceLock::new(),
            rz: OnceLock::new(),
        })
    }

    pub fn inner_radius(&self) -> f64 {
        self.r_i
    }

    pub fn outer_radius(&self) -> f64 {
        self.r_o
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Sample counts along radius, angle and axis after minimum clamping
    pub fn sample_counts(&self) -> (usize, usize, usize) {
        self.counts
    }

    pub fn grid(&self) -> &CylindricalGrid {
        self.grid
            .get_or_init(|| build_grid(self.r_i, self.r_o, self.length, self.spacing, self.counts))
    }

    /// Cartesian sample points, radius-major, then angle, then axial position
    pub fn points(&self) -> &[Point3<f64>] {
        self.points.get_or_init(|| to_cartesian_points(self.grid()))
    }

    /// Cylindrical radius and axial position of every sample, in point order.
    ///
    /// Radii are taken from the grid rather than recovered from `x, y`, so a
    /// sample generated on `r = r_d` reports exactly `r_d`.
    pub fn rz_coordinates(&self) -> (&[f64], &[f64]) {
        let (r, z) = self.rz.get_or_init(|| {
            let grid = self.grid();
            let n = grid.len();
            let mut r = Vec::with_capacity(n);
            let mut z = Vec::with_capacity(n);
            for &radius in &grid.r {
                for _ in &grid.theta {
                    for &axial in &grid.z {
                        r.push(radius);
                        z.push(axial);
                    }
                }
            }
            (r, z)
        });
        (r.as_slice(), z.as_slice())
    }

    pub fn len(&self) -> usize {
        self.grid().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest absolute Cartesian coordinate over all samples
    pub fn extent(&self) -> f64 {
        extent_of(self.points())
    }

    /// Convert components sampled on this geometry's own points
    pub fn field_to_cartesian(&self, er: &[f64], ez: &[f64]) -> Result<CartesianField> {
        field_to_cartesian(self.points(), er, ez)
    }
}

fn sample_count(extent: f64, spacing: f64, minimum: usize) -> usize {
    // `as` saturates, so an absurd ratio still yields a comparable count
    ((extent / spacing).floor() as usize).max(minimum)
}

/// Validate the shell and return its per-axis counts, rejecting grids whose
/// outer product exceeds [`MAX_SAMPLES`]
fn checked_sample_counts(r_i: f64, r_o: f64, length: f64, spacing: f64) -> Result<(usize, usize, usize)> {
    if !(r_i.is_finite() && r_i > 0.0) {
        return Err(FieldError::InvalidGeometry(format!(
            "inner radius must be positive, got {}",
            r_i
        )));
    }
    if !(r_o.is_finite() && r_o > r_i) {
        return Err(FieldError::InvalidGeometry(format!(
            "outer radius {} must exceed inner radius {}",
            r_o, r_i
        )));
    }
    if !(length.is_finite() && length > 0.0) {
        return Err(FieldError::InvalidGeometry(format!(
            "length must be positive, got {}",
            length
        )));
    }
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(FieldError::InvalidGeometry(format!(
            "spacing must be positive, got {}",
            spacing
        )));
    }

    let (n_r, n_theta, n_z) = sample_counts(r_i, r_o, length, spacing);
    match n_r.checked_mul(n_theta).and_then(|n| n.checked_mul(n_z)) {
        Some(n) if n <= MAX_SAMPLES => Ok((n_r, n_theta, n_z)),
        _ => Err(FieldError::InvalidGeometry(format!(
            "spacing {} gives {} x {} x {} samples, above the limit of {}",
            spacing, n_r, n_theta, n_z, MAX_SAMPLES
        ))),
    }
}

fn sample_counts(r_i: f64, r_o: f64, length: f64, spacing: f64) -> (usize, usize, usize) {
    let n_r = sample_count(r_o - r_i, spacing, MIN_RADIAL_SAMPLES);
    // Mean circumference of the shell
    let n_theta = sample_count(PI * (r_i + r_o), spacing, MIN_ANGULAR_SAMPLES);
    let n_z = sample_count(length, spacing, MIN_AXIAL_SAMPLES);
    (n_r, n_theta, n_z)
}

/// `n` evenly spaced values from `start` to `stop`, both included
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            // Pin the endpoint so rounding never pushes it past `stop`
            values[n - 1] = stop;
            values
        }
    }
}

/// Discretize the shell `r_i ≤ r ≤ r_o`, `|z| ≤ L/2` with pitch `spacing`.
pub fn generate_grid(r_i: f64, r_o: f64, length: f64, spacing: f64) -> Result<CylindricalGrid> {
    let counts = checked_sample_counts(r_i, r_o, length, spacing)?;
    Ok(build_grid(r_i, r_o, length, spacing, counts))
}

fn build_grid(
    r_i: f64,
    r_o: f64,
    length: f64,
    spacing: f64,
    (n_r, n_theta, n_z): (usize, usize, usize),
) -> CylindricalGrid {

    tracing::debug!(
        "Cylinder grid: n_r={}, n_theta={}, n_z={} (spacing={})",
        n_r,
        n_theta,
        n_z,
        spacing
    );
    if ((r_o - r_i) / spacing).floor() < MIN_RADIAL_SAMPLES as f64 {
        tracing::debug!("Radial sampling clamped to {} points", MIN_RADIAL_SAMPLES);
    }

    let half_l = length / 2.0;
    let dtheta = 2.0 * PI / n_theta as f64;

    CylindricalGrid {
        r: linspace(r_i, r_o, n_r),
        theta: (0..n_theta).map(|k| k as f64 * dtheta).collect(),
        z: linspace(-half_l, half_l, n_z),
    }
}

/// Largest absolute Cartesian coordinate of `points`, 0 when empty
pub fn extent_of(points: &[Point3<f64>]) -> f64 {
    points.iter().map(|p| p.coords.amax()).fold(0.0, f64::max)
}

/// Outer product of the grid axes as Cartesian points.
///
/// Enumeration is radius-major, then angle, then axial position; every
/// per-sample array in the crate follows this order.
pub fn to_cartesian_points(grid: &CylindricalGrid) -> Vec<Point3<f64>> {
    let mut points = Vec::with_capacity(grid.len());
    for &r in &grid.r {
        for &theta in &grid.theta {
            let (sin, cos) = theta.sin_cos();
            for &z in &grid.z {
                points.push(Point3::new(r * cos, r * sin, z));
            }
        }
    }
    points
}

/// Turn radial/axial components into Cartesian unit vectors and magnitudes.
///
/// `Ex = Er·x/r`, `Ey = Er·y/r` with `r` floored at [`NUMERIC_FLOOR`]; the
/// unit vector divides by the magnitude floored the same way.
pub fn field_to_cartesian(points: &[Point3<f64>], er: &[f64], ez: &[f64]) -> Result<CartesianField> {
    if er.len() != points.len() || ez.len() != points.len() {
        tracing::warn!(
            "Field components do not match sample count: points={}, er={}, ez={}",
            points.len(),
            er.len(),
            ez.len()
        );
        return Err(FieldError::ShapeMismatch {
            points: points.len(),
            er: er.len(),
            ez: ez.len(),
        });
    }

    let mut unit_vectors = Vec::with_capacity(points.len());
    let mut magnitudes = Vec::with_capacity(points.len());

    for ((p, &e_r), &e_z) in points.iter().zip(er).zip(ez) {
        let r_safe = (p.x * p.x + p.y * p.y).sqrt().max(NUMERIC_FLOOR);
        let vector = Vector3::new(e_r * p.x / r_safe, e_r * p.y / r_safe, e_z);

        let mag = vector.norm();
        unit_vectors.push(vector / mag.max(NUMERIC_FLOOR));
        magnitudes.push(mag);
    }

    Ok(CartesianField {
        points: points.to_vec(),
        unit_vectors,
        magnitudes,
    })
}
