//! Electrostatic field of a finite coaxial capacitor with a layered dielectric
//!
//! The gap is modelled as a gas layer `r_a ≤ r < r_d` and a solid dielectric
//! `r_d ≤ r ≤ r_b`. The field is the closed-form field of a uniformly charged
//! finite cylindrical shell: the infinite-cylinder term `V₀·G/r` corrected by
//! two semi-infinite line contributions evaluated at the end caps. The same
//! expression serves both layers; dielectric samples are rescaled by
//! `ε_d/ε_gas`.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CapacitorConfig;
use crate::error::{FieldError, Result};
use crate::geometry::{CylinderGeometry, NUMERIC_FLOOR};

/// Medium a sample lies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Region {
    Gas = 0,
    Dielectric = 1,
}

impl Region {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Four parallel per-sample arrays; index `i` is the same physical sample in each
#[derive(Debug, Clone)]
pub struct FieldSolution {
    pub points: Vec<Point3<f64>>,
    pub unit_vectors: Vec<Vector3<f64>>,
    pub magnitudes: Vec<f64>,
    pub regions: Vec<Region>,
}

impl FieldSolution {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of (gas, dielectric) samples
    pub fn region_counts(&self) -> (usize, usize) {
        let dielectric = self.regions.iter().filter(|&&r| r == Region::Dielectric).count();
        (self.regions.len() - dielectric, dielectric)
    }

    /// Magnitudes of samples in `region`, NaN everywhere else
    pub fn masked_magnitudes(&self, region: Region) -> Vec<f64> {
        self.magnitudes
            .iter()
            .zip(&self.regions)
            .map(|(&mag, &r)| if r == region { mag } else { f64::NAN })
            .collect()
    }

    pub fn peak_magnitude(&self) -> f64 {
        self.magnitudes.iter().copied().fold(0.0, f64::max)
    }
}

/// Field evaluator for one capacitor configuration
#[derive(Debug, Clone)]
pub struct DielectricField {
    config: CapacitorConfig,
    geometric_factor: f64,
    geometry: CylinderGeometry,
}

impl DielectricField {
    pub fn new(config: CapacitorConfig) -> Result<Self> {
        config.validate()?;

        let geometric_factor = geometric_factor(&config)?;
        let geometry = CylinderGeometry::new(config.r_a, config.r_b, config.length, config.spacing)?;

        tracing::debug!(
            "Dielectric field: G={:.6e}, eps_d/eps_gas={}, {} samples",
            geometric_factor,
            config.permittivity_ratio(),
            geometry.len()
        );

        Ok(Self {
            config,
            geometric_factor,
            geometry,
        })
    }

    pub fn config(&self) -> &CapacitorConfig {
        &self.config
    }

    pub fn geometry(&self) -> &CylinderGeometry {
        &self.geometry
    }

    pub fn geometric_factor(&self) -> f64 {
        self.geometric_factor
    }

    /// Gas-layer expression for `(Er, Ez)` at one sample, before any
    /// dielectric rescaling. The radius is floored to stay finite on the axis.
    pub fn field_at(&self, r: f64, z: f64) -> (f64, f64) {
        let r = r.max(NUMERIC_FLOOR);
        let half_l = self.config.length / 2.0;
        let scale = self.config.voltage * self.geometric_factor;

        let d_plus = (r * r + (z + half_l).powi(2)).sqrt();
        let d_minus = (r * r + (z - half_l).powi(2)).sqrt();

        let term1 = (z + half_l) / d_plus;
        let term2 = (z - half_l) / d_minus;
        let axial_factor = (term1 - term2) / 2.0;

        let er = scale / r * axial_factor;
        let ez = scale * (1.0 / d_minus - 1.0 / d_plus);
        (er, ez)
    }

    /// `Dielectric` iff `r ≥ r_d`
    pub fn region_of(&self, r: f64) -> Region {
        if r.max(NUMERIC_FLOOR) >= self.config.r_d {
            Region::Dielectric
        } else {
            Region::Gas
        }
    }

    /// Region label of every sample, in enumeration order
    pub fn regions(&self) -> Vec<Region> {
        let (r, _) = self.geometry.rz_coordinates();
        r.iter().map(|&r| self.region_of(r)).collect()
    }

    /// Corrected `(Er, Ez)` of every sample, in enumeration order
    pub fn components(&self) -> (Vec<f64>, Vec<f64>) {
        let (r, z) = self.geometry.rz_coordinates();
        let ratio = self.config.permittivity_ratio();

        r.par_iter()
            .zip(z.par_iter())
            .map(|(&r, &z)| {
                let (er, ez) = self.field_at(r, z);
                match self.region_of(r) {
                    Region::Dielectric => (er * ratio, ez * ratio),
                    Region::Gas => (er, ez),
                }
            })
            .unzip()
    }

    /// Sample the field over the whole shell
    pub fn calculate_field(&self) -> Result<FieldSolution> {
        let (er, ez) = self.components();
        let cartesian = self.geometry.field_to_cartesian(&er, &ez)?;
        let regions = self.regions();

        let solution = FieldSolution {
            points: cartesian.points,
            unit_vectors: cartesian.unit_vectors,
            magnitudes: cartesian.magnitudes,
            regions,
        };

        let (gas, dielectric) = solution.region_counts();
        tracing::info!(
            "Computed field: {} samples ({} gas, {} dielectric), peak |E| = {:.3e} V/m",
            solution.len(),
            gas,
            dielectric,
            solution.peak_magnitude()
        );

        Ok(solution)
    }

    /// Mean relative deviation of `Er` from the infinite-cylinder field `V₀·G/r`.
    ///
    /// Both sides carry the same dielectric rescaling, so per sample the error
    /// reduces to `1 − axial_factor`; the result lies in `(0, 1)` for any
    /// finite electrode length.
    pub fn mean_radial_error(&self) -> f64 {
        let (r, z) = self.geometry.rz_coordinates();
        if r.is_empty() {
            return 0.0;
        }
        let scale = self.config.voltage * self.geometric_factor;

        let errors: Vec<f64> = r
            .par_iter()
            .zip(z.par_iter())
            .map(|(&r, &z)| {
                let ideal = scale / r.max(NUMERIC_FLOOR);
                let (er, _) = self.field_at(r, z);
                ((ideal - er) / ideal).abs()
            })
            .collect();

        // Sequential sum keeps the result bit-identical across runs
        errors.iter().sum::<f64>() / errors.len() as f64
    }
}

/// `G = ε_gas / (ε_gas·ln(r_d/r_a) + ε_d·ln(r_b/r_d))`
///
/// Rejects configs that break `r_a < r_d < r_b` or carry non-positive values,
/// so both logarithms are strictly positive.
pub fn geometric_factor(config: &CapacitorConfig) -> Result<f64> {
    config.validate()?;

    let gas_ratio = config.r_d / config.r_a;
    let dielectric_ratio = config.r_b / config.r_d;

    let denominator =
        config.eps_gas * gas_ratio.ln() + config.eps_dielectric * dielectric_ratio.ln();
    let factor = config.eps_gas / denominator;
    if denominator == 0.0 || !factor.is_finite() {
        return Err(FieldError::InvalidGeometry(format!(
            "degenerate permittivity sum {}",
            denominator
        )));
    }

    Ok(factor)
}
