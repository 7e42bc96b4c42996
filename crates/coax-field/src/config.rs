//! Physical configuration of the layered coaxial capacitor
//!
//! All quantities are SI: farads per metre for permittivities, metres for
//! lengths, volts for the applied potential.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};

/// Vacuum permittivity (F/m)
pub const EPS_0: f64 = 8.854e-12;

/// Fixed physical parameters of one capacitor.
///
/// The gap between the inner electrode `r_a` and the outer electrode `r_b`
/// is filled with gas up to `r_d` and with a solid dielectric beyond it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacitorConfig {
    /// Vacuum permittivity
    pub eps_0: f64,
    /// Permittivity of the gas layer
    pub eps_gas: f64,
    /// Permittivity of the solid dielectric layer
    pub eps_dielectric: f64,
    /// Inner electrode radius
    pub r_a: f64,
    /// Gas/dielectric interface radius
    pub r_d: f64,
    /// Outer electrode radius
    pub r_b: f64,
    /// Electrode length along z
    pub length: f64,
    /// Applied voltage
    pub voltage: f64,
    /// Sampling pitch of the grid
    pub spacing: f64,
}

impl Default for CapacitorConfig {
    fn default() -> Self {
        Self {
            eps_0: EPS_0,
            eps_gas: EPS_0,
            eps_dielectric: 5.0 * EPS_0,
            r_a: 13.5e-3,
            r_d: 14.8e-3,
            r_b: 18e-3,
            length: 20e-2,
            voltage: 10e3,
            spacing: 1e-2,
        }
    }
}

impl CapacitorConfig {
    /// Parse a configuration from JSON; absent fields take the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check positivity of every parameter and the `r_a < r_d < r_b` ordering.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("eps_0", self.eps_0),
            ("eps_gas", self.eps_gas),
            ("eps_dielectric", self.eps_dielectric),
            ("r_a", self.r_a),
            ("r_d", self.r_d),
            ("r_b", self.r_b),
            ("length", self.length),
            ("voltage", self.voltage),
            ("spacing", self.spacing),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(FieldError::InvalidGeometry(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }

        if !(self.r_a < self.r_d && self.r_d < self.r_b) {
            return Err(FieldError::InvalidGeometry(format!(
                "radii must satisfy r_a < r_d < r_b, got r_a={}, r_d={}, r_b={}",
                self.r_a, self.r_d, self.r_b
            )));
        }

        Ok(())
    }

    /// Scale applied to both field components on the dielectric side
    pub fn permittivity_ratio(&self) -> f64 {
        self.eps_dielectric / self.eps_gas
    }
}

/// Read and validate a JSON configuration file
pub fn load_config(path: &Path) -> anyhow::Result<CapacitorConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config = CapacitorConfig::from_json(&json)
        .with_context(|| format!("Invalid capacitor config: {:?}", path))?;
    Ok(config)
}
