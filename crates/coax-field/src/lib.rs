//! coax-field: electrostatic field of a finite coaxial capacitor whose gap is
//! split between a gas layer and a solid dielectric
//!
//! This crate provides:
//! - A discretized cylindrical-shell sampler with cylindrical-to-Cartesian
//!   vector conversion
//! - A closed-form finite-length field model with a permittivity-ratio
//!   correction across the gas/dielectric interface
//! - Region classification and a radial self-consistency diagnostic
//! - A flat point cloud (binary or JSON) for external renderers
//!
//! Rendering, camera handling and glyph colouring belong to the consumer.

pub mod cloud;
pub mod config;
pub mod error;
pub mod field;
pub mod geometry;

pub use cloud::FieldCloud;
pub use config::{load_config, CapacitorConfig, EPS_0};
pub use error::{FieldError, Result};
pub use field::{DielectricField, FieldSolution, Region};
pub use geometry::{field_to_cartesian, CartesianField, CylinderGeometry, CylindricalGrid};

/// Main entry point: evaluate the field for `config` and flatten it for rendering.
///
/// Returns the cloud together with the mean radial error (a fraction, not a
/// percentage).
pub fn evaluate(config: CapacitorConfig) -> Result<(FieldCloud, f64)> {
    let field = DielectricField::new(config)?;
    let solution = field.calculate_field()?;
    Ok((FieldCloud::from_solution(&solution), field.mean_radial_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_reference() {
        let (cloud, error) = evaluate(CapacitorConfig::default()).unwrap();
        assert_eq!(cloud.len(), 10 * 20 * 20);
        assert!(error > 0.0 && error < 1.0);
    }

    #[test]
    fn test_evaluate_rejects_degenerate() {
        let config = CapacitorConfig {
            r_b: 10e-3,
            ..CapacitorConfig::default()
        };
        assert!(matches!(evaluate(config), Err(FieldError::InvalidGeometry(_))));
    }
}
