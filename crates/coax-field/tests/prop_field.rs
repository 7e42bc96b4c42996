//! Property-based tests for the sampler and the field evaluator.
//!
//! Covers: grid bounds and seam exclusion, parallel array lengths, region
//! partition, unit-vector normalization and axial symmetry over random
//! valid capacitors.

use std::f64::consts::PI;

use coax_field::{CapacitorConfig, CylinderGeometry, DielectricField, FieldError, Region};
use proptest::prelude::*;

/// Random capacitor with `r_a < r_d < r_b`, kept small enough to sample quickly
fn capacitor() -> impl Strategy<Value = CapacitorConfig> {
    (
        1e-3f64..5e-2,
        0.05f64..0.95,
        1.1f64..3.0,
        1e-2f64..0.5,
        1.0f64..20.0,
        1e2f64..5e4,
    )
        .prop_map(|(r_a, frac, outer_scale, length, eps_r, voltage)| {
            let r_b = r_a * outer_scale;
            let r_d = r_a + frac * (r_b - r_a);
            CapacitorConfig {
                r_a,
                r_d,
                r_b,
                length,
                voltage,
                eps_dielectric: eps_r * coax_field::EPS_0,
                spacing: length / 8.0,
                ..CapacitorConfig::default()
            }
        })
}

// ── Geometry Sampler ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every sample lies inside the shell, allowing for cos/sin rounding.
    #[test]
    fn samples_stay_in_shell(
        r_i in 1e-3f64..1.0,
        thickness in 1e-3f64..1.0,
        length in 1e-2f64..2.0,
        spacing in 5e-2f64..0.5,
    ) {
        let r_o = r_i + thickness;
        let geom = CylinderGeometry::new(r_i, r_o, length, spacing).unwrap();
        let tol = 1e-12 * r_o;

        for p in geom.points() {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            prop_assert!(r >= r_i - tol && r <= r_o + tol);
            prop_assert!(p.z >= -length / 2.0 && p.z <= length / 2.0);
        }

        let (rs, zs) = geom.rz_coordinates();
        for (&r, &z) in rs.iter().zip(zs) {
            prop_assert!(r >= r_i && r <= r_o);
            prop_assert!(z >= -length / 2.0 && z <= length / 2.0);
        }
    }

    /// Angles start at 0 and never reach 2π.
    #[test]
    fn angular_seam_excluded(
        r_i in 1e-3f64..1.0,
        thickness in 1e-3f64..1.0,
        spacing in 1e-2f64..0.5,
    ) {
        let geom = CylinderGeometry::new(r_i, r_i + thickness, 1.0, spacing).unwrap();
        let theta = &geom.grid().theta;

        prop_assert_eq!(theta[0], 0.0);
        prop_assert!(theta.iter().all(|&t| t < 2.0 * PI));
        prop_assert!(theta.windows(2).all(|w| w[1] > w[0]));
    }

    /// Counts respect the per-axis minimums and multiply to the point count.
    #[test]
    fn counts_clamped_and_consistent(
        r_i in 1e-3f64..1.0,
        thickness in 1e-3f64..1.0,
        length in 1e-2f64..2.0,
        spacing in 5e-2f64..1.0,
    ) {
        let geom = CylinderGeometry::new(r_i, r_i + thickness, length, spacing).unwrap();
        let (n_r, n_theta, n_z) = geom.sample_counts();

        prop_assert!(n_r >= 10);
        prop_assert!(n_theta >= 20);
        prop_assert!(n_z >= 5);
        prop_assert_eq!(geom.points().len(), n_r * n_theta * n_z);
    }

    /// Reversed or collapsed radii never produce a grid.
    #[test]
    fn reversed_radii_rejected(
        r_o in 1e-3f64..1.0,
        extra in 0.0f64..1.0,
    ) {
        let result = CylinderGeometry::new(r_o + extra, r_o, 1.0, 0.1);
        prop_assert!(matches!(result, Err(FieldError::InvalidGeometry(_))));
    }
}

// ── Field Evaluator ──────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Parallel arrays share one length and regions follow r_d exactly.
    #[test]
    fn solution_arrays_and_regions(config in capacitor()) {
        let r_d = config.r_d;
        let field = DielectricField::new(config).unwrap();
        let solution = field.calculate_field().unwrap();
        let n = field.geometry().len();

        prop_assert_eq!(solution.points.len(), n);
        prop_assert_eq!(solution.unit_vectors.len(), n);
        prop_assert_eq!(solution.magnitudes.len(), n);
        prop_assert_eq!(solution.regions.len(), n);

        let (rs, _) = field.geometry().rz_coordinates();
        for (&r, &region) in rs.iter().zip(&solution.regions) {
            let expected = if r >= r_d { Region::Dielectric } else { Region::Gas };
            prop_assert_eq!(region, expected);
        }

        let (gas, dielectric) = solution.region_counts();
        prop_assert_eq!(gas + dielectric, n);
    }

    /// Unit vectors are unit length wherever the field is resolvable.
    #[test]
    fn unit_vectors_normalized(config in capacitor()) {
        let solution = DielectricField::new(config).unwrap().calculate_field().unwrap();

        for (u, &mag) in solution.unit_vectors.iter().zip(&solution.magnitudes) {
            prop_assert!(u.iter().all(|c| c.is_finite()));
            if mag > 1e-12 {
                prop_assert!((u.norm() - 1.0).abs() < 1e-9);
            }
        }
    }

    /// Er is even and Ez odd about the midplane.
    #[test]
    fn axial_symmetry(config in capacitor(), r_frac in 0.0f64..1.0, z_frac in 0.0f64..1.0) {
        let r = config.r_a + r_frac * (config.r_b - config.r_a);
        let z = z_frac * config.length / 2.0;
        let field = DielectricField::new(config).unwrap();

        let (er_pos, ez_pos) = field.field_at(r, z);
        let (er_neg, ez_neg) = field.field_at(r, -z);

        prop_assert!((er_pos - er_neg).abs() <= 1e-12 * er_pos.abs());
        prop_assert!((ez_pos + ez_neg).abs() <= 1e-12 * ez_pos.abs().max(er_pos.abs()));
    }

    /// The diagnostic is a proper fraction for any finite electrode.
    #[test]
    fn radial_error_is_fraction(config in capacitor()) {
        let error = DielectricField::new(config).unwrap().mean_radial_error();
        prop_assert!(error.is_finite());
        prop_assert!(error > 0.0 && error < 1.0);
    }
}
