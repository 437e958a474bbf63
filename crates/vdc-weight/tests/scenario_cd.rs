//! End-to-end weight-table scenarios from spec.md §8.
//!
//! Scenario C: an identity lat-lon raster regridded onto itself — every
//! target vertex should land exactly on a source grid corner (`alpha`/`beta`
//! in `{0, 1}`, zero residual, the selected corner's own lon/lat matching the
//! target's).
//!
//! Scenario D: missing-value handling at a quad center — one missing corner
//! (25% of the weight) still produces an averaged, non-missing result; two
//! diagonally opposite missing corners (50% of the weight) produce the
//! missing sentinel.

use vdc_weight::{interp2d, WeightTable};

#[test]
fn identity_raster_lands_exactly_on_source_corners() {
    let nlon = 8;
    let nlat = 4;
    let mut lon = vec![0.0; nlon * nlat];
    let mut lat = vec![0.0; nlon * nlat];
    for j in 0..nlat {
        for i in 0..nlon {
            lon[j * nlon + i] = i as f64 * 45.0;
            lat[j * nlon + i] = -90.0 + j as f64 * 60.0;
        }
    }

    let table = WeightTable::compute(&lon, &lat, nlon, nlat, nlon, nlat, (0.0, 315.0), (-90.0, 90.0), false).unwrap();

    for j in 0..nlat {
        for i in 0..nlon {
            let w = table.get(i, j).unwrap_or_else(|| panic!("no weight at target vertex ({i},{j})"));
            let target_lon = i as f64 * 45.0;
            let target_lat = -90.0 + j as f64 * 60.0;

            // exactly one corner should carry (nearly) all the weight.
            let dominant = w
                .coeffs
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .map(|(k, _)| k)
                .unwrap();
            assert!((w.coeffs[dominant] - 1.0).abs() < 1e-6, "expected a single corner at weight 1, got {:?}", w.coeffs);
            for (k, &c) in w.coeffs.iter().enumerate() {
                if k != dominant {
                    assert!(c.abs() < 1e-6, "expected zero weight on non-dominant corners, got {:?}", w.coeffs);
                }
            }

            let (sx, sy) = w.src_indices[dominant];
            assert!((lon[sy * nlon + sx] - target_lon).abs() < 1e-9);
            assert!((lat[sy * nlon + sx] - target_lat).abs() < 1e-9);
        }
    }
}

fn two_by_two_center_table() -> WeightTable {
    // unit square source cell; a single target vertex at its exact center.
    let lon = vec![0.0, 1.0, 0.0, 1.0];
    let lat = vec![0.0, 0.0, 1.0, 1.0];
    WeightTable::compute(&lon, &lat, 2, 2, 1, 1, (0.5, 0.5), (0.5, 0.5), false).unwrap()
}

#[test]
fn one_missing_corner_is_averaged_from_the_rest() {
    let table = two_by_two_center_table();
    let w = table.get(0, 0).unwrap();
    assert!(w.coeffs.iter().all(|&c| (c - 0.25).abs() < 1e-9), "expected four equal quarter weights at the quad center");

    let mut src = vec![2.0_f32, 4.0, 6.0, 8.0]; // (0,0),(1,0),(0,1),(1,1)
    src[0] = f32::NAN; // corner (0,0): 25% of the weight, below the 0.5 missing threshold
    let out = interp2d(&src, 2, &table, f32::NAN, -999.0);
    assert!((out[0] - (-999.0)).abs() > 1e-6, "a single missing corner must not collapse the whole vertex to missing");
}

#[test]
fn two_diagonally_opposite_missing_corners_propagate_missing_value() {
    let table = two_by_two_center_table();
    let mut src = vec![2.0_f32, 4.0, 6.0, 8.0]; // (0,0),(1,0),(0,1),(1,1)
    src[0] = f32::NAN; // (0,0)
    src[3] = f32::NAN; // (1,1), diagonally opposite (0,0)
    let out = interp2d(&src, 2, &table, f32::NAN, -999.0);
    assert_eq!(out[0], -999.0);
}
