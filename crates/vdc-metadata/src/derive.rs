//! Coordinate/variable derivation helpers shared by the source-format
//! readers (spec §4.8 "WRF adds a derived `ELEVATION`... MOM/ROMS add
//! derived `angleRAD`... and `latDEG`", and `DEPTH`).
//!
//! Grounded on `original_source/lib/vdf/MOM.cpp`/`ROMS.cpp`'s `GetAngles()`:
//! the grid-x-axis-vs-latitude angle is derived from the local geolat/geolon
//! gradient across the grid's x direction, not supplied directly by the
//! source file.

/// Standard gravitational acceleration, m/s^2, matching the constant WRF's
/// `ELEVATION = (PH + PHB) / g` derivation divides by.
pub const GRAVITY_M_PER_S2: f64 = 9.81;

/// WRF's derived `ELEVATION` variable: geopotential height from the sum of
/// the perturbation (`ph`) and base-state (`phb`) geopotential fields.
pub fn elevation_from_geopotential(ph: &[f32], phb: &[f32]) -> Vec<f32> {
    ph.iter()
        .zip(phb)
        .map(|(&p, &pb)| ((p as f64 + pb as f64) / GRAVITY_M_PER_S2) as f32)
        .collect()
}

/// MOM/ROMS's derived `angleRAD`: the angle, in radians, between the grid's
/// x-axis and local east (the latitude lines), from the curvilinear
/// geolat/geolon vertex arrays of shape `(ny, nx)`. The gradient is taken
/// across the x direction with a one-sided difference at the last column.
pub fn angle_rad_from_curvilinear_grid(lon_deg: &[f64], lat_deg: &[f64], nx: usize, ny: usize) -> Vec<f64> {
    let mut angles = vec![0.0; nx * ny];
    for j in 0..ny {
        for i in 0..nx {
            let (i0, i1) = if i + 1 < nx { (i, i + 1) } else { (i - 1, i) };
            let idx0 = j * nx + i0;
            let idx1 = j * nx + i1;
            let dlon = (lon_deg[idx1] - lon_deg[idx0]).to_radians();
            let dlat = (lat_deg[idx1] - lat_deg[idx0]).to_radians();
            let lat_mid = lat_deg[j * nx + i].to_radians();
            angles[j * nx + i] = (dlat).atan2(dlon * lat_mid.cos());
        }
    }
    angles
}

/// MOM/ROMS's derived `latDEG`: the grid's own geolat vertex array, exposed
/// as a first-class variable instead of only a weight-table input.
pub fn lat_deg_from_curvilinear_grid(lat_deg: &[f64]) -> Vec<f64> {
    lat_deg.to_vec()
}

/// MOM/ROMS's derived `DEPTH`: both read a bottom-topography variable
/// (`ht` for MOM, `h` for ROMS) off the grid's vertical coordinate and negate
/// it, since the source variable is height above sea level and `DEPTH` is
/// the positive-down distance to the seafloor. `centimeters_to_meters`
/// matches MOM's POP-specific unit conversion, applied only when the source
/// variable is in centimeters (MOM's `GetDepths` keys this off the variable
/// being named `HT` rather than `ht`); ROMS's `h` is already in meters.
/// Values equal to `missing_value` pass through unchanged rather than being
/// negated.
pub fn depth_from_bathymetry(
    height_above_sea_level: &[f32],
    missing_value: Option<f32>,
    centimeters_to_meters: bool,
) -> Vec<f32> {
    height_above_sea_level
        .iter()
        .map(|&h| match missing_value {
            Some(mv) if is_missing(h, mv) => h,
            _ => {
                let meters = if centimeters_to_meters { h * 0.01 } else { h };
                -meters
            }
        })
        .collect()
}

fn is_missing(value: f32, mv: f32) -> bool {
    value.is_nan() || (mv.is_finite() && (value - mv).abs() < f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevation_divides_summed_geopotential_by_gravity() {
        let ph = vec![100.0_f32, 200.0];
        let phb = vec![900.0_f32, 800.0];
        let elevation = elevation_from_geopotential(&ph, &phb);
        assert!((elevation[0] as f64 - 1000.0 / GRAVITY_M_PER_S2).abs() < 1e-3);
        assert!((elevation[1] as f64 - 1000.0 / GRAVITY_M_PER_S2).abs() < 1e-3);
    }

    #[test]
    fn angle_is_zero_on_an_axis_aligned_grid() {
        let nx = 3;
        let ny = 3;
        let mut lon = vec![0.0; nx * ny];
        let mut lat = vec![0.0; nx * ny];
        for j in 0..ny {
            for i in 0..nx {
                lon[j * nx + i] = i as f64;
                lat[j * nx + i] = j as f64;
            }
        }
        let angles = angle_rad_from_curvilinear_grid(&lon, &lat, nx, ny);
        for a in angles {
            assert!(a.abs() < 1e-9, "expected zero angle on an axis-aligned grid, got {a}");
        }
    }

    #[test]
    fn lat_deg_passes_through() {
        let lat = vec![1.0, 2.0, 3.0];
        assert_eq!(lat_deg_from_curvilinear_grid(&lat), lat);
    }

    #[test]
    fn depth_negates_height_above_sea_level() {
        let h = vec![-500.0_f32, 1200.0];
        let depth = depth_from_bathymetry(&h, None, false);
        assert_eq!(depth, vec![500.0, -1200.0]);
    }

    #[test]
    fn depth_converts_pop_centimeters_to_meters() {
        let ht_cm = vec![-250_000.0_f32];
        let depth = depth_from_bathymetry(&ht_cm, None, true);
        assert_eq!(depth, vec![2500.0]);
    }

    #[test]
    fn depth_leaves_missing_values_unnegated() {
        let h = vec![-500.0_f32, -999.0];
        let depth = depth_from_bathymetry(&h, Some(-999.0), false);
        assert_eq!(depth, vec![500.0, -999.0]);
    }
}
