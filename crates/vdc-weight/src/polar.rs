//! Polar-plane projection used near the pole so cells spanning the ±180°
//! seam stay convex for the oriented-line test (spec §4.6 step 3).
//!
//! The distilled spec says "north of ~0° latitude", which reads as a
//! distillation artifact — projecting every cell north of the equator
//! would defeat the purpose of a seam/pole-only workaround. This module
//! applies the polar projection only above [`POLAR_LAT_THRESHOLD_DEG`],
//! an Open Question decision recorded in DESIGN.md.

pub const POLAR_LAT_THRESHOLD_DEG: f64 = 80.0;

/// Project `(lon, lat)` in degrees to a polar `(r, theta)` plane where
/// `r = (90 - lat) * 2 / pi` and `theta = lon * pi / 180`, so polar cells
/// become convex quads in Cartesian `(r*cos(theta), r*sin(theta))` space.
pub fn to_polar_plane(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let r = (90.0 - lat_deg) * 2.0 / std::f64::consts::PI;
    let theta = lon_deg.to_radians();
    (r * theta.cos(), r * theta.sin())
}

pub fn needs_polar_projection(lat_deg: f64) -> bool {
    lat_deg >= POLAR_LAT_THRESHOLD_DEG
}

/// The "up" neighbor of `(ulon, nlat-1)` on a tripolar grid's top row is
/// `(nlon-1-ulon, nlat-1)`, not `(ulon, nlat)` (spec §4.6 step 4, the
/// "zipper" seam where the two poles of the tripolar grid fold together).
pub fn tripolar_zipper_neighbor(ulon: usize, ulat: usize, nlon: usize, nlat: usize) -> Option<(usize, usize)> {
    if ulat + 1 == nlat {
        Some((nlon - 1 - ulon, ulat))
    } else if ulat + 1 < nlat {
        Some((ulon, ulat + 1))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_gate() {
        assert!(!needs_polar_projection(45.0));
        assert!(needs_polar_projection(85.0));
    }

    #[test]
    fn zipper_neighbor_folds_top_row() {
        assert_eq!(tripolar_zipper_neighbor(2, 9, 10, 10), Some((7, 9)));
        assert_eq!(tripolar_zipper_neighbor(2, 3, 10, 10), Some((2, 4)));
    }
}
