//! PROJ.4-style forward projection and the cartographic-extents helper
//! (spec §4.8 "Cartographic extents").
//!
//! The Lambert Conformal Conic math here is carried over from the teacher
//! workspace's `projection::lambert::LambertConformal` (grid-index mapping
//! for a fixed HRRR-style grid), generalized into a pure geographic-to-meters
//! forward transform keyed off a parsed PROJ.4 parameter string instead of
//! GRIB2 grid-definition fields.

use std::f64::consts::PI;

use vdc_common::{VdcError, VdcResult};

/// Idealized fallback scale (meters per degree) used when no PROJ.4 string
/// is available, per spec §4.8: "falls back to `lon*111177, lat*111177`".
pub const IDEALIZED_DEG_TO_M: f64 = 111177.0;

const WGS84_MEAN_RADIUS_M: f64 = 6371229.0;

#[derive(Debug, Clone)]
pub enum Projection {
    /// No projection: geographic coordinates pass through unscaled.
    LatLon,
    LambertConformal(LambertParams),
}

#[derive(Debug, Clone)]
pub struct LambertParams {
    lon0_deg: f64,
    latin1_deg: f64,
    latin2_deg: f64,
    earth_radius_m: f64,
}

impl Projection {
    /// Parse a PROJ.4-style parameter string (`"+proj=lcc +lon_0=-97.5
    /// +lat_1=38.5 +lat_2=38.5 +R=6371229"`). Unrecognized `+proj=` values
    /// fail with [`VdcError::Projection`]; an empty string selects
    /// [`Projection::LatLon`] (the idealized-case fallback).
    pub fn parse(proj4: &str) -> VdcResult<Self> {
        let proj4 = proj4.trim();
        if proj4.is_empty() {
            return Ok(Projection::LatLon);
        }

        let mut params = std::collections::HashMap::new();
        for token in proj4.split_whitespace() {
            let Some(rest) = token.strip_prefix('+') else { continue };
            match rest.split_once('=') {
                Some((k, v)) => {
                    params.insert(k, v);
                }
                None => {
                    params.insert(rest, "");
                }
            }
        }

        let proj = params.get("proj").copied().unwrap_or("longlat");
        match proj {
            "longlat" | "latlong" | "latlon" => Ok(Projection::LatLon),
            "lcc" => {
                let get = |key: &str, default: f64| -> VdcResult<f64> {
                    match params.get(key) {
                        Some(v) => v.parse::<f64>().map_err(|_| {
                            VdcError::projection(format!("invalid PROJ.4 parameter {key}={v}"))
                        }),
                        None => Ok(default),
                    }
                };
                let lon0_deg = get("lon_0", 0.0)?;
                let latin1_deg = get("lat_1", 0.0)?;
                let latin2_deg = get("lat_2", latin1_deg)?;
                let default_radius = get("a", WGS84_MEAN_RADIUS_M)?;
                let earth_radius_m = get("R", default_radius)?;
                Ok(Projection::LambertConformal(LambertParams {
                    lon0_deg,
                    latin1_deg,
                    latin2_deg,
                    earth_radius_m,
                }))
            }
            other => Err(VdcError::projection(format!("unsupported PROJ.4 projection '{other}'"))),
        }
    }

    /// Forward-transform a geographic point to meters in the projection
    /// plane, relative to the projection's own origin.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> VdcResult<(f64, f64)> {
        match self {
            Projection::LatLon => Ok((lon_deg, lat_deg)),
            Projection::LambertConformal(p) => Ok(p.forward(lon_deg, lat_deg)),
        }
    }
}

impl LambertParams {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lon0 = self.lon0_deg * to_rad;
        let latin1 = self.latin1_deg * to_rad;
        let latin2 = self.latin2_deg * to_rad;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        let n = if (latin1 - latin2).abs() < 1e-10 {
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio = ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };
        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;

        let mut dlon = lon - lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.earth_radius_m * f / (PI / 4.0 + lat / 2.0).tan().powf(n);
        let theta = n * dlon;
        (rho * theta.sin(), -rho * theta.cos())
    }
}

/// Forward-transform a `(lon_exts, lat_exts)` bounding rectangle to meters,
/// by projecting its four corners and taking their bounding box. Falls back
/// to [`IDEALIZED_DEG_TO_M`] scaling when `proj4` is empty or unparseable
/// (spec §4.8).
pub fn cartographic_extents(
    proj4: &str,
    lon_exts: (f64, f64),
    lat_exts: (f64, f64),
) -> VdcResult<(f64, f64, f64, f64)> {
    let mut idealized = proj4.trim().is_empty();
    let projection = match Projection::parse(proj4) {
        Ok(p) => p,
        Err(err) => {
            tracing::warn!(%err, "cartographic_extents: falling back to idealized scaling");
            idealized = true;
            Projection::LatLon
        }
    };
    let corners = [
        (lon_exts.0, lat_exts.0),
        (lon_exts.1, lat_exts.0),
        (lon_exts.0, lat_exts.1),
        (lon_exts.1, lat_exts.1),
    ];

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (lon, lat) in corners {
        let (x, y) = if idealized {
            (lon * IDEALIZED_DEG_TO_M, lat * IDEALIZED_DEG_TO_M)
        } else {
            projection.forward(lon, lat)?
        };
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    Ok((min_x, min_y, max_x, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idealized_fallback_scales_by_constant() {
        let (min_x, min_y, max_x, max_y) = cartographic_extents("", (-100.0, -90.0), (30.0, 40.0)).unwrap();
        assert!((min_x - (-100.0 * IDEALIZED_DEG_TO_M)).abs() < 1e-6);
        assert!((max_x - (-90.0 * IDEALIZED_DEG_TO_M)).abs() < 1e-6);
        assert!((min_y - (30.0 * IDEALIZED_DEG_TO_M)).abs() < 1e-6);
        assert!((max_y - (40.0 * IDEALIZED_DEG_TO_M)).abs() < 1e-6);
    }

    #[test]
    fn lambert_conformal_first_point_is_near_origin() {
        // HRRR-style tangent-cone parameters (teacher's LambertConformal::hrrr()).
        let p = Projection::parse("+proj=lcc +lon_0=-97.5 +lat_1=38.5 +lat_2=38.5 +R=6371229").unwrap();
        let (x0, y0) = p.forward(-97.5, 38.5).unwrap();
        assert!(x0.abs() < 1.0, "expected x near the central meridian, got {x0}");
        assert!(y0.abs() > 0.0, "expected nonzero y at a different latitude than lat_0");
    }

    #[test]
    fn unsupported_projection_is_rejected() {
        assert!(Projection::parse("+proj=utm +zone=15").is_err());
    }

    #[test]
    fn malformed_parameter_is_rejected() {
        assert!(Projection::parse("+proj=lcc +lat_1=not_a_number").is_err());
    }
}
