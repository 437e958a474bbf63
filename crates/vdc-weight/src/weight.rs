//! Curvilinear-to-rectilinear bilinear regridding weight table (spec §4.6).

use vdc_common::{VdcError, VdcResult};

use crate::bilinear::Quad;
use crate::polar::{needs_polar_projection, to_polar_plane, tripolar_zipper_neighbor};

const BBOX_EPS_DEG: f64 = 1e-3;
const CONTAINS_EPS: f64 = 1e-6;
const PARAM_TOLERANCE: f64 = 0.01;
const UNMAPPED_RESIDUAL_WARNING: f64 = 1e4;

#[derive(Debug, Clone, Copy)]
pub struct Weight {
    /// Source grid indices of the four corners, in `(ulon,ulat)`,
    /// `(ulon+1,ulat)`, `(ulon+1,ulat+1)`, `(ulon,ulat+1)` order.
    pub src_indices: [(usize, usize); 4],
    /// Bilinear coefficients in the same corner order.
    pub coeffs: [f64; 4],
}

pub struct WeightTable {
    pub nlon: usize,
    pub nlat: usize,
    pub weights: Vec<Option<Weight>>,
}

impl WeightTable {
    pub fn get(&self, i: usize, j: usize) -> Option<&Weight> {
        self.weights.get(j * self.nlon + i).and_then(|w| w.as_ref())
    }

    fn target_lon(&self, i: usize, lon_exts: (f64, f64)) -> f64 {
        if self.nlon <= 1 {
            lon_exts.0
        } else {
            lon_exts.0 + i as f64 * (lon_exts.1 - lon_exts.0) / (self.nlon - 1) as f64
        }
    }

    fn target_lat(&self, j: usize, lat_exts: (f64, f64)) -> f64 {
        if self.nlat <= 1 {
            lat_exts.0
        } else {
            lat_exts.0 + j as f64 * (lat_exts.1 - lat_exts.0) / (self.nlat - 1) as f64
        }
    }

    /// Compute the table for a source grid given as row-major `(lon, lat)`
    /// vertex arrays of shape `(src_ny, src_nx)`. `tripolar` enables the
    /// top-row zipper neighbor rule (step 4).
    pub fn compute(
        source_lon: &[f64],
        source_lat: &[f64],
        src_nx: usize,
        src_ny: usize,
        nlon: usize,
        nlat: usize,
        lon_exts: (f64, f64),
        lat_exts: (f64, f64),
        tripolar: bool,
    ) -> VdcResult<Self> {
        if source_lon.len() != src_nx * src_ny || source_lat.len() != src_nx * src_ny {
            return Err(VdcError::invalid_region(format!(
                "source lon/lat arrays must have {} entries for a {src_nx}x{src_ny} grid",
                src_nx * src_ny
            )));
        }

        let mut table = WeightTable { nlon, nlat, weights: vec![None; nlon * nlat] };
        let mut best_residual = vec![f64::INFINITY; nlon * nlat];
        let idx = |x: usize, y: usize| y * src_nx + x;
        let vertex = |x: usize, y: usize| (source_lon[idx(x, y)], source_lat[idx(x, y)]);

        let max_ulat = if tripolar { src_ny } else { src_ny.saturating_sub(1) };
        for ulat in 0..max_ulat {
            for ulon in 0..src_nx.saturating_sub(1) {
                let up = if ulat + 1 < src_ny {
                    Some((ulon, ulat + 1))
                } else if tripolar {
                    tripolar_zipper_neighbor(ulon, ulat, src_nx, src_ny)
                } else {
                    None
                };
                let up_right = if ulat + 1 < src_ny {
                    Some((ulon + 1, ulat + 1))
                } else if tripolar {
                    tripolar_zipper_neighbor(ulon + 1, ulat, src_nx, src_ny)
                } else {
                    None
                };
                let (Some((ux, uy)), Some((urx, ury))) = (up, up_right) else { continue };

                let src_indices = [(ulon, ulat), (ulon + 1, ulat), (urx, ury), (ux, uy)];
                let raw_corners = src_indices.map(|(x, y)| vertex(x, y));
                let centroid_lat = raw_corners.iter().map(|c| c.1).sum::<f64>() / 4.0;
                let polar = needs_polar_projection(centroid_lat);

                let space_corners = if polar {
                    raw_corners.map(|(lo, la)| to_polar_plane(lo, la))
                } else {
                    raw_corners
                };
                let quad = Quad::new(space_corners);

                let (lo_x, lo_y, hi_x, hi_y) = {
                    let (mut lo_x, mut lo_y, mut hi_x, mut hi_y) =
                        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
                    for &(x, y) in &raw_corners {
                        lo_x = lo_x.min(x);
                        lo_y = lo_y.min(y);
                        hi_x = hi_x.max(x);
                        hi_y = hi_y.max(y);
                    }
                    (lo_x - BBOX_EPS_DEG, lo_y - BBOX_EPS_DEG, hi_x + BBOX_EPS_DEG, hi_y + BBOX_EPS_DEG)
                };

                for j in 0..nlat {
                    let lat = table.target_lat(j, lat_exts);
                    if lat < lo_y || lat > hi_y {
                        continue;
                    }
                    for i in 0..nlon {
                        let lon = table.target_lon(i, lon_exts);
                        if lon < lo_x || lon > hi_x {
                            continue;
                        }
                        let point = if polar { to_polar_plane(lon, lat) } else { (lon, lat) };
                        if !quad.contains(point, CONTAINS_EPS) {
                            continue;
                        }
                        let (alpha, beta, residual) = quad.inverse_bilinear(point);
                        if alpha < -PARAM_TOLERANCE
                            || alpha > 1.0 + PARAM_TOLERANCE
                            || beta < -PARAM_TOLERANCE
                            || beta > 1.0 + PARAM_TOLERANCE
                        {
                            continue;
                        }
                        if residual > UNMAPPED_RESIDUAL_WARNING {
                            tracing::warn!(i, j, residual, "weight table: high-residual unmapped coordinate");
                            continue;
                        }
                        let slot = j * nlon + i;
                        if residual < best_residual[slot] {
                            best_residual[slot] = residual;
                            let a = alpha.clamp(0.0, 1.0);
                            let b = beta.clamp(0.0, 1.0);
                            table.weights[slot] = Some(Weight {
                                src_indices,
                                coeffs: [(1.0 - a) * (1.0 - b), a * (1.0 - b), a * b, (1.0 - a) * b],
                            });
                        }
                    }
                }
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular_source_grid(nx: usize, ny: usize) -> (Vec<f64>, Vec<f64>) {
        let mut lon = vec![0.0; nx * ny];
        let mut lat = vec![0.0; nx * ny];
        for y in 0..ny {
            for x in 0..nx {
                lon[y * nx + x] = x as f64;
                lat[y * nx + x] = y as f64;
            }
        }
        (lon, lat)
    }

    #[test]
    fn every_interior_target_vertex_is_covered() {
        let (lon, lat) = regular_source_grid(5, 5);
        let table = WeightTable::compute(&lon, &lat, 5, 5, 9, 9, (0.0, 4.0), (0.0, 4.0), false).unwrap();
        let mut covered = 0;
        for j in 0..9 {
            for i in 0..9 {
                if table.get(i, j).is_some() {
                    covered += 1;
                }
            }
        }
        assert!(covered > 70, "expected most target vertices covered, got {covered}");
    }

    #[test]
    fn weight_coefficients_sum_to_one() {
        let (lon, lat) = regular_source_grid(3, 3);
        let table = WeightTable::compute(&lon, &lat, 3, 3, 5, 5, (0.0, 2.0), (0.0, 2.0), false).unwrap();
        for w in table.weights.iter().flatten() {
            let sum: f64 = w.coeffs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }
}
