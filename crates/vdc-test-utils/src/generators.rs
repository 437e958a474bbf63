//! Synthetic data generators for VDC test suites.
//!
//! These produce small, deterministic datasets with known analytic
//! properties (constant fields, linear ramps, known bounding boxes) so
//! round-trip and reconstruction tests can assert exact or near-exact
//! values without needing real sample files.

/// A synthetic rectilinear voxel grid of `f32` samples in row-major
/// (x fastest, then y, then z) order.
#[derive(Debug, Clone)]
pub struct SyntheticGrid {
    pub dims: (usize, usize, usize),
    pub values: Vec<f32>,
}

impl SyntheticGrid {
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.dims.1 * self.dims.0 + y * self.dims.0 + x
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.values[self.index(x, y, z)]
    }
}

/// A grid where every voxel holds the same value. A wavelet transform with a
/// vanishing-moment count >= 1 must reconstruct this exactly: the detail
/// (gamma) coefficients at every level are zero.
pub fn constant_grid(dims: (usize, usize, usize), value: f32) -> SyntheticGrid {
    let n = dims.0 * dims.1 * dims.2;
    SyntheticGrid {
        dims,
        values: vec![value; n],
    }
}

/// A grid whose value at `(x, y, z)` is `x + 2*y + 3*z`, cast to `f32`. A
/// lifting scheme with at least one vanishing moment reconstructs a linear
/// ramp exactly as well, making this a second zero-error check distinct from
/// [`constant_grid`].
pub fn linear_ramp_grid(dims: (usize, usize, usize)) -> SyntheticGrid {
    let (nx, ny, nz) = dims;
    let mut values = Vec::with_capacity(nx * ny * nz);
    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                values.push((x as f32) + 2.0 * (y as f32) + 3.0 * (z as f32));
            }
        }
    }
    SyntheticGrid { dims, values }
}

/// A grid with a single impulse at `center`, everything else zero. Useful
/// for checking that block-region reconstruction places data at the correct
/// voxel coordinates and does not smear it across block boundaries.
pub fn impulse_grid(dims: (usize, usize, usize), center: (usize, usize, usize)) -> SyntheticGrid {
    let mut grid = constant_grid(dims, 0.0);
    let idx = grid.index(center.0, center.1, center.2);
    grid.values[idx] = 1.0;
    grid
}

/// A synthetic curvilinear 2D (lon, lat) grid describing a rotated, slightly
/// stretched patch of the globe, for weight-table construction tests.
pub struct CurvilinearGrid {
    pub dims: (usize, usize),
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
}

/// Build a curvilinear grid covering roughly `lon_span` x `lat_span` degrees
/// centered at `(lon0, lat0)`, rotated by `rotation_deg` and stretched along
/// x by `stretch`. The rotation/stretch make the grid genuinely curvilinear
/// (not expressible as a rectilinear lon/lat grid), which is what exercises
/// the weight-table's general bilinear inverse mapping rather than its
/// degenerate rectilinear fast path.
pub fn rotated_curvilinear_grid(
    dims: (usize, usize),
    center: (f64, f64),
    lon_span: f64,
    lat_span: f64,
    rotation_deg: f64,
    stretch: f64,
) -> CurvilinearGrid {
    let (nx, ny) = dims;
    let (lon0, lat0) = center;
    let theta = rotation_deg.to_radians();
    let mut lon = Vec::with_capacity(nx * ny);
    let mut lat = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let u = (i as f64 / (nx.max(2) - 1) as f64 - 0.5) * lon_span * stretch;
            let v = (j as f64 / (ny.max(2) - 1) as f64 - 0.5) * lat_span;
            let ru = u * theta.cos() - v * theta.sin();
            let rv = u * theta.sin() + v * theta.cos();
            lon.push(lon0 + ru);
            lat.push((lat0 + rv).clamp(-89.9, 89.9));
        }
    }
    CurvilinearGrid { dims, lon, lat }
}

/// A synthetic Paramesh-style block table: parallel arrays of global block
/// id, bounding box `[xmin, xmax, ymin, ymax, zmin, zmax]` and refinement
/// level, describing a single root block refined once into 8 children.
pub struct SyntheticParameshTable {
    pub gid: Vec<i32>,
    pub bbox: Vec<[f64; 6]>,
    pub lrefine: Vec<i32>,
}

pub fn one_level_refined_paramesh_table() -> SyntheticParameshTable {
    let root_bbox = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
    let mut gid = vec![1];
    let mut bbox = vec![root_bbox];
    let mut lrefine = vec![1];

    let mid = |lo: f64, hi: f64| (lo + hi) / 2.0;
    let mut next_id = 2;
    for zi in 0..2 {
        for yi in 0..2 {
            for xi in 0..2 {
                let xlo = if xi == 0 { 0.0 } else { mid(0.0, 1.0) };
                let xhi = if xi == 0 { mid(0.0, 1.0) } else { 1.0 };
                let ylo = if yi == 0 { 0.0 } else { mid(0.0, 1.0) };
                let yhi = if yi == 0 { mid(0.0, 1.0) } else { 1.0 };
                let zlo = if zi == 0 { 0.0 } else { mid(0.0, 1.0) };
                let zhi = if zi == 0 { mid(0.0, 1.0) } else { 1.0 };
                gid.push(next_id);
                bbox.push([xlo, xhi, ylo, yhi, zlo, zhi]);
                lrefine.push(2);
                next_id += 1;
            }
        }
    }

    SyntheticParameshTable {
        gid,
        bbox,
        lrefine,
    }
}
