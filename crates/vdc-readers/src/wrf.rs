//! WRF NetCDF output reader (spec §4.8), with the derived `ELEVATION`
//! variable (`(PH+PHB)/g`) layered on top of the raw file contents.

use std::path::PathBuf;

use vdc_common::{VdcError, VdcResult};
use vdc_metadata::{cartographic_extents, elevation_from_geopotential};
use vdc_netcdf::NetCDFCollection;

use crate::trait_def::{DcReader, Extents, VariableHandle};

const DERIVED_ELEVATION: &str = "ELEVATION";

pub struct WrfReader {
    collection: NetCDFCollection,
    files: Vec<PathBuf>,
    map_projection: String,
}

impl WrfReader {
    /// Open a WRF output file set. `map_projection` is a PROJ.4-style string
    /// derived by the caller from the file's `MAP_PROJ`/`TRUELAT1`/
    /// `TRUELAT2`/`STAND_LON` attributes (spec §4.8 "Cartographic extents");
    /// pass `""` to fall back to the idealized degree scale.
    pub fn open(files: Vec<PathBuf>, map_projection: impl Into<String>) -> VdcResult<Self> {
        let mut collection = NetCDFCollection::open(files.clone(), Some("Time"), None)?;
        for dim in ["west_east_stag", "south_north_stag", "bottom_top_stag"] {
            collection.mark_staggered(dim);
        }
        Ok(Self { collection, files, map_projection: map_projection.into() })
    }

    fn first_file(&self) -> VdcResult<netcdf::File> {
        netcdf::open(&self.files[0]).map_err(|e| VdcError::io(format!("opening {}: {e}", self.files[0].display())))
    }

    fn elevation_volume(&self, ts: usize) -> VdcResult<(Vec<f32>, (usize, usize, usize))> {
        let (ph, dims) = self.collection.read_volume(ts, "PH")?;
        let (phb, _) = self.collection.read_volume(ts, "PHB")?;
        if ph.len() != phb.len() {
            return Err(VdcError::format("PH and PHB volumes have mismatched sizes"));
        }
        Ok((elevation_from_geopotential(&ph, &phb), dims))
    }

    fn lonlat_corners(&self) -> VdcResult<((f64, f64), (f64, f64))> {
        let file = self.first_file()?;
        let xlong = file
            .variable("XLONG")
            .ok_or_else(|| VdcError::invalid_variable("XLONG", "missing from WRF file"))?;
        let xlat = file
            .variable("XLAT")
            .ok_or_else(|| VdcError::invalid_variable("XLAT", "missing from WRF file"))?;
        let lon = xlong.values::<f32>(None, None).map_err(|e| VdcError::format(e.to_string()))?.into_raw_vec();
        let lat = xlat.values::<f32>(None, None).map_err(|e| VdcError::format(e.to_string()))?.into_raw_vec();
        let (lon_min, lon_max) = lon.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (lat_min, lat_max) = lat.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Ok(((lon_min as f64, lon_max as f64), (lat_min as f64, lat_max as f64)))
    }
}

impl DcReader for WrfReader {
    fn variables_3d(&self) -> Vec<String> {
        let Ok(file) = self.first_file() else { return Vec::new() };
        let mut names: Vec<String> = file
            .variables()
            .filter(|v| v.dimensions().len() == 4 || (v.dimensions().len() == 3 && v.dimensions().iter().all(|d| d.name() != "Time")))
            .map(|v| v.name())
            .collect();
        names.push(DERIVED_ELEVATION.to_string());
        names
    }

    fn variables_2d_xy(&self) -> Vec<String> {
        let Ok(file) = self.first_file() else { return Vec::new() };
        file.variables()
            .filter(|v| v.dimensions().len() == 3 && v.dimensions().iter().any(|d| d.name() == "Time"))
            .map(|v| v.name())
            .collect()
    }

    fn num_time_steps(&self) -> usize {
        self.collection.num_time_steps()
    }

    fn ts_user_time(&self, ts: usize) -> VdcResult<f64> {
        self.collection
            .user_time(ts)
            .ok_or_else(|| VdcError::invalid_region(format!("time step {ts} out of range")))
    }

    fn grid_dim(&self) -> (usize, usize, usize) {
        let Ok(file) = self.first_file() else { return (0, 0, 0) };
        let nx = file.dimension("west_east").map(|d| d.len()).unwrap_or(0);
        let ny = file.dimension("south_north").map(|d| d.len()).unwrap_or(0);
        let nz = file.dimension("bottom_top").map(|d| d.len()).unwrap_or(0);
        (nx, ny, nz)
    }

    fn extents(&self) -> VdcResult<Extents> {
        let (lon_exts, lat_exts) = self.lonlat_corners()?;
        let (min_x, min_y, max_x, max_y) = cartographic_extents(&self.map_projection, lon_exts, lat_exts)?;
        let (_, _, nz) = self.grid_dim();
        Ok(([min_x, min_y, 0.0], [max_x, max_y, nz as f64]))
    }

    fn map_projection(&self) -> &str {
        &self.map_projection
    }

    fn open_variable_read(&self, ts: usize, varname: &str) -> VdcResult<VariableHandle> {
        let (data, (nx, ny, nz)) = if varname == DERIVED_ELEVATION {
            self.elevation_volume(ts)?
        } else {
            self.collection.read_volume(ts, varname)?
        };
        let _ = nz;
        VariableHandle::new(data, nx * ny)
    }
}
