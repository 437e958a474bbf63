//! MOM/ROMS curvilinear-grid NetCDF reader (spec §4.8), with the derived
//! `angleRAD`/`latDEG`/`DEPTH` variables layered on top of the raw file
//! contents.
//!
//! Both formats share a topo/grid file carrying `geolat`/`geolon`-style
//! coordinate arrays and a curvilinear horizontal grid; this reader is
//! parameterized by those variable names rather than having one hardcoded
//! pair, so the same code serves both `mom2vdc` and `roms2vdc`.

use std::path::PathBuf;

use vdc_common::{VdcError, VdcResult};
use vdc_metadata::{angle_rad_from_curvilinear_grid, cartographic_extents, depth_from_bathymetry, lat_deg_from_curvilinear_grid};
use vdc_netcdf::NetCDFCollection;

use crate::trait_def::{DcReader, Extents, VariableHandle};

const DERIVED_ANGLE_RAD: &str = "angleRAD";
const DERIVED_LAT_DEG: &str = "latDEG";
const DERIVED_DEPTH: &str = "DEPTH";

/// Geographic coordinate variable names, since MOM/ROMS grids are not
/// standardized on a single pair of names (t-grid vs u-grid, `geolat_t`
/// vs `lat_rho`, ...).
pub struct GeoCoordNames {
    pub lat_var: String,
    pub lon_var: String,
    /// Bottom-topography variable the derived `DEPTH` coordinate comes from
    /// (`ht`/`HT` for MOM, `h` for ROMS; `MOM::GetDepths`/`ROMS::GetDepths`).
    /// `DEPTH` is left out of `variables_2d_xy` when this is `None`.
    pub depth_var: Option<String>,
}

pub struct MomRomsReader {
    collection: NetCDFCollection,
    files: Vec<PathBuf>,
    map_projection: String,
    geo: GeoCoordNames,
}

impl MomRomsReader {
    pub fn open(files: Vec<PathBuf>, map_projection: impl Into<String>, geo: GeoCoordNames) -> VdcResult<Self> {
        let collection = NetCDFCollection::open(files.clone(), Some("time"), Some("time")).or_else(|_| {
            NetCDFCollection::open(files.clone(), Some("time"), None)
        })?;
        Ok(Self { collection, files, map_projection: map_projection.into(), geo })
    }

    fn first_file(&self) -> VdcResult<netcdf::File> {
        netcdf::open(&self.files[0]).map_err(|e| VdcError::io(format!("opening {}: {e}", self.files[0].display())))
    }

    fn geo_arrays(&self) -> VdcResult<(Vec<f64>, Vec<f64>, usize, usize)> {
        let file = self.first_file()?;
        let lat_var = file
            .variable(&self.geo.lat_var)
            .ok_or_else(|| VdcError::invalid_variable(&self.geo.lat_var, "missing from grid file"))?;
        let dims: Vec<usize> = lat_var.dimensions().iter().map(|d| d.len()).collect();
        if dims.len() != 2 {
            return Err(VdcError::format(format!("{} is not a 2D curvilinear coordinate array", self.geo.lat_var)));
        }
        let (ny, nx) = (dims[0], dims[1]);
        let lat = lat_var.values::<f64>(None, None).map_err(|e| VdcError::format(e.to_string()))?.into_raw_vec();
        let lon_var = file
            .variable(&self.geo.lon_var)
            .ok_or_else(|| VdcError::invalid_variable(&self.geo.lon_var, "missing from grid file"))?;
        let lon = lon_var.values::<f64>(None, None).map_err(|e| VdcError::format(e.to_string()))?.into_raw_vec();
        Ok((lon, lat, nx, ny))
    }
}

/// `_FillValue` takes precedence over the older `missing_value` convention,
/// matching netCDF-CF's own precedence for which attribute callers should
/// trust first.
fn missing_value_attr(var: &netcdf::Variable) -> Option<f32> {
    get_f32_attr(var, "_FillValue").or_else(|| get_f32_attr(var, "missing_value"))
}

fn get_f32_attr(var: &netcdf::Variable, name: &str) -> Option<f32> {
    let value = var.attribute_value(name)?.ok()?;
    f32::try_from(value).ok()
}

impl DcReader for MomRomsReader {
    fn variables_3d(&self) -> Vec<String> {
        let Ok(file) = self.first_file() else { return Vec::new() };
        file.variables()
            .filter(|v| v.dimensions().len() == 4)
            .map(|v| v.name())
            .collect()
    }

    fn variables_2d_xy(&self) -> Vec<String> {
        let Ok(file) = self.first_file() else { return Vec::new() };
        let mut names: Vec<String> = file
            .variables()
            .filter(|v| v.dimensions().len() == 3 && v.dimensions().iter().any(|d| d.name() == "time"))
            .map(|v| v.name())
            .collect();
        names.push(DERIVED_ANGLE_RAD.to_string());
        names.push(DERIVED_LAT_DEG.to_string());
        if self.geo.depth_var.is_some() {
            names.push(DERIVED_DEPTH.to_string());
        }
        names
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
        let Ok((_, _, nx, ny)) = self.geo_arrays() else { return (0, 0, 0) };
        let Ok(file) = self.first_file() else { return (nx, ny, 0) };
        let nz = file.dimension("st_ocean").or_else(|| file.dimension("s_rho")).map(|d| d.len()).unwrap_or(0);
        (nx, ny, nz)
    }

    fn extents(&self) -> VdcResult<Extents> {
        let (lon, lat, ..) = self.geo_arrays()?;
        let lon_exts = (lon.iter().cloned().fold(f64::INFINITY, f64::min), lon.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
        let lat_exts = (lat.iter().cloned().fold(f64::INFINITY, f64::min), lat.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
        let (min_x, min_y, max_x, max_y) = cartographic_extents(&self.map_projection, lon_exts, lat_exts)?;
        let (_, _, nz) = self.grid_dim();
        Ok(([min_x, min_y, 0.0], [max_x, max_y, nz as f64]))
    }

    fn map_projection(&self) -> &str {
        &self.map_projection
    }

    fn open_variable_read(&self, ts: usize, varname: &str) -> VdcResult<VariableHandle> {
        match varname {
            DERIVED_ANGLE_RAD => {
                let (lon, lat, nx, ny) = self.geo_arrays()?;
                let angle = angle_rad_from_curvilinear_grid(&lon, &lat, nx, ny);
                VariableHandle::new(angle.into_iter().map(|v| v as f32).collect(), nx * ny)
            }
            DERIVED_LAT_DEG => {
                let (_, lat, nx, ny) = self.geo_arrays()?;
                let out = lat_deg_from_curvilinear_grid(&lat);
                VariableHandle::new(out.into_iter().map(|v| v as f32).collect(), nx * ny)
            }
            DERIVED_DEPTH => {
                let (_, _, nx, ny) = self.geo_arrays()?;
                let depth_var = self
                    .geo
                    .depth_var
                    .as_deref()
                    .ok_or_else(|| VdcError::invalid_variable(DERIVED_DEPTH, "no depth variable configured for this grid"))?;
                let file = self.first_file()?;
                let var = file
                    .variable(depth_var)
                    .ok_or_else(|| VdcError::invalid_variable(depth_var, "missing from grid file"))?;
                let raw = var.values::<f32>(None, None).map_err(|e| VdcError::format(e.to_string()))?.into_raw_vec();
                let mv = missing_value_attr(&var);
                let centimeters_to_meters = depth_var == "HT";
                let depth = depth_from_bathymetry(&raw, mv, centimeters_to_meters);
                VariableHandle::new(depth, nx * ny)
            }
            _ => {
                let (data, (nx, ny, _)) = self.collection.read_volume(ts, varname)?;
                VariableHandle::new(data, nx * ny)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trait_def::SliceStatus;

    fn write_mom_file(path: &std::path::Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("time", 1).unwrap();
        file.add_dimension("yt_ocean", 2).unwrap();
        file.add_dimension("xt_ocean", 3).unwrap();

        // axis-aligned grid: geolon varies along x, geolat is constant per row.
        let mut geolon = file.add_variable::<f64>("geolon_t", &["yt_ocean", "xt_ocean"]).unwrap();
        geolon.put_values(&[0.0_f64, 1.0, 2.0, 0.0, 1.0, 2.0], None, None).unwrap();
        let mut geolat = file.add_variable::<f64>("geolat_t", &["yt_ocean", "xt_ocean"]).unwrap();
        geolat.put_values(&[10.0_f64, 10.0, 10.0, 20.0, 20.0, 20.0], None, None).unwrap();

        let mut ht = file.add_variable::<f32>("ht", &["yt_ocean", "xt_ocean"]).unwrap();
        ht.put_values(&[-500.0_f32, -1000.0, -1500.0, -2000.0, -2500.0, -3000.0], None, None).unwrap();
    }

    #[test]
    fn angle_is_zero_on_an_axis_aligned_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mom.nc");
        write_mom_file(&path);

        let reader = MomRomsReader::open(
            vec![path],
            "",
            GeoCoordNames { lat_var: "geolat_t".into(), lon_var: "geolon_t".into(), depth_var: None },
        )
        .unwrap();

        let mut handle = reader.open_variable_read(0, "angleRAD").unwrap();
        let mut buf = vec![0.0_f32; 6];
        assert_eq!(reader.read_slice(&mut handle, &mut buf).unwrap(), SliceStatus::Read);
        for v in buf {
            assert!(v.abs() < 1e-6, "expected zero angle on an axis-aligned grid, got {v}");
        }
    }

    #[test]
    fn lat_deg_passes_through_geolat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mom.nc");
        write_mom_file(&path);

        let reader = MomRomsReader::open(
            vec![path],
            "",
            GeoCoordNames { lat_var: "geolat_t".into(), lon_var: "geolon_t".into(), depth_var: None },
        )
        .unwrap();

        let mut handle = reader.open_variable_read(0, "latDEG").unwrap();
        let mut buf = vec![0.0_f32; 6];
        assert_eq!(reader.read_slice(&mut handle, &mut buf).unwrap(), SliceStatus::Read);
        assert_eq!(buf, vec![10.0, 10.0, 10.0, 20.0, 20.0, 20.0]);
    }

    #[test]
    fn depth_negates_the_configured_bathymetry_variable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mom.nc");
        write_mom_file(&path);

        let reader = MomRomsReader::open(
            vec![path],
            "",
            GeoCoordNames { lat_var: "geolat_t".into(), lon_var: "geolon_t".into(), depth_var: Some("ht".into()) },
        )
        .unwrap();

        assert!(reader.variables_2d_xy().contains(&"DEPTH".to_string()));

        let mut handle = reader.open_variable_read(0, "DEPTH").unwrap();
        let mut buf = vec![0.0_f32; 6];
        assert_eq!(reader.read_slice(&mut handle, &mut buf).unwrap(), SliceStatus::Read);
        assert_eq!(buf, vec![500.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0]);
    }

    #[test]
    fn depth_is_absent_without_a_configured_depth_var() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mom.nc");
        write_mom_file(&path);

        let reader = MomRomsReader::open(
            vec![path],
            "",
            GeoCoordNames { lat_var: "geolat_t".into(), lon_var: "geolon_t".into(), depth_var: None },
        )
        .unwrap();

        assert!(!reader.variables_2d_xy().contains(&"DEPTH".to_string()));
        assert!(reader.open_variable_read(0, "DEPTH").is_err());
    }
}
