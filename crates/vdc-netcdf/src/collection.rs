//! `NetCDFCollection`: treats a set of NetCDF files as one time-varying data
//! set (spec §4.7).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use vdc_common::{VdcError, VdcResult};

use crate::stagger::destagger_volume;

/// One collection time step's location: which file, and which local time
/// index within that file's own time dimension (0 if the file carries no
/// time dimension at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimeEntry {
    pub file_index: usize,
    pub local_time_index: usize,
}

/// A NetCDF file collection with one unified time axis built by one of the
/// three cases spec §4.7 distinguishes, plus staggered-dimension bookkeeping.
pub struct NetCDFCollection {
    files: Vec<PathBuf>,
    time_dim_name: Option<String>,
    time_var_name: Option<String>,
    /// Collection time step index -> (file, local time index).
    time_steps: Vec<FileTimeEntry>,
    /// Parallel to `time_steps`; the user-facing time stamp (raw numeric
    /// value from the time coordinate variable, or a synthesized ordinal
    /// when no such variable exists).
    user_times: Vec<f64>,
    staggered_dims: HashSet<String>,
}

impl NetCDFCollection {
    /// Open `files` and build the unified time axis.
    ///
    /// - `time_dim_name = None`: case 1, one time step per file.
    /// - `time_dim_name = Some(_)`, `time_var_name = None`: case 2, time
    ///   steps enumerated in file order then along the time dimension.
    /// - Both `Some`: case 3, time stamps read from the named 1D variable,
    ///   time steps ordered globally by stamp across files.
    pub fn open(
        files: Vec<PathBuf>,
        time_dim_name: Option<&str>,
        time_var_name: Option<&str>,
    ) -> VdcResult<Self> {
        let (time_steps, user_times) = match (time_dim_name, time_var_name) {
            (None, _) => Self::build_case1(&files)?,
            (Some(dim), None) => Self::build_case2(&files, dim)?,
            (Some(dim), Some(var)) => Self::build_case3(&files, dim, var)?,
        };

        Ok(Self {
            files,
            time_dim_name: time_dim_name.map(str::to_string),
            time_var_name: time_var_name.map(str::to_string),
            time_steps,
            user_times,
            staggered_dims: HashSet::new(),
        })
    }

    fn build_case1(files: &[PathBuf]) -> VdcResult<(Vec<FileTimeEntry>, Vec<f64>)> {
        let mut steps = Vec::with_capacity(files.len());
        let mut times = Vec::with_capacity(files.len());
        for (i, _) in files.iter().enumerate() {
            steps.push(FileTimeEntry { file_index: i, local_time_index: 0 });
            times.push(i as f64);
        }
        Ok((steps, times))
    }

    fn build_case2(files: &[PathBuf], time_dim: &str) -> VdcResult<(Vec<FileTimeEntry>, Vec<f64>)> {
        let mut steps = Vec::new();
        let mut times = Vec::new();
        for (i, path) in files.iter().enumerate() {
            let file = open_file(path)?;
            let n = file.dimension(time_dim).map(|d| d.len()).unwrap_or(1);
            for local in 0..n {
                steps.push(FileTimeEntry { file_index: i, local_time_index: local });
                times.push(steps.len() as f64 - 1.0);
            }
        }
        Ok((steps, times))
    }

    fn build_case3(files: &[PathBuf], time_dim: &str, time_var: &str) -> VdcResult<(Vec<FileTimeEntry>, Vec<f64>)> {
        let mut combined: Vec<(f64, FileTimeEntry)> = Vec::new();
        for (i, path) in files.iter().enumerate() {
            let file = open_file(path)?;
            let var = file.variable(time_var).ok_or_else(|| {
                VdcError::format(format!("{}: missing time variable '{time_var}'", path.display()))
            })?;
            let stamps = var
                .values::<f64>(None, None)
                .map_err(|e| VdcError::format(format!("{}: reading '{time_var}': {e}", path.display())))?
                .into_raw_vec();
            let _ = time_dim;
            for (local, &stamp) in stamps.iter().enumerate() {
                if combined.iter().any(|(t, _)| *t == stamp) {
                    continue;
                }
                combined.push((stamp, FileTimeEntry { file_index: i, local_time_index: local }));
            }
        }
        combined.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (times, steps) = combined.into_iter().unzip();
        Ok((steps, times))
    }

    pub fn num_time_steps(&self) -> usize {
        self.time_steps.len()
    }

    pub fn user_time(&self, ts: usize) -> Option<f64> {
        self.user_times.get(ts).copied()
    }

    pub fn time_entry(&self, ts: usize) -> Option<FileTimeEntry> {
        self.time_steps.get(ts).copied()
    }

    pub fn mark_staggered(&mut self, dim: impl Into<String>) {
        self.staggered_dims.insert(dim.into());
    }

    pub fn is_staggered_dim(&self, dim: &str) -> bool {
        self.staggered_dims.contains(dim)
    }

    /// Resolve which `(file, local time index)` actually holds `varname` at
    /// collection time step `ts`. Variables without the collection's time
    /// dimension are "constant" (spec §4.7 case 2): available at every time
    /// step, with the last file (by collection order) that defines them
    /// winning on a name collision across files.
    pub fn variable_time_entry(&self, ts: usize, varname: &str) -> VdcResult<FileTimeEntry> {
        let entry = self
            .time_steps
            .get(ts)
            .ok_or_else(|| VdcError::invalid_region(format!("time step {ts} out of range")))?;

        let file = open_file(&self.files[entry.file_index])?;
        if let Some(var) = file.variable(varname) {
            if self.touches_time_dim(&var) {
                return Ok(*entry);
            }
        }

        // Constant variable: scan files up to and including entry.file_index
        // for the last one that defines it.
        for file_index in (0..=entry.file_index).rev() {
            let file = open_file(&self.files[file_index])?;
            if file.variable(varname).is_some() {
                return Ok(FileTimeEntry { file_index, local_time_index: 0 });
            }
        }
        Err(VdcError::invalid_variable(varname, "not present in any file of the collection"))
    }

    fn touches_time_dim(&self, var: &netcdf::Variable) -> bool {
        let Some(time_dim) = &self.time_dim_name else { return false };
        var.dimensions().iter().any(|d| d.name() == *time_dim)
    }

    /// Read one 3D volume of `varname` at time step `ts`, applying
    /// staggered-dimension destaggering if the variable touches any
    /// staggered dimension (spec §4.7).
    pub fn read_volume(&self, ts: usize, varname: &str) -> VdcResult<(Vec<f32>, (usize, usize, usize))> {
        let entry = self.variable_time_entry(ts, varname)?;
        let path = &self.files[entry.file_index];
        let file = open_file(path)?;
        let var = file
            .variable(varname)
            .ok_or_else(|| VdcError::invalid_variable(varname, "missing from resolved file"))?;

        let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let has_time = self.time_dim_name.as_deref().map(|t| dim_names.iter().any(|d| d == t)).unwrap_or(false);
        let spatial_dims: Vec<usize> = var
            .dimensions()
            .iter()
            .zip(&dim_names)
            .filter(|(_, name)| self.time_dim_name.as_deref() != Some(name.as_str()))
            .map(|(d, _)| d.len())
            .collect();
        let spatial_names: Vec<String> = dim_names
            .iter()
            .filter(|name| self.time_dim_name.as_deref() != Some(name.as_str()))
            .cloned()
            .collect();

        if spatial_dims.len() < 2 || spatial_dims.len() > 3 {
            return Err(VdcError::invalid_variable(varname, "only 2D and 3D variables are supported"));
        }

        let (nz, ny, nx) = if spatial_dims.len() == 3 {
            (spatial_dims[0], spatial_dims[1], spatial_dims[2])
        } else {
            (1, spatial_dims[0], spatial_dims[1])
        };

        let mut start = vec![0usize; dim_names.len()];
        let mut count: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        if has_time {
            let time_axis = dim_names.iter().position(|n| Some(n.as_str()) == self.time_dim_name.as_deref()).unwrap();
            start[time_axis] = entry.local_time_index;
            count[time_axis] = 1;
        }

        let raw = var
            .values::<f32>(Some(&start), Some(&count))
            .map_err(|e| VdcError::format(format!("reading '{varname}': {e}")))?
            .into_raw_vec();

        let xstag = self.is_staggered_dim(spatial_names.last().unwrap());
        let ystag = spatial_names.len() >= 2 && self.is_staggered_dim(&spatial_names[spatial_names.len() - 2]);
        let zstag = spatial_names.len() == 3 && self.is_staggered_dim(&spatial_names[0]);

        if !xstag && !ystag && !zstag {
            return Ok((raw, (nx, ny, nz)));
        }

        let mv = missing_value_attr(&var);
        let (out, nxus, nyus, nzus) = destagger_volume(&raw, nx, ny, nz, xstag, ystag, zstag, mv);
        Ok((out, (nxus, nyus, nzus)))
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

fn open_file(path: &Path) -> VdcResult<netcdf::File> {
    netcdf::open(path).map_err(|e| VdcError::io(format!("opening {}: {e}", path.display())))
}
