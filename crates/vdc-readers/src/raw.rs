//! Raw flat-binary volume reader (spec §4.8, grounded on
//! `original_source/apps/raw2vdf/raw2vdf.cpp`): a single contiguous volume
//! per file, dimensions and datatype supplied by the caller since raw files
//! carry no self-describing header.

use std::fs;
use std::path::PathBuf;

use vdc_common::{VdcError, VdcResult};

use crate::trait_def::{DcReader, Extents, VariableHandle};

#[derive(Debug, Clone, Copy)]
pub enum RawDatatype {
    F32,
    F64,
}

pub struct RawReaderConfig {
    pub varname: String,
    pub dims: (usize, usize, usize),
    pub datatype: RawDatatype,
    pub swap_bytes: bool,
}

/// One raw volume file per time step, one variable per reader instance
/// (matching `raw2vdf`'s one-file-one-variable-one-timestep-per-invocation
/// convention).
pub struct RawReader {
    files: Vec<PathBuf>,
    config: RawReaderConfig,
}

impl RawReader {
    pub fn open(files: Vec<PathBuf>, config: RawReaderConfig) -> Self {
        Self { files, config }
    }

    fn read_volume(&self, ts: usize) -> VdcResult<Vec<f32>> {
        let path = self.files.get(ts).ok_or_else(|| VdcError::invalid_region(format!("time step {ts} out of range")))?;
        let bytes = fs::read(path).map_err(|e| VdcError::io(format!("reading {}: {e}", path.display())))?;
        let (nx, ny, nz) = self.config.dims;
        let expected_elems = nx * ny * nz;

        match self.config.datatype {
            RawDatatype::F32 => {
                let expected_bytes = expected_elems * 4;
                if bytes.len() != expected_bytes {
                    return Err(VdcError::format(format!(
                        "{}: expected {expected_bytes} bytes for a {nx}x{ny}x{nz} f32 volume, got {}",
                        path.display(),
                        bytes.len()
                    )));
                }
                Ok(bytes
                    .chunks_exact(4)
                    .map(|c| {
                        let mut b: [u8; 4] = c.try_into().unwrap();
                        if self.config.swap_bytes {
                            b.reverse();
                        }
                        f32::from_ne_bytes(b)
                    })
                    .collect())
            }
            RawDatatype::F64 => {
                let expected_bytes = expected_elems * 8;
                if bytes.len() != expected_bytes {
                    return Err(VdcError::format(format!(
                        "{}: expected {expected_bytes} bytes for a {nx}x{ny}x{nz} f64 volume, got {}",
                        path.display(),
                        bytes.len()
                    )));
                }
                Ok(bytes
                    .chunks_exact(8)
                    .map(|c| {
                        let mut b: [u8; 8] = c.try_into().unwrap();
                        if self.config.swap_bytes {
                            b.reverse();
                        }
                        f64::from_ne_bytes(b) as f32
                    })
                    .collect())
            }
        }
    }
}

impl DcReader for RawReader {
    fn variables_3d(&self) -> Vec<String> {
        vec![self.config.varname.clone()]
    }

    fn variables_2d_xy(&self) -> Vec<String> {
        Vec::new()
    }

    fn num_time_steps(&self) -> usize {
        self.files.len()
    }

    fn ts_user_time(&self, ts: usize) -> VdcResult<f64> {
        if ts >= self.files.len() {
            return Err(VdcError::invalid_region(format!("time step {ts} out of range")));
        }
        Ok(ts as f64)
    }

    fn grid_dim(&self) -> (usize, usize, usize) {
        self.config.dims
    }

    fn extents(&self) -> VdcResult<Extents> {
        let (nx, ny, nz) = self.config.dims;
        Ok(([0.0, 0.0, 0.0], [nx as f64, ny as f64, nz as f64]))
    }

    fn map_projection(&self) -> &str {
        ""
    }

    fn open_variable_read(&self, ts: usize, varname: &str) -> VdcResult<VariableHandle> {
        if varname != self.config.varname {
            return Err(VdcError::invalid_variable(varname, "not the variable this raw reader was opened for"));
        }
        let (nx, ny, _) = self.config.dims;
        let data = self.read_volume(ts)?;
        VariableHandle::new(data, nx * ny)
    }
}
