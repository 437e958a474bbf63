//! The common source-format reader contract (spec §4.8).
//!
//! The original toolkit exposes this as a C++ abstract base with virtual
//! `OpenVariableRead`/`ReadSlice`/`CloseVariable` methods; this tree instead
//! dispatches across WRF/MOM/ROMS/GRIB/raw backends behind one `DcReader`
//! trait object, the same tagged-dispatch idiom the pack uses to front
//! heterogeneous ingestion backends behind one entry point.

use vdc_common::{VdcError, VdcResult};

/// Result of one [`DcReader::read_slice`] call: `1`/`0`/`<0` in the original
/// C++ contract, `Read`/`Eof` here (errors use `Result::Err` instead of a
/// negative code).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceStatus {
    Read,
    Eof,
}

/// An open variable: the whole volume pulled up front (spec §9's
/// "staggered-dim on-the-fly interpolation" note already pulls a full
/// staggered slice before averaging, so there is no streaming I/O win from
/// reading this lazily) sliced out one `nx*ny` plane per [`read_slice`] call.
pub struct VariableHandle {
    data: Vec<f32>,
    slice_len: usize,
    next_slice: usize,
    num_slices: usize,
}

impl VariableHandle {
    pub fn new(data: Vec<f32>, slice_len: usize) -> VdcResult<Self> {
        if slice_len == 0 || data.len() % slice_len != 0 {
            return Err(VdcError::format(format!(
                "variable data length {} is not a multiple of slice length {slice_len}",
                data.len()
            )));
        }
        let num_slices = data.len() / slice_len;
        Ok(Self { data, slice_len, next_slice: 0, num_slices })
    }

    pub fn read_slice(&mut self, buf: &mut [f32]) -> VdcResult<SliceStatus> {
        if self.next_slice >= self.num_slices {
            return Ok(SliceStatus::Eof);
        }
        if buf.len() < self.slice_len {
            return Err(VdcError::invalid_region(format!(
                "read_slice buffer too small: need {}, got {}",
                self.slice_len,
                buf.len()
            )));
        }
        let start = self.next_slice * self.slice_len;
        buf[..self.slice_len].copy_from_slice(&self.data[start..start + self.slice_len]);
        self.next_slice += 1;
        Ok(SliceStatus::Read)
    }

    /// Number of `f32`s in one slice (one `nx*ny` plane).
    pub fn slice_len(&self) -> usize {
        self.slice_len
    }

    /// Drain every remaining slice into one contiguous buffer, in order.
    /// A convenience for callers (the `*2vdc` converters) that want the
    /// whole volume rather than driving [`Self::read_slice`] by hand.
    pub fn read_all(&mut self) -> Vec<f32> {
        let start = self.next_slice * self.slice_len;
        self.next_slice = self.num_slices;
        self.data[start..].to_vec()
    }
}

/// Grid extents as a `(min, max)` pair of `(x, y, z)` meters.
pub type Extents = ([f64; 3], [f64; 3]);

pub trait DcReader {
    fn variables_3d(&self) -> Vec<String>;
    fn variables_2d_xy(&self) -> Vec<String>;
    fn num_time_steps(&self) -> usize;
    fn ts_user_time(&self, ts: usize) -> VdcResult<f64>;
    fn grid_dim(&self) -> (usize, usize, usize);
    fn extents(&self) -> VdcResult<Extents>;
    fn map_projection(&self) -> &str;
    fn open_variable_read(&self, ts: usize, varname: &str) -> VdcResult<VariableHandle>;

    fn read_slice(&self, handle: &mut VariableHandle, buf: &mut [f32]) -> VdcResult<SliceStatus> {
        handle.read_slice(buf)
    }

    fn close_variable(&self, _handle: VariableHandle) {}
}
