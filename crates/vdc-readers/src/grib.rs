//! GRIB2 reader (spec §4.8): organizes messages by `(variable, time, level)`
//! and reads a single 2D slice per message. Parameter short names come from
//! `vdc_grib2::Grib2Message::parameter`, which already resolves the
//! parameter-category/number pair through `vdc_grib2::tables` — the same
//! lookup `original_source/lib/vdf/GribParser.cpp` performs by hand.

use std::collections::BTreeMap;
use std::path::Path;

use vdc_common::{VdcError, VdcResult};
use vdc_grib2::{Grib2Message, Grib2Reader};

use crate::trait_def::{DcReader, Extents, VariableHandle};

struct IndexedMessage {
    time_step: usize,
    level_index: usize,
    message: Grib2Message,
}

pub struct GribReader {
    /// variable short name -> messages, grouped by (time, level).
    index: BTreeMap<String, Vec<IndexedMessage>>,
    num_time_steps: usize,
    user_times: Vec<f64>,
    grid_dim: (usize, usize, usize),
    lon_exts: (f64, f64),
    lat_exts: (f64, f64),
}

impl GribReader {
    pub fn open(path: impl AsRef<Path>) -> VdcResult<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| VdcError::io(format!("reading {}: {e}", path.as_ref().display())))?;
        let mut reader = Grib2Reader::new(bytes::Bytes::from(bytes));

        let mut index: BTreeMap<String, Vec<IndexedMessage>> = BTreeMap::new();
        let mut time_stamps: Vec<f64> = Vec::new();
        let mut grid_dim = (0usize, 0usize, 0usize);
        let mut lon_exts = (f64::INFINITY, f64::NEG_INFINITY);
        let mut lat_exts = (f64::INFINITY, f64::NEG_INFINITY);

        while reader.has_more() {
            let offset = reader.position();
            let message = reader
                .next_message()
                .map_err(|e| VdcError::format(format!("malformed GRIB2 message at offset {offset}: {e}")))?;
            let Some(message) = message else { break };

            let stamp = message.valid_time().timestamp() as f64;
            let time_step = match time_stamps.iter().position(|&t| t == stamp) {
                Some(i) => i,
                None => {
                    time_stamps.push(stamp);
                    time_stamps.len() - 1
                }
            };

            let (nlat, nlon) = message.grid_dims();
            grid_dim.0 = grid_dim.0.max(nlon as usize);
            grid_dim.1 = grid_dim.1.max(nlat as usize);

            let gd = &message.grid_definition;
            let lon0 = gd.first_longitude_millidegrees as f64 / 1000.0;
            let lon1 = gd.last_longitude_millidegrees as f64 / 1000.0;
            let lat0 = gd.first_latitude_millidegrees as f64 / 1000.0;
            let lat1 = gd.last_latitude_millidegrees as f64 / 1000.0;
            lon_exts = (lon_exts.0.min(lon0.min(lon1)), lon_exts.1.max(lon0.max(lon1)));
            lat_exts = (lat_exts.0.min(lat0.min(lat1)), lat_exts.1.max(lat0.max(lat1)));

            let entries = index.entry(message.parameter().to_string()).or_default();
            let level_index = entries.iter().filter(|m| m.time_step == time_step).count();
            grid_dim.2 = grid_dim.2.max(level_index + 1);
            entries.push(IndexedMessage { time_step, level_index, message });
        }

        Ok(Self {
            index,
            num_time_steps: time_stamps.len(),
            user_times: time_stamps,
            grid_dim,
            lon_exts,
            lat_exts,
        })
    }
}

impl DcReader for GribReader {
    fn variables_3d(&self) -> Vec<String> {
        self.index
            .iter()
            .filter(|(_, msgs)| msgs.iter().map(|m| m.level_index).max().unwrap_or(0) > 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn variables_2d_xy(&self) -> Vec<String> {
        self.index
            .iter()
            .filter(|(_, msgs)| msgs.iter().map(|m| m.level_index).max().unwrap_or(0) == 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn num_time_steps(&self) -> usize {
        self.num_time_steps
    }

    fn ts_user_time(&self, ts: usize) -> VdcResult<f64> {
        self.user_times.get(ts).copied().ok_or_else(|| VdcError::invalid_region(format!("time step {ts} out of range")))
    }

    fn grid_dim(&self) -> (usize, usize, usize) {
        self.grid_dim
    }

    fn extents(&self) -> VdcResult<Extents> {
        let (min_x, min_y, max_x, max_y) =
            vdc_metadata::cartographic_extents("", self.lon_exts, self.lat_exts)?;
        Ok(([min_x, min_y, 0.0], [max_x, max_y, self.grid_dim.2 as f64]))
    }

    fn map_projection(&self) -> &str {
        ""
    }

    fn open_variable_read(&self, ts: usize, varname: &str) -> VdcResult<VariableHandle> {
        let entries = self
            .index
            .get(varname)
            .ok_or_else(|| VdcError::invalid_variable(varname, "no GRIB2 messages for this parameter"))?;
        let mut at_ts: Vec<&IndexedMessage> = entries.iter().filter(|m| m.time_step == ts).collect();
        if at_ts.is_empty() {
            return Err(VdcError::invalid_variable(varname, format!("no message at time step {ts}")));
        }
        at_ts.sort_by_key(|m| m.level_index);

        let mut data = Vec::new();
        let mut slice_len = 0;
        for entry in at_ts {
            let values = entry.message.unpack_data().map_err(|e| VdcError::format(format!("unpacking '{varname}': {e}")))?;
            slice_len = values.len();
            data.extend(values);
        }
        VariableHandle::new(data, slice_len)
    }
}
