//! FLASH/Paramesh checkpoint block-topology import (spec §9B), re-exposing
//! `vdc_amr::ParameshBlockTable` at this crate's reader layer.
//!
//! Actual FLASH checkpoints are HDF5; no `hdf5` crate is pinned in this
//! workspace (it is a heavyweight native dependency the rest of the stack
//! has no other use for), so this module covers the table-import algorithm
//! given already-parsed `gid`/`bbox`/`lrefine` arrays — the part
//! `flashhdf5.cpp`/`flashvdfcreate.cpp` hand off to `AmrTree` construction —
//! and leaves HDF5 file access to the caller.

pub use vdc_amr::ParameshBlockTable;

use vdc_amr::AmrTree;

/// Extents of a FLASH run in its own cartesian units, read from the
/// checkpoint's "real runtime parameters" table (an array of `(name, value)`
/// pairs; HDF5 decoding of the fixed-width name field happens upstream of
/// this function, same boundary as [`ParameshBlockTable`]'s `gid`/`bbox`
/// arrays) — used as a fallback when no grid file supplies extents directly.
///
/// The original scan has a copy-paste bug: its second `xmin` branch should
/// read `ymin`, so `ymin` is never actually captured and the y-extent's
/// minimum is silently left at its `-1.0` sentinel. This reads `ymin`
/// correctly instead of reproducing that bug.
pub fn real_run_param_extents(params: &[(String, f64)]) -> [f64; 6] {
    let mut extents = [-1.0; 6];
    for (name, value) in params {
        match name.as_str() {
            "xmin" => extents[0] = *value,
            "xmax" => extents[1] = *value,
            "ymin" => extents[2] = *value,
            "ymax" => extents[3] = *value,
            "zmin" => extents[4] = *value,
            "zmax" => extents[5] = *value,
            _ => {}
        }
    }
    extents
}

/// Owned variant of [`ParameshBlockTable`] for callers that have already
/// materialized the three parallel arrays (e.g. from a FLASH checkpoint
/// parsed elsewhere) and want to hand off ownership rather than borrow.
pub struct OwnedParameshBlockTable {
    pub gid: Vec<i32>,
    pub bbox: Vec<[f64; 6]>,
    pub lrefine: Vec<i32>,
}

impl OwnedParameshBlockTable {
    pub fn new(gid: Vec<i32>, bbox: Vec<[f64; 6]>, lrefine: Vec<i32>) -> Self {
        Self { gid, bbox, lrefine }
    }

    pub fn import(&self) -> AmrTree {
        ParameshBlockTable::new(&self.gid, &self.bbox, &self.lrefine).import()
    }
}
