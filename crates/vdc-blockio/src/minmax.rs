//! Per-block min/max table sidecar (spec §3 "Min/max tables", §6: "Auxiliary
//! sidecar files hold block min/max arrays").
//!
//! This is kept separate from the lambda/gamma block file because its keys
//! are plain `(level, block coordinate)` pairs, not `(level, band, block
//! coordinate)` — a block's min/max is a property of its voxel content, not
//! of any one wavelet subband, and at coarser levels no gamma band even
//! exists for the lambda-only blocks this table still needs an entry for.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vdc_common::{Coord3, DataRange, VdcError, VdcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MinMaxKey {
    pub level: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl MinMaxKey {
    pub fn new(level: u32, coord: Coord3) -> Self {
        Self {
            level,
            x: coord.x as u32,
            y: coord.y as u32,
            z: coord.z as u32,
        }
    }

    pub fn coord(&self) -> Coord3 {
        Coord3::new(self.x as usize, self.y as usize, self.z as usize)
    }
}

/// Sidecar path for a block data file: `foo.vdb` -> `foo.vdb.minmax`.
pub fn sidecar_path(block_file: impl AsRef<Path>) -> PathBuf {
    let mut name = block_file.as_ref().as_os_str().to_owned();
    name.push(".minmax");
    PathBuf::from(name)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MinMaxFile {
    entries: Vec<(MinMaxKey, DataRange)>,
}

/// Accumulates one variable's per-block min/max table across every
/// refinement level, then flushes it as a single JSON sidecar file.
#[derive(Debug, Default)]
pub struct MinMaxWriter {
    file: MinMaxFile,
}

impl MinMaxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, level: u32, coord: Coord3, range: DataRange) {
        self.file.entries.push((MinMaxKey::new(level, coord), range));
    }

    /// Write the sidecar for `block_file`. Takes the main block file's path,
    /// not the sidecar path itself, so callers don't have to know the sidecar
    /// naming convention.
    pub fn write(&self, block_file: impl AsRef<Path>) -> VdcResult<()> {
        let path = sidecar_path(&block_file);
        let bytes = serde_json::to_vec(&self.file)
            .map_err(|e| VdcError::format(format!("serializing min/max table: {e}")))?;
        std::fs::write(&path, bytes)
            .map_err(|e| VdcError::io(format!("writing {}: {e}", path.display())))
    }
}

/// Random-access reader over a sidecar written by [`MinMaxWriter`].
pub struct MinMaxReader {
    entries: BTreeMap<MinMaxKey, DataRange>,
}

impl MinMaxReader {
    pub fn open(block_file: impl AsRef<Path>) -> VdcResult<Self> {
        let path = sidecar_path(&block_file);
        let bytes = std::fs::read(&path)
            .map_err(|e| VdcError::io(format!("reading {}: {e}", path.display())))?;
        let parsed: MinMaxFile = serde_json::from_slice(&bytes)
            .map_err(|e| VdcError::format(format!("parsing min/max table: {e}")))?;
        Ok(Self {
            entries: parsed.entries.into_iter().collect(),
        })
    }

    pub fn get(&self, level: u32, coord: Coord3) -> Option<DataRange> {
        self.entries.get(&MinMaxKey::new(level, coord)).copied()
    }

    pub fn for_level(&self, level: u32) -> impl Iterator<Item = (Coord3, DataRange)> + '_ {
        self.entries
            .iter()
            .filter(move |(k, _)| k.level == level)
            .map(|(k, v)| (k.coord(), *v))
    }

    /// Min/max across every finest-level block — the variable-wide
    /// `DataRange` (spec §3).
    pub fn variable_range(&self, finest_level: u32) -> Option<DataRange> {
        self.for_level(finest_level)
            .map(|(_, r)| r)
            .reduce(DataRange::union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_then_reads_back_per_level_entries() {
        let dir = tempdir().unwrap();
        let block_file = dir.path().join("v.vdb");

        let mut w = MinMaxWriter::new();
        w.insert(0, Coord3::new(0, 0, 0), DataRange::new(1.0, 9.0));
        w.insert(1, Coord3::new(0, 0, 0), DataRange::new(2.0, 8.0));
        w.insert(1, Coord3::new(1, 0, 0), DataRange::new(-3.0, 4.0));
        w.write(&block_file).unwrap();

        let r = MinMaxReader::open(&block_file).unwrap();
        assert_eq!(r.get(0, Coord3::new(0, 0, 0)), Some(DataRange::new(1.0, 9.0)));
        assert_eq!(r.get(1, Coord3::new(1, 0, 0)), Some(DataRange::new(-3.0, 4.0)));
        assert!(r.get(1, Coord3::new(9, 9, 9)).is_none());

        let level1: Vec<_> = r.for_level(1).collect();
        assert_eq!(level1.len(), 2);
    }

    #[test]
    fn variable_range_unions_the_finest_level_only() {
        let dir = tempdir().unwrap();
        let block_file = dir.path().join("v.vdb");

        let mut w = MinMaxWriter::new();
        w.insert(0, Coord3::new(0, 0, 0), DataRange::new(-100.0, 100.0));
        w.insert(1, Coord3::new(0, 0, 0), DataRange::new(2.0, 8.0));
        w.insert(1, Coord3::new(1, 0, 0), DataRange::new(-3.0, 4.0));
        w.write(&block_file).unwrap();

        let r = MinMaxReader::open(&block_file).unwrap();
        assert_eq!(r.variable_range(1), Some(DataRange::new(-3.0, 8.0)));
    }
}
