//! Block file reader.

use std::collections::BTreeMap;
use std::path::Path;

use vdc_common::{DataRange, VdcError, VdcResult};

use crate::key::BlockKey;
use crate::writer::{BlockIndex, IndexEntry, FOOTER_LEN, FOOTER_MAGIC_VALUE};

/// Random-access reader over a file written by [`crate::writer::BlockFileWriter`].
///
/// The whole file is read into memory at open time. VDC data files are one
/// variable/timestep each and bounded by the dataset's own block budget, so
/// this is simpler than streaming I/O and matches how the region reader
/// already buffers a full superblock at a time.
pub struct BlockFileReader {
    data: Vec<u8>,
    index: BTreeMap<BlockKey, IndexEntry>,
}

impl BlockFileReader {
    pub fn open(path: impl AsRef<Path>) -> VdcResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| VdcError::io(format!("reading {}: {e}", path.display())))?;

        if data.len() < FOOTER_LEN {
            return Err(VdcError::format("block file too short to contain a footer"));
        }
        let footer = &data[data.len() - FOOTER_LEN..];
        let index_offset = u64::from_le_bytes(footer[0..8].try_into().unwrap()) as usize;
        let index_len = u64::from_le_bytes(footer[8..16].try_into().unwrap()) as usize;
        let magic = u32::from_le_bytes(footer[16..20].try_into().unwrap());
        if magic != FOOTER_MAGIC_VALUE {
            return Err(VdcError::format("block file footer magic mismatch"));
        }
        if index_offset + index_len > data.len() {
            return Err(VdcError::format("block file index extends past end of file"));
        }

        let index_bytes = &data[index_offset..index_offset + index_len];
        let parsed: BlockIndex = serde_json::from_slice(index_bytes)
            .map_err(|e| VdcError::format(format!("parsing block index: {e}")))?;
        let index = parsed.entries.into_iter().collect();

        Ok(Self { data, index })
    }

    pub fn has_block(&self, key: &BlockKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn min_max(&self, key: &BlockKey) -> Option<DataRange> {
        self.index.get(key).map(|e| e.range)
    }

    pub fn read_block(&self, key: &BlockKey) -> VdcResult<Vec<f32>> {
        let entry = self
            .index
            .get(key)
            .ok_or_else(|| VdcError::invalid_variable("<block>", format!("no block at {key:?}")))?;
        let start = entry.offset as usize;
        let end = start + entry.len_bytes as usize;
        if end > self.data.len() {
            return Err(VdcError::format(format!(
                "block {key:?} extends past end of file"
            )));
        }
        let bytes = &self.data[start..end];
        if bytes.len() % 4 != 0 {
            return Err(VdcError::format(format!(
                "block {key:?} byte length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect())
    }

    /// All block keys present for a given level, in ascending key order.
    pub fn keys_for_level(&self, level: u32) -> impl Iterator<Item = &BlockKey> {
        self.index.keys().filter(move |k| k.level == level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::BlockFileWriter;
    use tempfile::tempdir;
    use vdc_common::Coord3;

    #[test]
    fn writes_then_reads_back_exactly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v.vdb");
        let key0 = BlockKey::lambda(0, Coord3::new(0, 0, 0));
        let key1 = BlockKey::gamma(0, 1, Coord3::new(0, 0, 0));

        let mut w = BlockFileWriter::create(&path).unwrap();
        w.write_block(key0, &[1.0, 2.0, 3.0]).unwrap();
        w.write_block(key1, &[-1.0, 0.0, 9.5]).unwrap();
        w.finish().unwrap();

        let r = BlockFileReader::open(&path).unwrap();
        assert_eq!(r.read_block(&key0).unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(r.read_block(&key1).unwrap(), vec![-1.0, 0.0, 9.5]);
        assert_eq!(r.min_max(&key0).unwrap().min, 1.0);
        assert_eq!(r.min_max(&key1).unwrap().max, 9.5);
        assert!(!r.has_block(&BlockKey::lambda(1, Coord3::new(0, 0, 0))));
    }

    #[test]
    fn missing_block_is_invalid_variable_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v.vdb");
        let mut w = BlockFileWriter::create(&path).unwrap();
        w.write_block(BlockKey::lambda(0, Coord3::new(0, 0, 0)), &[1.0])
            .unwrap();
        w.finish().unwrap();

        let r = BlockFileReader::open(&path).unwrap();
        let missing = BlockKey::lambda(5, Coord3::new(9, 9, 9));
        assert!(r.read_block(&missing).is_err());
    }
}
