//! Append-only block file writer.
//!
//! Blocks are appended in whatever order the caller hands them to
//! [`BlockFileWriter::write_block`] — the region writer controls that order
//! (spec §4.3: coarsest-lambda-first, then per-level gamma in block-grid row
//! major order). A trailing JSON index records each block's offset, byte
//! length and per-block min/max, so the reader never has to scan the file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use vdc_common::{DataRange, VdcError, VdcResult};

use crate::key::BlockKey;

const FOOTER_MAGIC: u32 = 0x5644_4231; // "VDB1"

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct IndexEntry {
    pub offset: u64,
    pub len_bytes: u64,
    pub range: DataRange,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub(crate) struct BlockIndex {
    pub entries: Vec<(BlockKey, IndexEntry)>,
}

/// Writes a sequence of same-crate-format blocks to a single file, fatal on
/// any short write (spec §5: block I/O is all-or-nothing; partial writes are
/// resource errors, not silently retried).
pub struct BlockFileWriter {
    file: BufWriter<File>,
    cursor: u64,
    index: BlockIndex,
    seen: std::collections::HashSet<BlockKey>,
}

impl BlockFileWriter {
    pub fn create(path: impl AsRef<Path>) -> VdcResult<Self> {
        let file = File::create(path.as_ref())
            .map_err(|e| VdcError::io(format!("creating {}: {e}", path.as_ref().display())))?;
        Ok(Self {
            file: BufWriter::new(file),
            cursor: 0,
            index: BlockIndex::default(),
            seen: std::collections::HashSet::new(),
        })
    }

    /// Append `data` under `key`. Fails if `key` was already written to this
    /// file — each block is written exactly once per file (spec §4.3).
    pub fn write_block(&mut self, key: BlockKey, data: &[f32]) -> VdcResult<()> {
        if !self.seen.insert(key) {
            return Err(VdcError::format(format!(
                "block {key:?} written more than once to the same file"
            )));
        }

        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.file
            .write_all(&bytes)
            .map_err(|e| VdcError::io(format!("writing block {key:?}: {e}")))?;

        self.index.entries.push((
            key,
            IndexEntry {
                offset: self.cursor,
                len_bytes: bytes.len() as u64,
                range: DataRange::of_slice(data),
            },
        ));
        self.cursor += bytes.len() as u64;
        Ok(())
    }

    /// Flush all blocks, append the index, and close the file.
    pub fn finish(mut self) -> VdcResult<()> {
        let index_json = serde_json::to_vec(&self.index)
            .map_err(|e| VdcError::format(format!("serializing block index: {e}")))?;
        let index_offset = self.cursor;
        let index_len = index_json.len() as u64;

        self.file
            .write_all(&index_json)
            .map_err(|e| VdcError::io(format!("writing block index: {e}")))?;
        self.file
            .write_all(&index_offset.to_le_bytes())
            .map_err(VdcError::from)?;
        self.file
            .write_all(&index_len.to_le_bytes())
            .map_err(VdcError::from)?;
        self.file
            .write_all(&FOOTER_MAGIC.to_le_bytes())
            .map_err(VdcError::from)?;
        self.file.flush().map_err(VdcError::from)?;
        Ok(())
    }
}

pub(crate) const FOOTER_LEN: usize = 8 + 8 + 4;
pub(crate) const FOOTER_MAGIC_VALUE: u32 = FOOTER_MAGIC;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vdc_common::Coord3;

    #[test]
    fn rejects_duplicate_block_key() {
        let dir = tempdir().unwrap();
        let mut w = BlockFileWriter::create(dir.path().join("v.vdb")).unwrap();
        let key = BlockKey::lambda(0, Coord3::new(0, 0, 0));
        w.write_block(key, &[1.0, 2.0]).unwrap();
        assert!(w.write_block(key, &[3.0, 4.0]).is_err());
    }
}
