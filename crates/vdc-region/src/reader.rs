//! Region reader: reconstructs any refinement level (or a cropped voxel
//! window of it) from the stored lambda/gamma pyramid (spec §4.4).

use std::collections::HashMap;
use std::path::Path;

use vdc_blockio::{BlockFileReader, BlockKey, MinMaxReader};
use vdc_common::{Coord3, DataRange, VdcError, VdcResult, VoxelBox, WaveletKernel};
use vdc_wavelet::{inverse_superblock, Block3, NUM_GAMMA_BANDS};

use crate::geometry::GridGeometry;
use crate::writer::block_range_iter;

pub struct RegionReader {
    geometry: GridGeometry,
    kernel: WaveletKernel,
    blockio: BlockFileReader,
    minmax: MinMaxReader,
}

impl RegionReader {
    pub fn open(
        path: impl AsRef<Path>,
        geometry: GridGeometry,
        kernel: WaveletKernel,
    ) -> VdcResult<Self> {
        Ok(Self {
            geometry,
            kernel,
            blockio: BlockFileReader::open(&path)?,
            minmax: MinMaxReader::open(&path)?,
        })
    }

    /// Reconstruct the full block-grid at `level`, keyed by block coordinate.
    fn reconstruct_blocks(&self, level: u32) -> VdcResult<HashMap<Coord3, Block3>> {
        if level > self.geometry.max_level {
            return Err(VdcError::invalid_region(format!(
                "level {level} exceeds max level {}",
                self.geometry.max_level
            )));
        }

        if level == 0 {
            let grid0 = self.geometry.block_grid_dims(0);
            let mut map = HashMap::with_capacity(grid0.x * grid0.y * grid0.z);
            for bc in block_range_iter(grid0) {
                let key = BlockKey::lambda(0, bc);
                let data = self.blockio.read_block(&key)?;
                map.insert(bc, Block3::from_data(self.geometry.block_dims, data));
            }
            return Ok(map);
        }

        let parent = self.reconstruct_blocks(level - 1)?;
        let parent_grid = self.geometry.block_grid_dims(level - 1);
        let current_grid = self.geometry.block_grid_dims(level);
        let bdim = self.geometry.block_dims;
        let mut out = HashMap::with_capacity(current_grid.x * current_grid.y * current_grid.z);

        for pc in block_range_iter(parent_grid) {
            let lambda = parent
                .get(&pc)
                .ok_or_else(|| VdcError::format(format!("missing parent block {pc}")))?;

            let mut gammas: [Block3; NUM_GAMMA_BANDS] = std::array::from_fn(|_| Block3::zeros(bdim));
            for (band_idx, slot) in gammas.iter_mut().enumerate() {
                let key = BlockKey::gamma(level, (band_idx + 1) as u8, pc);
                let data = self.blockio.read_block(&key)?;
                *slot = Block3::from_data(bdim, data);
            }

            let superblock = inverse_superblock(self.kernel, lambda, &gammas)?;

            for (cz, offz) in [(0usize, 0usize), (1, 1)] {
                let real_z = (pc.z * 2 + cz).min(current_grid.z - 1);
                for (cy, offy) in [(0usize, 0usize), (1, 1)] {
                    let real_y = (pc.y * 2 + cy).min(current_grid.y - 1);
                    for (cx, offx) in [(0usize, 0usize), (1, 1)] {
                        let real_x = (pc.x * 2 + cx).min(current_grid.x - 1);
                        let child = extract(&superblock, offx * bdim.x, offy * bdim.y, offz * bdim.z, bdim);
                        out.insert(Coord3::new(real_x, real_y, real_z), child);
                    }
                }
            }
        }

        Ok(out)
    }

    /// Reconstruct `level` and stitch its blocks into one flat row-major
    /// buffer covering the level's full padded extent.
    pub fn read_level(&self, level: u32) -> VdcResult<(Coord3, Vec<f32>)> {
        let blocks = self.reconstruct_blocks(level)?;
        let grid = self.geometry.block_grid_dims(level);
        let bdim = self.geometry.block_dims;
        let dims = grid.product(bdim);
        let mut out = vec![0.0f32; dims.x * dims.y * dims.z];

        for (bc, block) in &blocks {
            for z in 0..bdim.z {
                for y in 0..bdim.y {
                    for x in 0..bdim.x {
                        let gx = bc.x * bdim.x + x;
                        let gy = bc.y * bdim.y + y;
                        let gz = bc.z * bdim.z + z;
                        let dst = gz * dims.y * dims.x + gy * dims.x + gx;
                        out[dst] = block.get(x, y, z);
                    }
                }
            }
        }

        Ok((dims, out))
    }

    /// Reconstruct `level` and crop to `region` (voxel coordinates relative
    /// to that level's own padded extent).
    pub fn read_region(&self, level: u32, region: VoxelBox) -> VdcResult<(Coord3, Vec<f32>)> {
        let (dims, full) = self.read_level(level)?;
        if !region.is_valid()
            || region.max.x >= dims.x
            || region.max.y >= dims.y
            || region.max.z >= dims.z
        {
            return Err(VdcError::invalid_region(format!(
                "region {region:?} out of bounds for level dims {dims}"
            )));
        }
        let out_dims = region.dims();
        let mut out = vec![0.0f32; out_dims.x * out_dims.y * out_dims.z];
        for z in 0..out_dims.z {
            for y in 0..out_dims.y {
                for x in 0..out_dims.x {
                    let src = (region.min.z + z) * dims.y * dims.x
                        + (region.min.y + y) * dims.x
                        + (region.min.x + x);
                    let dst = z * out_dims.y * out_dims.x + y * out_dims.x + x;
                    out[dst] = full[src];
                }
            }
        }
        Ok((out_dims, out))
    }

    /// Stored voxel min/max of a single block at `level`, from the min/max
    /// table (spec §3, §6), not from the lambda/gamma coefficient streams —
    /// `min <= every voxel of that block <= max` at every level (testable
    /// property 2).
    pub fn block_min_max(&self, level: u32, coord: Coord3) -> Option<DataRange> {
        self.minmax.get(level, coord)
    }

    /// Union of the stored voxel min/max for every block at `level` (cheap
    /// metadata-only range; callers wanting the *data* range of a
    /// reconstructed level should use [`DataRange::of_slice`] on the result
    /// of [`Self::read_level`] instead).
    pub fn stored_block_range(&self, level: u32) -> Option<DataRange> {
        self.minmax
            .for_level(level)
            .map(|(_, r)| r)
            .reduce(DataRange::union)
    }

    /// The variable-wide `DataRange` across all finest-level blocks (spec
    /// §3: "A variable-wide `DataRange` equals the min/max across all
    /// finest-level blocks").
    pub fn variable_range(&self) -> Option<DataRange> {
        self.minmax.variable_range(self.geometry.max_level)
    }
}

fn extract(block: &Block3, ox: usize, oy: usize, oz: usize, dims: Coord3) -> Block3 {
    let mut out = Block3::zeros(dims);
    for z in 0..dims.z {
        for y in 0..dims.y {
            for x in 0..dims.x {
                out.set(x, y, z, block.get(ox + x, oy + y, oz + z));
            }
        }
    }
    out
}
