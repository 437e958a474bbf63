//! Region writer: decomposes a native-resolution volume into a level-0
//! lambda block plus per-level gamma detail blocks (spec §4.3).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use vdc_blockio::{BlockFileWriter, BlockKey, MinMaxWriter};
use vdc_common::{Coord3, DataRange, VdcError, VdcResult, WaveletKernel};
use vdc_wavelet::{forward_superblock, Block3};

use crate::geometry::GridGeometry;

/// Writes one variable's full-resolution data out as a block-stored
/// wavelet pyramid.
pub struct RegionWriter {
    geometry: GridGeometry,
    kernel: WaveletKernel,
    blockio: BlockFileWriter,
    path: PathBuf,
}

impl RegionWriter {
    pub fn create(
        path: impl AsRef<Path>,
        geometry: GridGeometry,
        kernel: WaveletKernel,
    ) -> VdcResult<Self> {
        Ok(Self {
            geometry,
            kernel,
            blockio: BlockFileWriter::create(&path)?,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Write a full native-resolution volume. `data` is row-major
    /// (x fastest) and must match `geometry.native_dims` exactly; voxels
    /// outside `native_dims` but inside the superblock-aligned padded volume
    /// are filled by edge-extending the nearest valid sample (spec §4.3
    /// step 1).
    pub fn write_volume(mut self, data: &[f32]) -> VdcResult<DataRange> {
        let dims = self.geometry.native_dims;
        if data.len() != dims.x * dims.y * dims.z {
            return Err(VdcError::invalid_region(format!(
                "expected {} samples for dims {dims}, got {}",
                dims.x * dims.y * dims.z,
                data.len()
            )));
        }
        let overall_range = DataRange::of_slice(data);

        let finest_grid = self.geometry.block_grid_dims(self.geometry.max_level);
        let padded = self.geometry.padded_dims(self.geometry.max_level);
        let padded_volume = edge_extend(data, dims, padded);

        let mut current: HashMap<Coord3, Block3> =
            split_into_blocks(&padded_volume, padded, self.geometry.block_dims, finest_grid);
        let mut current_grid = finest_grid;

        // Finest-level block min/max, from the supplied voxels only (spec
        // §4.3 step 5) — computed against the unpadded `data`/`dims`, not
        // `padded_volume`, so edge-extended padding voxels never enter it.
        let mut minmax = MinMaxWriter::new();
        let mut current_ranges: HashMap<Coord3, DataRange> = block_range_iter(finest_grid)
            .map(|bc| {
                let range = finest_block_range(data, dims, self.geometry.block_dims, bc);
                minmax.insert(self.geometry.max_level, bc, range);
                (bc, range)
            })
            .collect();

        for level in (1..=self.geometry.max_level).rev() {
            let parent_grid = self.geometry.block_grid_dims(level - 1);
            let mut next = HashMap::with_capacity(parent_grid.x * parent_grid.y * parent_grid.z);
            let mut next_ranges = HashMap::with_capacity(parent_grid.x * parent_grid.y * parent_grid.z);

            for pc in block_range_iter(parent_grid) {
                let superblock = assemble_superblock(
                    &current,
                    pc,
                    current_grid,
                    self.geometry.block_dims,
                );
                let (lambda, gammas) = forward_superblock(self.kernel, &superblock)?;
                for (band_idx, gamma) in gammas.iter().enumerate() {
                    let key = BlockKey::gamma(level, (band_idx + 1) as u8, pc);
                    self.blockio.write_block(key, &gamma.data)?;
                }
                next.insert(pc, lambda);

                // Eightfold child -> parent min/max reduction (spec §4.3 step 6).
                let range = reduce_child_ranges(&current_ranges, pc, current_grid);
                minmax.insert(level - 1, pc, range);
                next_ranges.insert(pc, range);
            }

            current = next;
            current_grid = parent_grid;
            current_ranges = next_ranges;
        }

        for (bc, block) in &current {
            self.blockio
                .write_block(BlockKey::lambda(0, *bc), &block.data)?;
        }

        self.blockio.finish()?;
        minmax.write(&self.path)?;
        Ok(overall_range)
    }
}

/// Clamp-to-edge extension of `data` (shape `dims`) into a larger buffer of
/// shape `padded` (`padded >= dims` on every axis).
fn edge_extend(data: &[f32], dims: Coord3, padded: Coord3) -> Vec<f32> {
    let mut out = vec![0.0f32; padded.x * padded.y * padded.z];
    for z in 0..padded.z {
        let sz = z.min(dims.z - 1);
        for y in 0..padded.y {
            let sy = y.min(dims.y - 1);
            for x in 0..padded.x {
                let sx = x.min(dims.x - 1);
                let src = sz * dims.y * dims.x + sy * dims.x + sx;
                let dst = z * padded.y * padded.x + y * padded.x + x;
                out[dst] = data[src];
            }
        }
    }
    out
}

fn split_into_blocks(
    data: &[f32],
    dims: Coord3,
    block_dims: Coord3,
    grid: Coord3,
) -> HashMap<Coord3, Block3> {
    let mut map = HashMap::with_capacity(grid.x * grid.y * grid.z);
    for bc in block_range_iter(grid) {
        let mut block = Block3::zeros(block_dims);
        for z in 0..block_dims.z {
            for y in 0..block_dims.y {
                for x in 0..block_dims.x {
                    let gx = bc.x * block_dims.x + x;
                    let gy = bc.y * block_dims.y + y;
                    let gz = bc.z * block_dims.z + z;
                    let src = gz * dims.y * dims.x + gy * dims.x + gx;
                    block.set(x, y, z, data[src]);
                }
            }
        }
        map.insert(bc, block);
    }
    map
}

/// Min/max of block `bc`'s voxels that actually fall inside `dims` — the
/// supplied (unpadded) volume. A block straddling the padded boundary has
/// some edge-extended voxels past `dims` on one or more axes; those are
/// excluded (spec §4.3 step 5). Every block has at least one voxel inside
/// `dims`, since `block_dims`/the block grid are sized to cover `dims`.
fn finest_block_range(data: &[f32], dims: Coord3, block_dims: Coord3, bc: Coord3) -> DataRange {
    let mut range = DataRange::new(f32::INFINITY, f32::NEG_INFINITY);
    for z in 0..block_dims.z {
        let gz = bc.z * block_dims.z + z;
        if gz >= dims.z {
            break;
        }
        for y in 0..block_dims.y {
            let gy = bc.y * block_dims.y + y;
            if gy >= dims.y {
                break;
            }
            for x in 0..block_dims.x {
                let gx = bc.x * block_dims.x + x;
                if gx >= dims.x {
                    break;
                }
                let v = data[gz * dims.y * dims.x + gy * dims.x + gx];
                range = range.union(DataRange::new(v, v));
            }
        }
    }
    range
}

/// Eightfold reduction of a parent block's min/max from its up-to-eight
/// children at the next-finer level (spec §4.3 step 6), using the same
/// edge-clamped child indexing as [`assemble_superblock`] so a reduction and
/// its matching lambda block always agree on which children contributed.
fn reduce_child_ranges(
    current_ranges: &HashMap<Coord3, DataRange>,
    pc: Coord3,
    current_grid: Coord3,
) -> DataRange {
    let mut range = DataRange::new(f32::INFINITY, f32::NEG_INFINITY);
    for cz in 0..2 {
        let real_z = (pc.z * 2 + cz).min(current_grid.z - 1);
        for cy in 0..2 {
            let real_y = (pc.y * 2 + cy).min(current_grid.y - 1);
            for cx in 0..2 {
                let real_x = (pc.x * 2 + cx).min(current_grid.x - 1);
                let child = current_ranges
                    .get(&Coord3::new(real_x, real_y, real_z))
                    .expect("child range must exist in current level map");
                range = range.union(*child);
            }
        }
    }
    range
}

/// Gather the up-to-eight child blocks of `pc` (in `current`, shaped by
/// `current_grid`) into one superblock, clamping any child index past the
/// edge of `current_grid` to the last valid index (block-granularity
/// edge extension for odd-sized grids).
fn assemble_superblock(
    current: &HashMap<Coord3, Block3>,
    pc: Coord3,
    current_grid: Coord3,
    block_dims: Coord3,
) -> Block3 {
    let full = Coord3::new(block_dims.x * 2, block_dims.y * 2, block_dims.z * 2);
    let mut superblock = Block3::zeros(full);
    for (cz, offz) in [(0usize, 0usize), (1, 1)] {
        let real_z = (pc.z * 2 + cz).min(current_grid.z - 1);
        for (cy, offy) in [(0usize, 0usize), (1, 1)] {
            let real_y = (pc.y * 2 + cy).min(current_grid.y - 1);
            for (cx, offx) in [(0usize, 0usize), (1, 1)] {
                let real_x = (pc.x * 2 + cx).min(current_grid.x - 1);
                let child = current
                    .get(&Coord3::new(real_x, real_y, real_z))
                    .expect("child block must exist in current level map");
                paste(&mut superblock, child, offx * block_dims.x, offy * block_dims.y, offz * block_dims.z);
            }
        }
    }
    superblock
}

fn paste(dst: &mut Block3, src: &Block3, ox: usize, oy: usize, oz: usize) {
    for z in 0..src.dims.z {
        for y in 0..src.dims.y {
            for x in 0..src.dims.x {
                dst.set(ox + x, oy + y, oz + z, src.get(x, y, z));
            }
        }
    }
}

/// Row-major iteration over every block coordinate in a `(gx, gy, gz)` grid.
pub(crate) fn block_range_iter(grid: Coord3) -> impl Iterator<Item = Coord3> {
    (0..grid.z).flat_map(move |z| {
        (0..grid.y).flat_map(move |y| (0..grid.x).map(move |x| Coord3::new(x, y, z)))
    })
}
