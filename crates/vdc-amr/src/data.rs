//! Per-cell scalar payload storage and uniform-grid resampling for an
//! [`AmrTree`] (spec §4.5 `AMRData`).

use vdc_common::{Coord3, VdcError, VdcResult};

use crate::cellid::CellId;
use crate::tree::AmrTree;

/// Shape of the small float block carried by every cell in a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPayloadDims {
    pub cx: usize,
    pub cy: usize,
    pub cz: usize,
}

impl CellPayloadDims {
    pub fn new(cx: usize, cy: usize, cz: usize) -> Self {
        Self { cx, cy, cz }
    }

    pub fn len(&self) -> usize {
        self.cx * self.cy * self.cz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One contiguous float buffer per base block, laid out by each cell's
/// breadth-first local index within its branch (`AmrTree::branch_cells_bfs`).
pub struct AmrData {
    pub payload_dims: CellPayloadDims,
    branch_buffers: Vec<Vec<f32>>,
}

impl AmrData {
    /// Allocate zeroed buffers, one per root in `tree`, each sized to hold
    /// every cell currently present in that branch.
    pub fn zeros(tree: &AmrTree, payload_dims: CellPayloadDims) -> Self {
        let branch_buffers = tree
            .roots
            .iter()
            .map(|&root| vec![0.0_f32; tree.branch_cells_bfs(root).len() * payload_dims.len()])
            .collect();
        Self { payload_dims, branch_buffers }
    }

    fn cell_slot(&self, tree: &AmrTree, id: CellId) -> VdcResult<(usize, usize)> {
        let root = CellId::new(id.root_index(), 0);
        let root_slot = tree
            .roots
            .iter()
            .position(|&r| r == root)
            .ok_or_else(|| VdcError::invalid_region(format!("no such branch for {id}")))?;
        let bfs = tree.branch_cells_bfs(root);
        let cell_slot = bfs
            .iter()
            .position(|&c| c == id)
            .ok_or_else(|| VdcError::invalid_region(format!("no such cell {id}")))?;
        Ok((root_slot, cell_slot))
    }

    pub fn cell_payload(&self, tree: &AmrTree, id: CellId) -> VdcResult<&[f32]> {
        let (root_slot, cell_slot) = self.cell_slot(tree, id)?;
        let len = self.payload_dims.len();
        Ok(&self.branch_buffers[root_slot][cell_slot * len..(cell_slot + 1) * len])
    }

    pub fn set_cell_payload(&mut self, tree: &AmrTree, id: CellId, data: &[f32]) -> VdcResult<()> {
        let len = self.payload_dims.len();
        if data.len() != len {
            return Err(VdcError::invalid_region(format!(
                "payload length {} does not match cell payload size {len}",
                data.len()
            )));
        }
        let (root_slot, cell_slot) = self.cell_slot(tree, id)?;
        self.branch_buffers[root_slot][cell_slot * len..(cell_slot + 1) * len]
            .copy_from_slice(data);
        Ok(())
    }

    /// Flatten every branch's buffer, branches in base-grid row-major order
    /// (the order `AmrTree::roots` is built in), for archival as a single
    /// `FieldVariable[NumBlocks, ...]` array (spec §6).
    pub fn flatten_row_major(&self) -> Vec<f32> {
        self.branch_buffers.iter().flatten().copied().collect()
    }

    pub fn num_cells(&self) -> usize {
        self.branch_buffers.iter().map(|b| b.len() / self.payload_dims.len().max(1)).sum()
    }

    /// Rebuild from a flat `FieldVariable` buffer plus the cell count of
    /// each branch, in `tree.roots` order.
    pub fn from_flat(
        flat: &[f32],
        payload_dims: CellPayloadDims,
        branch_cell_counts: &[usize],
    ) -> VdcResult<Self> {
        let len = payload_dims.len();
        let mut branch_buffers = Vec::with_capacity(branch_cell_counts.len());
        let mut offset = 0;
        for &count in branch_cell_counts {
            let span = count * len;
            let slice = flat.get(offset..offset + span).ok_or_else(|| {
                VdcError::format("AMR archive field variable shorter than branch cell counts imply")
            })?;
            branch_buffers.push(slice.to_vec());
            offset += span;
        }
        Ok(Self { payload_dims, branch_buffers })
    }

    /// Resample `tree`'s data to a uniform voxel grid at `level`, recursing
    /// into each branch octant until either a leaf or `level` is reached,
    /// trilinearly expanding that cell's payload across the (possibly
    /// larger) voxel footprint it covers at the target level.
    pub fn resample_to_uniform_grid(&self, tree: &AmrTree, level: u32) -> VdcResult<(Coord3, Vec<f32>)> {
        let pd = self.payload_dims;
        let branch_dim = Coord3::new(pd.cx << level, pd.cy << level, pd.cz << level);
        let grid = tree.base_grid_dims;
        let out_dims = Coord3::new(grid.x * branch_dim.x, grid.y * branch_dim.y, grid.z * branch_dim.z);
        let mut out = vec![0.0_f32; out_dims.product()];

        for (root_slot, &root) in tree.roots.iter().enumerate() {
            let bx = root_slot % grid.x.max(1);
            let by = (root_slot / grid.x.max(1)) % grid.y.max(1);
            let bz = root_slot / (grid.x.max(1) * grid.y.max(1));
            let branch_origin = Coord3::new(bx * branch_dim.x, by * branch_dim.y, bz * branch_dim.z);
            self.resample_node(tree, root, level, branch_origin, branch_dim, out_dims, &mut out)?;
        }
        Ok((out_dims, out))
    }

    fn resample_node(
        &self,
        tree: &AmrTree,
        id: CellId,
        level: u32,
        origin: Coord3,
        footprint: Coord3,
        out_dims: Coord3,
        out: &mut [f32],
    ) -> VdcResult<()> {
        let node_level = tree.get_cell_level(id).ok_or_else(|| VdcError::invalid_region(format!("no such cell {id}")))?;
        let children = tree.get_cell_children(id);
        if children.is_none() || node_level >= level {
            let payload = self.cell_payload(tree, id)?;
            let src = Block { dims: (self.payload_dims.cx, self.payload_dims.cy, self.payload_dims.cz), data: payload };
            paste_trilinear_resized(&src, footprint, origin, out_dims, out);
            return Ok(());
        }
        let half = Coord3::new(footprint.x / 2, footprint.y / 2, footprint.z / 2);
        for (i, &child) in children.unwrap().iter().enumerate() {
            let (cxb, cyb, czb) = (i & 1, (i >> 1) & 1, (i >> 2) & 1);
            let child_origin = Coord3::new(
                origin.x + cxb * half.x,
                origin.y + cyb * half.y,
                origin.z + czb * half.z,
            );
            self.resample_node(tree, child, level, child_origin, half, out_dims, out)?;
        }
        Ok(())
    }
}

struct Block<'a> {
    dims: (usize, usize, usize),
    data: &'a [f32],
}

impl Block<'_> {
    fn sample(&self, x: usize, y: usize, z: usize) -> f32 {
        let (dx, dy, dz) = self.dims;
        let x = x.min(dx.saturating_sub(1));
        let y = y.min(dy.saturating_sub(1));
        let z = z.min(dz.saturating_sub(1));
        self.data[(z * dy + y) * dx + x]
    }
}

/// Trilinearly resize `src` up to `footprint` voxels and paste it into `out`
/// (of shape `out_dims`) at `origin`.
fn paste_trilinear_resized(src: &Block, footprint: Coord3, origin: Coord3, out_dims: Coord3, out: &mut [f32]) {
    let (sx, sy, sz) = src.dims;
    for oz in 0..footprint.z {
        let fz = map_coord(oz, footprint.z, sz);
        for oy in 0..footprint.y {
            let fy = map_coord(oy, footprint.y, sy);
            for ox in 0..footprint.x {
                let fx = map_coord(ox, footprint.x, sx);
                let value = trilerp(src, fx, fy, fz);
                let gx = origin.x + ox;
                let gy = origin.y + oy;
                let gz = origin.z + oz;
                if gx < out_dims.x && gy < out_dims.y && gz < out_dims.z {
                    out[(gz * out_dims.y + gy) * out_dims.x + gx] = value;
                }
            }
        }
    }
}

/// Map an output index in `[0, out_len)` to a fractional source coordinate
/// in `[0, src_len)` using cell-center alignment.
fn map_coord(out_idx: usize, out_len: usize, src_len: usize) -> f64 {
    if out_len <= 1 || src_len <= 1 {
        return 0.0;
    }
    out_idx as f64 * (src_len - 1) as f64 / (out_len - 1) as f64
}

fn trilerp(src: &Block, fx: f64, fy: f64, fz: f64) -> f32 {
    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let z0 = fz.floor() as usize;
    let (ax, ay, az) = (fx - x0 as f64, fy - y0 as f64, fz - z0 as f64);
    let c = |dx: usize, dy: usize, dz: usize| src.sample(x0 + dx, y0 + dy, z0 + dz) as f64;
    let c00 = c(0, 0, 0) * (1.0 - ax) + c(1, 0, 0) * ax;
    let c10 = c(0, 1, 0) * (1.0 - ax) + c(1, 1, 0) * ax;
    let c01 = c(0, 0, 1) * (1.0 - ax) + c(1, 0, 1) * ax;
    let c11 = c(0, 1, 1) * (1.0 - ax) + c(1, 1, 1) * ax;
    let c0 = c00 * (1.0 - ay) + c10 * ay;
    let c1 = c01 * (1.0 - ay) + c11 * ay;
    (c0 * (1.0 - az) + c1 * az) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::BBox3;

    #[test]
    fn uniform_cell_resamples_to_a_constant_grid() {
        let bbox = BBox3::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let tree = AmrTree::with_roots(&[bbox]);
        let pd = CellPayloadDims::new(2, 2, 2);
        let mut data = AmrData::zeros(&tree, pd);
        let root = tree.roots[0];
        data.set_cell_payload(&tree, root, &[5.0; 8]).unwrap();

        let (dims, buf) = data.resample_to_uniform_grid(&tree, 0).unwrap();
        assert_eq!(dims, Coord3::new(2, 2, 2));
        assert!(buf.iter().all(|&v| (v - 5.0).abs() < 1e-6));
    }

    #[test]
    fn refined_branch_resamples_to_double_resolution() {
        let bbox = BBox3::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let mut tree = AmrTree::with_roots(&[bbox]);
        let root = tree.roots[0];
        let children = tree.refine_cell(root).unwrap();
        let pd = CellPayloadDims::new(2, 2, 2);
        let mut data = AmrData::zeros(&tree, pd);
        for (i, c) in children.iter().enumerate() {
            data.set_cell_payload(&tree, *c, &[i as f32; 8]).unwrap();
        }
        let (dims, _buf) = data.resample_to_uniform_grid(&tree, 1).unwrap();
        assert_eq!(dims, Coord3::new(4, 4, 4));
    }
}
