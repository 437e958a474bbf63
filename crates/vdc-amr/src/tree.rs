//! Arena-based AMR octree (spec §4.5).

use std::collections::HashMap;

use vdc_common::{VdcError, VdcResult};

use crate::cellid::CellId;

/// An axis-aligned bounding box in physical (not voxel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BBox3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> [f64; 3] {
        std::array::from_fn(|i| 0.5 * (self.min[i] + self.max[i]))
    }

    pub fn contains_point(&self, p: [f64; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    /// The 8 octants obtained by bisecting every axis, in
    /// `(x, y, z)`-fastest-x order, matching `vdc-wavelet`'s band ordering
    /// convention so AMR and wavelet child enumeration agree.
    pub fn octants(&self) -> [BBox3; 8] {
        let c = self.center();
        std::array::from_fn(|i| {
            let (bx, by, bz) = (i & 1, (i >> 1) & 1, (i >> 2) & 1);
            let lo = |axis: usize, bit: usize| if bit == 0 { self.min[axis] } else { c[axis] };
            let hi = |axis: usize, bit: usize| if bit == 0 { c[axis] } else { self.max[axis] };
            BBox3::new(
                [lo(0, bx), lo(1, by), lo(2, bz)],
                [hi(0, bx), hi(1, by), hi(2, bz)],
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct AmrNode {
    pub id: CellId,
    pub parent: Option<CellId>,
    pub level: u32,
    pub bbox: BBox3,
    pub children: Option<[CellId; 8]>,
}

/// A forest of octrees, one per base-grid root block.
#[derive(Debug, Default)]
pub struct AmrTree {
    pub roots: Vec<CellId>,
    /// `(Kx, Ky, Kz)` shape of the base grid the roots are laid out on,
    /// row-major (x fastest). `with_roots` falls back to `(n, 1, 1)` when
    /// the caller doesn't know the 3D arrangement.
    pub base_grid_dims: vdc_common::Coord3,
    nodes: HashMap<CellId, AmrNode>,
    next_local_index: HashMap<u16, u32>,
}

impl AmrTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the base (level-0) grid: one root cell per bounding box, in
    /// the given `(Kx, Ky, Kz)` row-major arrangement.
    pub fn with_roots_3d(base_grid_dims: vdc_common::Coord3, root_bboxes: &[BBox3]) -> Self {
        let mut tree = Self::new();
        tree.base_grid_dims = base_grid_dims;
        for (i, bbox) in root_bboxes.iter().enumerate() {
            let id = CellId::new(i as u16, 0);
            tree.nodes.insert(
                id,
                AmrNode {
                    id,
                    parent: None,
                    level: 0,
                    bbox: *bbox,
                    children: None,
                },
            );
            tree.roots.push(id);
            tree.next_local_index.insert(i as u16, 1);
        }
        tree
    }

    /// Register the base grid without a known 3D arrangement (one root per
    /// bounding box, `base_grid_dims = (n, 1, 1)`).
    pub fn with_roots(root_bboxes: &[BBox3]) -> Self {
        Self::with_roots_3d(vdc_common::Coord3::new(root_bboxes.len(), 1, 1), root_bboxes)
    }

    pub fn get(&self, id: CellId) -> Option<&AmrNode> {
        self.nodes.get(&id)
    }

    pub fn get_cell_level(&self, id: CellId) -> Option<u32> {
        self.nodes.get(&id).map(|n| n.level)
    }

    pub fn get_cell_location(&self, id: CellId) -> Option<BBox3> {
        self.nodes.get(&id).map(|n| n.bbox)
    }

    pub fn get_cell_children(&self, id: CellId) -> Option<&[CellId; 8]> {
        self.nodes.get(&id).and_then(|n| n.children.as_ref())
    }

    /// Split `id`'s cell into 8 children. Callers drive refinement in
    /// breadth-first order (spec §4.5 "breadth-first `RefineCell`"): each
    /// call consumes the next 8 local indices for that root, so refining in
    /// level order keeps indices contiguous per level.
    pub fn refine_cell(&mut self, id: CellId) -> VdcResult<[CellId; 8]> {
        let parent_level;
        let octants;
        {
            let parent = self
                .nodes
                .get(&id)
                .ok_or_else(|| VdcError::invalid_region(format!("no such cell {id}")))?;
            if parent.children.is_some() {
                return Err(VdcError::invalid_region(format!("cell {id} already refined")));
            }
            parent_level = parent.level;
            octants = parent.bbox.octants();
        }

        let root = id.root_index();
        let base = *self.next_local_index.entry(root).or_insert(1);
        let mut children = [CellId::new(root, 0); 8];
        for (i, bbox) in octants.iter().enumerate() {
            let child_id = CellId::new(root, base + i as u32);
            children[i] = child_id;
            self.nodes.insert(
                child_id,
                AmrNode {
                    id: child_id,
                    parent: Some(id),
                    level: parent_level + 1,
                    bbox: *bbox,
                    children: None,
                },
            );
        }
        self.next_local_index.insert(root, base + 8);
        self.nodes.get_mut(&id).unwrap().children = Some(children);
        Ok(children)
    }

    /// All cells, parent-first (roots before their descendants), suitable
    /// for serialization as a flat parent-table.
    pub fn parent_table(&self) -> Vec<(CellId, Option<CellId>, u32, BBox3)> {
        let mut out: Vec<_> = self
            .nodes
            .values()
            .map(|n| (n.id, n.parent, n.level, n.bbox))
            .collect();
        out.sort_by_key(|(id, ..)| *id);
        out
    }

    /// Insert a node built from raw fields (id, parent, level, bbox) without
    /// going through [`Self::refine_cell`], used when reloading a tree from
    /// an on-disk archive whose parent table already encodes the full
    /// shape. Call [`Self::finalize_children`] once every node has been
    /// inserted to rebuild the parent -> children links and root list.
    pub fn insert_raw(&mut self, id: CellId, parent: Option<CellId>, level: u32, bbox: BBox3) {
        self.nodes.insert(
            id,
            AmrNode {
                id,
                parent,
                level,
                bbox,
                children: None,
            },
        );
        if parent.is_none() {
            self.roots.push(id);
        }
    }

    /// Rebuild `roots` ordering and every node's `children` list from the
    /// `parent` links recorded by [`Self::insert_raw`].
    pub fn finalize_children(&mut self) {
        let mut by_parent: HashMap<CellId, Vec<CellId>> = HashMap::new();
        for node in self.nodes.values() {
            if let Some(parent) = node.parent {
                by_parent.entry(parent).or_default().push(node.id);
            }
        }
        for (parent, mut children) in by_parent {
            children.sort();
            if children.len() == 8 {
                let arr: [CellId; 8] = children.try_into().unwrap();
                if let Some(node) = self.nodes.get_mut(&parent) {
                    node.children = Some(arr);
                }
            }
        }
        self.roots.sort();
        self.roots.dedup();
    }

    /// All cells of one branch in breadth-first order (root first), the
    /// layout `AmrData` buffers and the NetCDF archive both assume.
    pub fn branch_cells_bfs(&self, root: CellId) -> Vec<CellId> {
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(root);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(children) = self.get_cell_children(id) {
                queue.extend(children.iter().copied());
            }
        }
        order
    }

    /// The finest-resolution leaf whose bbox contains `point`, searching
    /// from the root that contains it.
    pub fn find_leaf(&self, point: [f64; 3]) -> Option<&AmrNode> {
        let mut current = self
            .roots
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .find(|n| n.bbox.contains_point(point))?;
        loop {
            match &current.children {
                None => return Some(current),
                Some(children) => {
                    let next = children
                        .iter()
                        .filter_map(|c| self.nodes.get(c))
                        .find(|n| n.bbox.contains_point(point));
                    match next {
                        Some(n) => current = n,
                        None => return Some(current),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refine_cell_creates_eight_children_at_next_level() {
        let bbox = BBox3::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let mut tree = AmrTree::with_roots(&[bbox]);
        let root = tree.roots[0];
        let children = tree.refine_cell(root).unwrap();
        assert_eq!(children.len(), 8);
        for c in children {
            assert_eq!(tree.get_cell_level(c), Some(1));
        }
        assert_eq!(tree.get_cell_children(root).unwrap().len(), 8);
    }

    #[test]
    fn refine_twice_keeps_contiguous_local_indices_per_root() {
        let bbox = BBox3::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let mut tree = AmrTree::with_roots(&[bbox]);
        let root = tree.roots[0];
        let gen1 = tree.refine_cell(root).unwrap();
        let gen2 = tree.refine_cell(gen1[0]).unwrap();
        let all_local: Vec<u32> = gen1
            .iter()
            .chain(gen2.iter())
            .map(|c| c.local_index())
            .collect();
        let mut sorted = all_local.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), all_local.len(), "local indices must be unique");
    }

    #[test]
    fn find_leaf_descends_to_finest_cell_containing_point() {
        let bbox = BBox3::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let mut tree = AmrTree::with_roots(&[bbox]);
        let root = tree.roots[0];
        let children = tree.refine_cell(root).unwrap();
        let leaf = tree.find_leaf([0.1, 0.1, 0.1]).unwrap();
        assert_eq!(leaf.level, 1);
        assert!(children.contains(&leaf.id));
    }

    #[test]
    fn cannot_refine_a_cell_twice() {
        let bbox = BBox3::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let mut tree = AmrTree::with_roots(&[bbox]);
        let root = tree.roots[0];
        tree.refine_cell(root).unwrap();
        assert!(tree.refine_cell(root).is_err());
    }
}
