//! Import of FLASH/Paramesh block tables into an [`AmrTree`] (spec §4.6,
//! §9B).
//!
//! Paramesh's own on-disk tables give each block a global id, a bounding
//! box and a refinement level, but not an explicit parent pointer. Parent
//! assignment here is done by spatial containment: a block's parent is the
//! coarsest-available block among those at the next level up whose bbox
//! contains the child's center — this is the same relationship
//! `AmrTree::refine_cell` establishes by construction, so importing by
//! containment produces a tree whose shape matches one built cell-by-cell.

use crate::tree::{AmrTree, BBox3};

/// A flattened Paramesh block table: parallel arrays of global id,
/// `[xmin, xmax, ymin, ymax, zmin, zmax]` bounding box, and refinement
/// level (FLASH convention: level `1` is coarsest).
pub struct ParameshBlockTable<'a> {
    pub gid: &'a [i32],
    pub bbox: &'a [[f64; 6]],
    pub lrefine: &'a [i32],
}

impl<'a> ParameshBlockTable<'a> {
    pub fn new(gid: &'a [i32], bbox: &'a [[f64; 6]], lrefine: &'a [i32]) -> Self {
        assert_eq!(gid.len(), bbox.len());
        assert_eq!(gid.len(), lrefine.len());
        Self { gid, bbox, lrefine }
    }

    fn bbox3(&self, i: usize) -> BBox3 {
        let b = self.bbox[i];
        BBox3::new([b[0], b[2], b[4]], [b[1], b[3], b[5]])
    }

    fn center(&self, i: usize) -> [f64; 3] {
        self.bbox3(i).center()
    }

    /// Build an [`AmrTree`] from this table. Root blocks (the minimum
    /// `lrefine` present) seed one tree each; every other block is attached
    /// under the finest already-placed ancestor whose bbox contains its
    /// center, level by level.
    pub fn import(&self) -> AmrTree {
        if self.gid.is_empty() {
            return AmrTree::new();
        }
        let min_level = *self.lrefine.iter().min().unwrap();

        let root_indices: Vec<usize> = (0..self.gid.len())
            .filter(|&i| self.lrefine[i] == min_level)
            .collect();
        let root_bboxes: Vec<BBox3> = root_indices.iter().map(|&i| self.bbox3(i)).collect();
        let mut tree = AmrTree::with_roots(&root_bboxes);

        // id_to_cell[gid] = the AMR tree cell id once placed.
        let mut placed: std::collections::HashMap<i32, crate::cellid::CellId> =
            std::collections::HashMap::new();
        for (root_idx, &table_idx) in root_indices.iter().enumerate() {
            placed.insert(self.gid[table_idx], tree.roots[root_idx]);
        }

        let max_level = *self.lrefine.iter().max().unwrap();
        for level in (min_level + 1)..=max_level {
            let level_indices: Vec<usize> = (0..self.gid.len())
                .filter(|&i| self.lrefine[i] == level)
                .collect();
            for &i in &level_indices {
                let center = self.center(i);
                let parent_cell = placed
                    .values()
                    .filter(|id| tree.get_cell_level(**id) == Some((level - min_level - 1) as u32))
                    .find(|id| {
                        tree.get_cell_location(**id)
                            .map(|b| b.contains_point(center))
                            .unwrap_or(false)
                    })
                    .copied();
                let Some(parent) = parent_cell else {
                    tracing::warn!(
                        gid = self.gid[i],
                        "paramesh import: no containing parent found, skipping block"
                    );
                    continue;
                };
                let children = match tree.get_cell_children(parent) {
                    Some(c) => *c,
                    None => tree.refine_cell(parent).expect("parent was not yet refined"),
                };
                if let Some(child_id) = children
                    .iter()
                    .find(|c| {
                        tree.get_cell_location(**c)
                            .map(|b| b.contains_point(center))
                            .unwrap_or(false)
                    })
                    .copied()
                {
                    placed.insert(self.gid[i], child_id);
                }
            }
        }

        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdc_test_utils::generators::one_level_refined_paramesh_table;

    #[test]
    fn imports_one_level_refined_table() {
        let t = one_level_refined_paramesh_table();
        let table = ParameshBlockTable::new(&t.gid, &t.bbox, &t.lrefine);
        let tree = table.import();
        assert_eq!(tree.roots.len(), 1);
        let root = tree.roots[0];
        assert_eq!(tree.get_cell_children(root).unwrap().len(), 8);
    }
}
