//! Per-variable block-grid geometry across refinement levels (spec §3, §4.4).

use vdc_common::Coord3;

/// The fixed shape of one variable's multi-resolution storage: its native
/// voxel dimensions, block size, and number of refinement levels above the
/// coarsest (level 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub native_dims: Coord3,
    pub block_dims: Coord3,
    pub max_level: u32,
}

impl GridGeometry {
    pub fn new(native_dims: Coord3, block_dims: Coord3, max_level: u32) -> Self {
        Self {
            native_dims,
            block_dims,
            max_level,
        }
    }

    /// Block-grid dimensions at `level` (`0` = coarsest, `max_level` = native).
    pub fn block_grid_dims(&self, level: u32) -> Coord3 {
        let levels_coarser = self.max_level.saturating_sub(level);
        Coord3::new(
            vdc_common::block_grid_dim(self.native_dims.x, self.block_dims.x, levels_coarser),
            vdc_common::block_grid_dim(self.native_dims.y, self.block_dims.y, levels_coarser),
            vdc_common::block_grid_dim(self.native_dims.z, self.block_dims.z, levels_coarser),
        )
    }

    /// Voxel dimensions of the padded (superblock-aligned) volume at `level`.
    pub fn padded_dims(&self, level: u32) -> Coord3 {
        self.block_grid_dims(level).product(self.block_dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_level_grid_matches_ceil_division() {
        let g = GridGeometry::new(Coord3::new(65, 65, 65), Coord3::new(32, 32, 32), 2);
        assert_eq!(g.block_grid_dims(2), Coord3::new(3, 3, 3));
    }

    #[test]
    fn coarsest_level_shrinks_by_power_of_two() {
        let g = GridGeometry::new(Coord3::new(128, 128, 128), Coord3::new(32, 32, 32), 2);
        assert_eq!(g.block_grid_dims(2), Coord3::new(4, 4, 4));
        assert_eq!(g.block_grid_dims(1), Coord3::new(2, 2, 2));
        assert_eq!(g.block_grid_dims(0), Coord3::new(1, 1, 1));
    }
}
