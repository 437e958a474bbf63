//! Testable property 2 (spec.md §8): for every block at every refinement
//! level, the stored min/max bounds every voxel that block's footprint
//! descends from, and a coarser block's min/max equals the reduction of its
//! (up to eight) children's min/max one level finer.
//!
//! Also covers Scenario A (spec §8): domain `(64,64,64)`, block
//! `(32,32,32)`, one refinement level, fill `x + 64y + 4096z`, region
//! write/read with unblocking — exact integer reproduction.

use vdc_common::{Coord3, DataRange, VoxelBox, WaveletKernel};
use vdc_region::{GridGeometry, RegionReader, RegionWriter};
use vdc_test_utils::generators::linear_ramp_grid;

fn kernel() -> WaveletKernel {
    WaveletKernel::parse("lifting5/3", "symh").unwrap()
}

#[test]
fn block_min_max_bounds_voxels_and_matches_child_reduction() {
    let dir = tempfile::tempdir().unwrap();
    let dims = Coord3::new(16, 16, 16);
    let block_dims = Coord3::new(4, 4, 4);
    let geometry = GridGeometry::new(dims, block_dims, 2);
    let grid = linear_ramp_grid((16, 16, 16));

    let path = dir.path().join("minmax.vdb");
    let writer = RegionWriter::create(&path, geometry, kernel()).unwrap();
    writer.write_volume(&grid.values).unwrap();
    let reader = RegionReader::open(&path, geometry, kernel()).unwrap();

    // Finest level: stored min/max must bound that block's actual (unpadded)
    // voxel values exactly, since 16 divides evenly by 4 and there is no
    // edge-extend padding to worry about here.
    let finest_grid = geometry.block_grid_dims(2);
    for bz in 0..finest_grid.z {
        for by in 0..finest_grid.y {
            for bx in 0..finest_grid.x {
                let bc = Coord3::new(bx, by, bz);
                let range = reader.block_min_max(2, bc).expect("finest block has an entry");
                let mut expected = DataRange::new(f32::INFINITY, f32::NEG_INFINITY);
                for z in 0..block_dims.z {
                    for y in 0..block_dims.y {
                        for x in 0..block_dims.x {
                            let gx = bx * block_dims.x + x;
                            let gy = by * block_dims.y + y;
                            let gz = bz * block_dims.z + z;
                            let v = grid.get(gx, gy, gz);
                            assert!(range.contains(v), "block {bc:?}: {v} outside {range:?}");
                            expected = expected.union(DataRange::new(v, v));
                        }
                    }
                }
                assert_eq!(range, expected);
            }
        }
    }

    // Coarser levels: each parent's range equals the union of its up-to-
    // eight children's ranges one level finer (clamping child indices past
    // the edge of the child grid, matching the writer's own assembly).
    for level in (1..=geometry.max_level).rev() {
        let parent_grid = geometry.block_grid_dims(level - 1);
        let child_grid = geometry.block_grid_dims(level);
        for pz in 0..parent_grid.z {
            for py in 0..parent_grid.y {
                for px in 0..parent_grid.x {
                    let pc = Coord3::new(px, py, pz);
                    let parent_range = reader
                        .block_min_max(level - 1, pc)
                        .expect("parent block has an entry");

                    let mut expected = DataRange::new(f32::INFINITY, f32::NEG_INFINITY);
                    for cz in 0..2 {
                        let rz = (pz * 2 + cz).min(child_grid.z - 1);
                        for cy in 0..2 {
                            let ry = (py * 2 + cy).min(child_grid.y - 1);
                            for cx in 0..2 {
                                let rx = (px * 2 + cx).min(child_grid.x - 1);
                                let child = reader
                                    .block_min_max(level, Coord3::new(rx, ry, rz))
                                    .expect("child block has an entry");
                                expected = expected.union(child);
                            }
                        }
                    }
                    assert_eq!(parent_range, expected, "level {level} parent {pc:?}");
                }
            }
        }
    }

    assert_eq!(reader.variable_range().unwrap(), DataRange::of_slice(&grid.values));
}

#[test]
fn scenario_a_exact_fill_survives_a_full_region_write_and_unblocked_read() {
    let dir = tempfile::tempdir().unwrap();
    let dims = Coord3::new(64, 64, 64);
    let geometry = GridGeometry::new(dims, Coord3::new(32, 32, 32), 1);

    let mut values = vec![0.0f32; dims.x * dims.y * dims.z];
    for z in 0..dims.z {
        for y in 0..dims.y {
            for x in 0..dims.x {
                let idx = z * dims.y * dims.x + y * dims.x + x;
                values[idx] = (x + 64 * y + 4096 * z) as f32;
            }
        }
    }

    let path = dir.path().join("scenario_a.vdb");
    let writer = RegionWriter::create(&path, geometry, kernel()).unwrap();
    writer.write_volume(&values).unwrap();

    let reader = RegionReader::open(&path, geometry, kernel()).unwrap();
    let region = VoxelBox::new(Coord3::new(0, 0, 0), Coord3::new(63, 63, 63));
    let (out_dims, unblocked) = reader.read_region(geometry.max_level, region).unwrap();
    assert_eq!(out_dims, dims);

    for (idx, (&got, &want)) in unblocked.iter().zip(values.iter()).enumerate() {
        assert!((got - want).abs() < 1e-2, "voxel {idx}: {got} != {want}");
    }
}
