//! End-to-end region writer/reader tests (Scenario A: write a volume, read
//! every level back and check reconstruction).

use vdc_common::{Coord3, VoxelBox, WaveletKernel};
use vdc_region::{GridGeometry, RegionReader, RegionWriter};
use vdc_test_utils::generators::{constant_grid, linear_ramp_grid};

fn kernel() -> WaveletKernel {
    WaveletKernel::parse("lifting5/3", "symh").unwrap()
}

#[test]
fn constant_volume_reconstructs_exactly_at_every_level() {
    let dir = tempfile::tempdir().unwrap();
    let geometry = GridGeometry::new(Coord3::new(16, 16, 16), Coord3::new(4, 4, 4), 2);
    let grid = constant_grid((16, 16, 16), 9.0);

    let path = dir.path().join("const.vdb");
    let writer = RegionWriter::create(&path, geometry, kernel()).unwrap();
    let range = writer.write_volume(&grid.values).unwrap();
    assert_eq!(range.min, 9.0);
    assert_eq!(range.max, 9.0);

    let reader = RegionReader::open(&path, geometry, kernel()).unwrap();
    for level in 0..=geometry.max_level {
        let (_dims, data) = reader.read_level(level).unwrap();
        for v in data {
            assert!((v - 9.0).abs() < 1e-3, "level {level}: {v}");
        }
    }
}

#[test]
fn native_level_reconstructs_linear_ramp_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let geometry = GridGeometry::new(Coord3::new(16, 16, 16), Coord3::new(4, 4, 4), 2);
    let grid = linear_ramp_grid((16, 16, 16));

    let path = dir.path().join("ramp.vdb");
    let writer = RegionWriter::create(&path, geometry, kernel()).unwrap();
    writer.write_volume(&grid.values).unwrap();

    let reader = RegionReader::open(&path, geometry, kernel()).unwrap();
    let (dims, data) = reader.read_level(geometry.max_level).unwrap();
    assert_eq!(dims, Coord3::new(16, 16, 16));
    for (i, (&got, &want)) in data.iter().zip(grid.values.iter()).enumerate() {
        assert!((got - want).abs() < 1e-2, "index {i}: {got} != {want}");
    }
}

#[test]
fn cropped_region_matches_full_level_slice() {
    let dir = tempfile::tempdir().unwrap();
    let geometry = GridGeometry::new(Coord3::new(16, 16, 16), Coord3::new(4, 4, 4), 1);
    let grid = linear_ramp_grid((16, 16, 16));

    let path = dir.path().join("crop.vdb");
    let writer = RegionWriter::create(&path, geometry, kernel()).unwrap();
    writer.write_volume(&grid.values).unwrap();

    let reader = RegionReader::open(&path, geometry, kernel()).unwrap();
    let (full_dims, full) = reader.read_level(geometry.max_level).unwrap();
    let region = VoxelBox::new(Coord3::new(2, 2, 2), Coord3::new(5, 5, 5));
    let (crop_dims, cropped) = reader.read_region(geometry.max_level, region).unwrap();
    assert_eq!(crop_dims, Coord3::new(4, 4, 4));

    for z in 0..crop_dims.z {
        for y in 0..crop_dims.y {
            for x in 0..crop_dims.x {
                let full_idx = (region.min.z + z) * full_dims.y * full_dims.x
                    + (region.min.y + y) * full_dims.x
                    + (region.min.x + x);
                let crop_idx = z * crop_dims.y * crop_dims.x + y * crop_dims.x + x;
                assert_eq!(cropped[crop_idx], full[full_idx]);
            }
        }
    }
}
