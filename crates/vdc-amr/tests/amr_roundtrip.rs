//! End-to-end AMR tree/data round trip through the NetCDF archive (Scenario
//! B: refine one base block, write its children's payload, reload and check
//! both the data and the unrefined sibling branch survive unchanged).

use vdc_amr::{read_archive, write_archive, AmrData, AmrTree, BBox3, CellPayloadDims};
use vdc_common::Coord3;

#[test]
fn refined_root_round_trips_with_unrefined_sibling_branch() {
    let roots = [
        BBox3::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
        BBox3::new([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]),
    ];
    let mut tree = AmrTree::with_roots_3d(Coord3::new(2, 1, 1), &roots);
    let branch0 = tree.roots[0];
    let children = tree.refine_cell(branch0).unwrap();

    let pd = CellPayloadDims::new(1, 1, 1);
    let mut data = AmrData::zeros(&tree, pd);
    for (i, &c) in children.iter().enumerate() {
        data.set_cell_payload(&tree, c, &[i as f32]).unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario_b.nc");
    write_archive(&path, &tree, &data).unwrap();

    let (loaded_tree, loaded_data) = read_archive(&path).unwrap();

    let loaded_branch0 = loaded_tree.roots[0];
    let loaded_children = loaded_tree.get_cell_children(loaded_branch0).unwrap();
    for (i, &c) in loaded_children.iter().enumerate() {
        assert_eq!(loaded_data.cell_payload(&loaded_tree, c).unwrap(), &[i as f32]);
    }

    let loaded_branch1 = loaded_tree.roots[1];
    assert!(loaded_tree.get_cell_children(loaded_branch1).is_none(), "branch 1 must stay unrefined");
    assert_eq!(loaded_tree.get_cell_level(loaded_branch1), Some(0));

    let max_level = loaded_tree.parent_table().iter().map(|(_, _, level, _)| *level).max().unwrap();
    assert_eq!(max_level, 1);
}
