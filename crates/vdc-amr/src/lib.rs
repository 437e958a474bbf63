//! Adaptive mesh refinement octree container (spec §4.5, §9B).

pub mod archive;
pub mod cellid;
pub mod data;
pub mod paramesh;
pub mod tree;

pub use archive::{read_archive, write_archive};
pub use cellid::CellId;
pub use data::{AmrData, CellPayloadDims};
pub use paramesh::ParameshBlockTable;
pub use tree::{AmrNode, AmrTree, BBox3};
