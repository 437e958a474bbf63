//! XML metadata element tree, PROJ.4-style forward projection, and derived
//! coordinate/variable helpers (spec §4.5, §4.8, §6, §9).

pub mod derive;
pub mod projection;
pub mod tree;
pub mod xml;

pub use derive::{angle_rad_from_curvilinear_grid, depth_from_bathymetry, elevation_from_geopotential, lat_deg_from_curvilinear_grid};
pub use projection::{cartographic_extents, Projection, IDEALIZED_DEG_TO_M};
pub use tree::{Element, MetadataNode, MetadataTree, NodeId};
pub use xml::{read_xml, write_xml};
