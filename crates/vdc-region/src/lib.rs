//! Multi-resolution region I/O over block-stored wavelet coefficients
//! (spec §4.3, §4.4).

pub mod geometry;
pub mod reader;
pub mod writer;

pub use geometry::GridGeometry;
pub use reader::RegionReader;
pub use writer::RegionWriter;
