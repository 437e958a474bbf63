//! NetCDF file collection: a unified time axis over implicit/explicit time
//! dimensions plus staggered-dimension de-interpolation (spec §4.7).

pub mod collection;
pub mod stagger;

pub use collection::{FileTimeEntry, NetCDFCollection};
pub use stagger::{destagger_slice, destagger_volume};
