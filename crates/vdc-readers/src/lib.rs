//! Source-format readers behind a common `DcReader` contract (spec §4.8).

pub mod flash;
pub mod grib;
pub mod mom_roms;
pub mod raw;
pub mod trait_def;
pub mod wrf;

pub use grib::GribReader;
pub use mom_roms::{GeoCoordNames, MomRomsReader};
pub use raw::{RawDatatype, RawReader, RawReaderConfig};
pub use trait_def::{DcReader, Extents, SliceStatus, VariableHandle};
pub use wrf::WrfReader;
