//! Block-addressed storage for lambda/gamma coefficient streams (spec §3,
//! §4.3, §6).

mod key;
mod minmax;
mod reader;
mod writer;

pub use key::{BlockKey, LAMBDA_BAND};
pub use minmax::{sidecar_path, MinMaxKey, MinMaxReader, MinMaxWriter};
pub use reader::BlockFileReader;
pub use writer::BlockFileWriter;
