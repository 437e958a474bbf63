//! Shared types and error taxonomy used across the VDC storage engine crates.

pub mod config;
pub mod coords;
pub mod error;
pub mod time;

pub use config::ConverterConfig;
pub use coords::{block_grid_dim, default_max_level, BlockBox, Coord3, DataRange, Orientation2D, VoxelBox};
pub use error::{VdcError, VdcResult};
pub use time::{TimeRange, ValidTime};

/// Default block edge length the `*2vdc` converters build a [`Coord3`] block
/// shape from when the destination collection's metadata doesn't already
/// pin one. Matches `vdc_test_utils::fixtures::block_dims::STANDARD`.
pub const DEFAULT_BLOCK_DIM: usize = 32;

/// A refinement level, `0` is the coarsest level, `max_level` is native
/// resolution (spec §3 "Refinement levels").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefLevel(pub u32);

impl RefLevel {
    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    pub fn is_coarsest(&self) -> bool {
        self.0 == 0
    }

    /// Number of levels coarser than the native (finest) level `max_level`.
    pub fn levels_coarser_than(&self, max_level: u32) -> u32 {
        max_level.saturating_sub(self.0)
    }
}

impl std::fmt::Display for RefLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {}", self.0)
    }
}

/// Name of a wavelet kernel / boundary-mode pairing a VDC may be built with.
/// Only one pairing is implemented (spec §9 Open Question (b)); everything
/// else is rejected with [`VdcError::Unsupported`] at grid creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveletKernel {
    /// 5/3 reversible integer-lifting biorthogonal kernel with `symh`
    /// (symmetric half-point) boundary extension.
    Lifting53Symh,
}

impl WaveletKernel {
    /// Parse the kernel/boundary name pair as they appear in VDC metadata
    /// (e.g. `("bior3.3", "symh")` in the original toolkit); only the one
    /// supported pairing succeeds.
    pub fn parse(wavename: &str, boundary: &str) -> VdcResult<Self> {
        match (wavename, boundary) {
            ("lifting5/3", "symh") => Ok(Self::Lifting53Symh),
            _ => Err(VdcError::unsupported(format!(
                "wavelet kernel '{wavename}' with boundary mode '{boundary}' is not implemented"
            ))),
        }
    }

    pub fn wavename(&self) -> &'static str {
        match self {
            Self::Lifting53Symh => "lifting5/3",
        }
    }

    pub fn boundary(&self) -> &'static str {
        match self {
            Self::Lifting53Symh => "symh",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_level_ordering() {
        assert!(RefLevel::new(0) < RefLevel::new(3));
        assert_eq!(RefLevel::new(1).levels_coarser_than(3), 2);
    }

    #[test]
    fn wavelet_kernel_rejects_unknown_pairing() {
        assert!(WaveletKernel::parse("bior3.3", "symh").is_err());
        assert!(WaveletKernel::parse("lifting5/3", "symh").is_ok());
    }
}
