//! Biorthogonal wavelet transform over 3D sample blocks (spec §3, §4.2).
//!
//! A region writer feeds this crate 2x2x2 "superblocks" (eight adjacent
//! blocks stacked along each axis) and gets back one coarse `lambda` block
//! plus seven `gamma` detail blocks, one level of refinement coarser. The
//! region reader runs the inverse to reconstruct finer levels on demand.

pub mod block;
pub mod lifting;
pub mod transform;

pub use block::{Axis, Block3};
pub use transform::{forward_superblock, inverse_superblock, NUM_GAMMA_BANDS};
