//! Curvilinear-to-rectilinear bilinear regridding (spec §4.6).

pub mod bilinear;
pub mod interp;
pub mod polar;
pub mod weight;

pub use bilinear::Quad;
pub use interp::interp2d;
pub use polar::{needs_polar_projection, tripolar_zipper_neighbor, POLAR_LAT_THRESHOLD_DEG};
pub use weight::{Weight, WeightTable};
