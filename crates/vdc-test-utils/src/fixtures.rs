//! Common test fixtures for VDC tests.

/// Block-size presets exercised across the region/blockio test suites.
pub mod block_dims {
    /// The smallest legal superblock-aligned size used in unit tests.
    pub const TINY: (usize, usize, usize) = (4, 4, 4);

    /// A size that matches common production VDC block dimensions.
    pub const STANDARD: (usize, usize, usize) = (32, 32, 32);

    /// An anisotropic block, used to check axes are never assumed equal.
    pub const ANISOTROPIC: (usize, usize, usize) = (16, 32, 8);
}

/// Grid dimension presets that are not exact multiples of a block size, used
/// to exercise the superblock-alignment padding path.
pub mod grid_dims {
    pub const UNALIGNED_SMALL: (usize, usize, usize) = (10, 10, 10);
    pub const UNALIGNED_MEDIUM: (usize, usize, usize) = (67, 51, 33);
}

/// Map-projection strings accepted by the metadata crate's forward
/// transform, paired with a representative lon/lat for each.
pub mod projection {
    pub const LAMBERT_CONFORMAL: &str =
        "+proj=lcc +lat_1=30 +lat_2=60 +lat_0=45 +lon_0=-100 +a=6370000 +b=6370000";
    pub const LATLON: &str = "+proj=latlong +ellps=sphere";

    pub const SAMPLE_LONLAT: (f64, f64) = (-97.5, 38.0);
}

/// Wavelet kernel/boundary-mode pairings used across test cases.
pub mod wavelet {
    pub const SUPPORTED: (&str, &str) = ("lifting5/3", "symh");
    pub const UNSUPPORTED: (&str, &str) = ("bior3.3", "symh");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_dims_are_nonzero() {
        let (x, y, z) = block_dims::STANDARD;
        assert!(x > 0 && y > 0 && z > 0);
    }

    #[test]
    fn grid_dims_not_multiple_of_standard_block() {
        let (x, _, _) = grid_dims::UNALIGNED_MEDIUM;
        let (bx, _, _) = block_dims::STANDARD;
        assert_ne!(x % bx, 0);
    }
}
