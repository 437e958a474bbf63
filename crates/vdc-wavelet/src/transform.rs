//! Separable 3D wavelet decomposition of a superblock into one lambda
//! (approximation) block and seven gamma (detail) blocks (spec §3, §4.2).

use crate::block::{forward_axis, inverse_axis, Axis, Block3};
use vdc_common::{Coord3, VdcError, VdcResult, WaveletKernel};

/// The seven detail subbands produced by one level of 3D decomposition, in
/// the fixed order `[hll, lhl, llh, hhl, hlh, lhh, hhh]` (`h`/`l` = high/low
/// pass along x, y, z respectively).
pub const NUM_GAMMA_BANDS: usize = 7;

/// One level of forward wavelet decomposition: consumes a superblock whose
/// every dimension is even and returns the coarse `lambda` block (half size
/// along every axis) plus the seven `gamma` detail blocks of the same size.
pub fn forward_superblock(kernel: WaveletKernel, block: &Block3) -> VdcResult<(Block3, [Block3; NUM_GAMMA_BANDS])> {
    let WaveletKernel::Lifting53Symh = kernel;
    let Coord3 { x, y, z } = block.dims;
    if x % 2 != 0 || y % 2 != 0 || z % 2 != 0 {
        return Err(VdcError::invalid_region(format!(
            "superblock dims {x}x{y}x{z} are not all even"
        )));
    }

    let tx = forward_axis(block, Axis::X);
    let txy = forward_axis(&tx, Axis::Y);
    let txyz = forward_axis(&txy, Axis::Z);

    let half = Coord3::new(x / 2, y / 2, z / 2);
    let mut lambda = Block3::zeros(half);
    let mut gammas: [Block3; NUM_GAMMA_BANDS] =
        std::array::from_fn(|_| Block3::zeros(half));

    for bz in 0..2usize {
        for by in 0..2usize {
            for bx in 0..2usize {
                let band = bx | (by << 1) | (bz << 2);
                if band == 0 {
                    copy_octant(&txyz, &mut lambda, bx, by, bz, half);
                } else {
                    // bands 1..=7 map to gamma slots 0..=6.
                    copy_octant(&txyz, &mut gammas[band - 1], bx, by, bz, half);
                }
            }
        }
    }

    Ok((lambda, gammas))
}

/// Inverse of [`forward_superblock`]: reassembles the full-resolution
/// superblock from its lambda and seven gamma blocks.
pub fn inverse_superblock(
    kernel: WaveletKernel,
    lambda: &Block3,
    gammas: &[Block3; NUM_GAMMA_BANDS],
) -> VdcResult<Block3> {
    let WaveletKernel::Lifting53Symh = kernel;
    let half = lambda.dims;
    for g in gammas {
        if g.dims != half {
            return Err(VdcError::invalid_region(
                "gamma block dims do not match lambda block dims",
            ));
        }
    }

    let full = Coord3::new(half.x * 2, half.y * 2, half.z * 2);
    let mut packed = Block3::zeros(full);
    for bz in 0..2usize {
        for by in 0..2usize {
            for bx in 0..2usize {
                let band = bx | (by << 1) | (bz << 2);
                if band == 0 {
                    paste_octant(lambda, &mut packed, bx, by, bz, half);
                } else {
                    paste_octant(&gammas[band - 1], &mut packed, bx, by, bz, half);
                }
            }
        }
    }

    let iz = inverse_axis(&packed, Axis::Z);
    let iy = inverse_axis(&iz, Axis::Y);
    let ix = inverse_axis(&iy, Axis::X);
    Ok(ix)
}

fn copy_octant(src: &Block3, dst: &mut Block3, bx: usize, by: usize, bz: usize, half: Coord3) {
    for z in 0..half.z {
        for y in 0..half.y {
            for x in 0..half.x {
                let v = src.get(bx * half.x + x, by * half.y + y, bz * half.z + z);
                dst.set(x, y, z, v);
            }
        }
    }
}

fn paste_octant(src: &Block3, dst: &mut Block3, bx: usize, by: usize, bz: usize, half: Coord3) {
    for z in 0..half.z {
        for y in 0..half.y {
            for x in 0..half.x {
                let v = src.get(x, y, z);
                dst.set(bx * half.x + x, by * half.y + y, bz * half.z + z, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel() -> WaveletKernel {
        WaveletKernel::parse("lifting5/3", "symh").unwrap()
    }

    #[test]
    fn roundtrip_is_exact_on_random_block() {
        let dims = Coord3::new(8, 8, 8);
        let data: Vec<f32> = (0..512).map(|i| ((i * 37) % 101) as f32 - 50.0).collect();
        let block = Block3::from_data(dims, data);
        let (lambda, gammas) = forward_superblock(kernel(), &block).unwrap();
        let back = inverse_superblock(kernel(), &lambda, &gammas).unwrap();
        for (a, b) in block.data.iter().zip(back.data.iter()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn constant_block_has_all_zero_gamma() {
        let dims = Coord3::new(4, 4, 4);
        let block = Block3::from_data(dims, vec![3.5f32; 64]);
        let (lambda, gammas) = forward_superblock(kernel(), &block).unwrap();
        for g in &gammas {
            assert!(g.data.iter().all(|&v| v.abs() < 1e-5));
        }
        assert!(lambda.data.iter().all(|&v| (v - 3.5).abs() < 1e-5));
    }

    #[test]
    fn rejects_odd_dims() {
        let dims = Coord3::new(3, 4, 4);
        let block = Block3::zeros(dims);
        assert!(forward_superblock(kernel(), &block).is_err());
    }
}
