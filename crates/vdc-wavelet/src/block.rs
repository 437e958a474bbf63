//! A dense 3D sample block and separable per-axis lifting passes.

use crate::lifting::{forward_1d, inverse_1d};
use vdc_common::Coord3;

/// A dense, row-major (x fastest) 3D block of `f32` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Block3 {
    pub dims: Coord3,
    pub data: Vec<f32>,
}

impl Block3 {
    pub fn zeros(dims: Coord3) -> Self {
        Self {
            dims,
            data: vec![0.0; dims.x * dims.y * dims.z],
        }
    }

    pub fn from_data(dims: Coord3, data: Vec<f32>) -> Self {
        assert_eq!(dims.x * dims.y * dims.z, data.len());
        Self { dims, data }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.dims.y * self.dims.x + y * self.dims.x + x
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[self.idx(x, y, z)]
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, v: f32) {
        let i = self.idx(x, y, z);
        self.data[i] = v;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Run the forward lifting transform along `axis` on every line of the
/// block, writing the approximation half into the first half of the line
/// and the detail half into the second half (the usual in-place wavelet
/// packing). The dimension along `axis` must be even.
pub fn forward_axis(block: &Block3, axis: Axis) -> Block3 {
    let mut out = block.clone();
    let Coord3 { x: nx, y: ny, z: nz } = block.dims;
    match axis {
        Axis::X => {
            assert!(nx % 2 == 0);
            let half = nx / 2;
            for z in 0..nz {
                for y in 0..ny {
                    let line: Vec<f32> = (0..nx).map(|x| block.get(x, y, z)).collect();
                    let (lambda, gamma) = forward_1d(&line);
                    for k in 0..half {
                        out.set(k, y, z, lambda[k]);
                        out.set(half + k, y, z, gamma[k]);
                    }
                }
            }
        }
        Axis::Y => {
            assert!(ny % 2 == 0);
            let half = ny / 2;
            for z in 0..nz {
                for x in 0..nx {
                    let line: Vec<f32> = (0..ny).map(|y| block.get(x, y, z)).collect();
                    let (lambda, gamma) = forward_1d(&line);
                    for k in 0..half {
                        out.set(x, k, z, lambda[k]);
                        out.set(x, half + k, z, gamma[k]);
                    }
                }
            }
        }
        Axis::Z => {
            assert!(nz % 2 == 0);
            let half = nz / 2;
            for y in 0..ny {
                for x in 0..nx {
                    let line: Vec<f32> = (0..nz).map(|z| block.get(x, y, z)).collect();
                    let (lambda, gamma) = forward_1d(&line);
                    for k in 0..half {
                        out.set(x, y, k, lambda[k]);
                        out.set(x, y, half + k, gamma[k]);
                    }
                }
            }
        }
    }
    out
}

/// Inverse of [`forward_axis`].
pub fn inverse_axis(block: &Block3, axis: Axis) -> Block3 {
    let mut out = block.clone();
    let Coord3 { x: nx, y: ny, z: nz } = block.dims;
    match axis {
        Axis::X => {
            let half = nx / 2;
            for z in 0..nz {
                for y in 0..ny {
                    let lambda: Vec<f32> = (0..half).map(|k| block.get(k, y, z)).collect();
                    let gamma: Vec<f32> = (0..half).map(|k| block.get(half + k, y, z)).collect();
                    let line = inverse_1d(&lambda, &gamma);
                    for (x, v) in line.into_iter().enumerate() {
                        out.set(x, y, z, v);
                    }
                }
            }
        }
        Axis::Y => {
            let half = ny / 2;
            for z in 0..nz {
                for x in 0..nx {
                    let lambda: Vec<f32> = (0..half).map(|k| block.get(x, k, z)).collect();
                    let gamma: Vec<f32> = (0..half).map(|k| block.get(x, half + k, z)).collect();
                    let line = inverse_1d(&lambda, &gamma);
                    for (y, v) in line.into_iter().enumerate() {
                        out.set(x, y, z, v);
                    }
                }
            }
        }
        Axis::Z => {
            let half = nz / 2;
            for y in 0..ny {
                for x in 0..nx {
                    let lambda: Vec<f32> = (0..half).map(|k| block.get(x, y, k)).collect();
                    let gamma: Vec<f32> = (0..half).map(|k| block.get(x, y, half + k)).collect();
                    let line = inverse_1d(&lambda, &gamma);
                    for (z, v) in line.into_iter().enumerate() {
                        out.set(x, y, z, v);
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_axis_roundtrip() {
        let dims = Coord3::new(4, 2, 2);
        let data: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let block = Block3::from_data(dims, data);
        let transformed = forward_axis(&block, Axis::X);
        let back = inverse_axis(&transformed, Axis::X);
        for (a, b) in block.data.iter().zip(back.data.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
    }
}
