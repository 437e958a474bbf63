//! 1D biorthogonal lifting transform (5/3-style predict/update pair) with
//! `symh` (half-sample symmetric) boundary extension.
//!
//! The predict step estimates each odd sample from its two even neighbours;
//! the update step corrects each even sample using the newly-computed detail
//! coefficients either side of it. Run with no integer rounding, the pair is
//! its own exact inverse for any input, which is what the region reader
//! relies on for bit-for-bit reconstruction of untouched data.

/// Reflect index `i` into `[0, len)` using half-sample symmetric ("symh")
/// boundary extension: the mirror sits on the boundary *between* samples
/// `-1`/`0` and `len-1`/`len`, so the edge sample is not duplicated.
fn symh_index(i: isize, len: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let period = 2 * len;
    let mut k = i % period;
    if k < 0 {
        k += period;
    }
    if k >= len {
        k = period - 1 - k;
    }
    k as usize
}

fn symh_get(x: &[f32], i: isize) -> f32 {
    x[symh_index(i, x.len() as isize)]
}

/// Forward transform: split `x` (must have even length) into an
/// approximation half `lambda` and a detail half `gamma`, each of length
/// `x.len() / 2`.
pub fn forward_1d(x: &[f32]) -> (Vec<f32>, Vec<f32>) {
    assert!(x.len() % 2 == 0, "lifting transform requires even length");
    let n = x.len() / 2;
    let mut gamma = vec![0.0f32; n];
    for k in 0..n {
        let even_lo = symh_get(x, 2 * k as isize);
        let even_hi = symh_get(x, 2 * k as isize + 2);
        gamma[k] = x[2 * k + 1] - 0.5 * (even_lo + even_hi);
    }
    let mut lambda = vec![0.0f32; n];
    for k in 0..n {
        let d_lo = symh_get(&gamma, k as isize - 1);
        let d_hi = symh_get(&gamma, k as isize);
        lambda[k] = x[2 * k] + 0.25 * (d_lo + d_hi);
    }
    (lambda, gamma)
}

/// Inverse of [`forward_1d`]: reconstruct the original even-length sequence
/// from its approximation and detail halves.
pub fn inverse_1d(lambda: &[f32], gamma: &[f32]) -> Vec<f32> {
    assert_eq!(lambda.len(), gamma.len());
    let n = lambda.len();
    let mut x = vec![0.0f32; 2 * n];
    for k in 0..n {
        let d_lo = symh_get(gamma, k as isize - 1);
        let d_hi = symh_get(gamma, k as isize);
        x[2 * k] = lambda[k] - 0.25 * (d_lo + d_hi);
    }
    for k in 0..n {
        let even_lo = symh_get(&x, 2 * k as isize);
        let even_hi = symh_get(&x, 2 * k as isize + 2);
        x[2 * k + 1] = gamma[k] + 0.5 * (even_lo + even_hi);
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_is_exact() {
        let x: Vec<f32> = (0..16).map(|i| (i as f32) * 1.7 - 3.0).collect();
        let (lambda, gamma) = forward_1d(&x);
        let back = inverse_1d(&lambda, &gamma);
        for (a, b) in x.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-4, "{a} != {b}");
        }
    }

    #[test]
    fn constant_signal_has_zero_detail() {
        let x = vec![5.0f32; 8];
        let (lambda, gamma) = forward_1d(&x);
        assert!(gamma.iter().all(|&g| g.abs() < 1e-6));
        assert!(lambda.iter().all(|&l| (l - 5.0).abs() < 1e-6));
    }

    #[test]
    fn linear_ramp_has_zero_detail() {
        let x: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let (_lambda, gamma) = forward_1d(&x);
        assert!(
            gamma.iter().all(|&g| g.abs() < 1e-5),
            "linear ramps should vanish under a 1-vanishing-moment predictor: {:?}",
            gamma
        );
    }
}
