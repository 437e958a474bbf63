//! Missing-value-aware bilinear resample driven by a precomputed
//! [`WeightTable`] (spec §4.6 `interp2D`), grounded on the LUT-driven
//! bilinear resample pattern in the teacher's projection crate
//! (`projection::lut::resample_with_lut`): four weighted corner samples,
//! skipped/flagged on missing data instead of trusted blindly.

use crate::weight::WeightTable;

/// Resample `src` (row-major, `src_nx` wide) onto `table`'s target grid.
/// A target vertex whose four corners' combined missing weight is `>= 0.5`
/// is written as `dst_mv`; otherwise the non-missing corners are blended
/// and renormalized by their combined weight. Vertices with no covering
/// source cell also receive `dst_mv`.
pub fn interp2d(src: &[f32], src_nx: usize, table: &WeightTable, src_mv: f32, dst_mv: f32) -> Vec<f32> {
    let mut out = vec![dst_mv; table.nlon * table.nlat];
    for j in 0..table.nlat {
        for i in 0..table.nlon {
            let Some(w) = table.get(i, j) else { continue };
            let mut acc = 0.0_f64;
            let mut missing_weight = 0.0_f64;
            let mut present_weight = 0.0_f64;
            for (k, &(sx, sy)) in w.src_indices.iter().enumerate() {
                let value = src[sy * src_nx + sx];
                let coeff = w.coeffs[k];
                if is_missing(value, src_mv) {
                    missing_weight += coeff;
                } else {
                    acc += coeff * value as f64;
                    present_weight += coeff;
                }
            }
            if missing_weight >= 0.5 {
                out[j * table.nlon + i] = dst_mv;
            } else if present_weight > 0.0 {
                out[j * table.nlon + i] = (acc / present_weight) as f32;
            }
        }
    }
    out
}

fn is_missing(value: f32, mv: f32) -> bool {
    value.is_nan() || (mv.is_finite() && (value - mv).abs() < f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight::WeightTable;

    #[test]
    fn uniform_field_resamples_to_a_constant() {
        let src = vec![7.0_f32; 9];
        let lon: Vec<f64> = (0..9).map(|i| (i % 3) as f64).collect();
        let lat: Vec<f64> = (0..9).map(|i| (i / 3) as f64).collect();
        let table = WeightTable::compute(&lon, &lat, 3, 3, 5, 5, (0.0, 2.0), (0.0, 2.0), false).unwrap();
        let out = interp2d(&src, 3, &table, f32::NAN, -999.0);
        for (idx, &v) in out.iter().enumerate() {
            if table.weights[idx].is_some() {
                assert!((v - 7.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn mostly_missing_corners_propagate_missing_value() {
        let mut src = vec![1.0_f32; 9];
        src[0] = f32::NAN;
        src[1] = f32::NAN;
        src[3] = f32::NAN;
        let lon: Vec<f64> = (0..9).map(|i| (i % 3) as f64).collect();
        let lat: Vec<f64> = (0..9).map(|i| (i / 3) as f64).collect();
        let table = WeightTable::compute(&lon, &lat, 3, 3, 3, 3, (0.0, 2.0), (0.0, 2.0), false).unwrap();
        let out = interp2d(&src, 3, &table, f32::NAN, -999.0);
        assert_eq!(out[0], -999.0);
    }
}
