// ============================================================
// Layer 4 - Block Reshaper
// ============================================================
// Splits every window into contiguous, non-overlapping blocks
// so the convolutional stage can read each block separately and
// the LSTM can read the blocks in time order.
//
//   (N, 128, 9)  ──to_blocks(4, 32)──▶  (N, 4, 32, 9)
//
//   window steps:  0 ..  31 │ 32 .. 63 │ 64 .. 95 │ 96 .. 127
//   block:             0    │    1     │    2     │     3
//
// This is a pure row-major reshape: no resampling, no copying
// of values out of order. `from_blocks` undoes it exactly.

use ndarray::{Array3, Array4};

use crate::data::error::DataError;

pub fn to_blocks(x: &Array3<f32>, n_steps: usize, n_length: usize) -> Result<Array4<f32>, DataError> {
    let (n, t, c) = x.dim();

    if n_steps == 0 || n_length == 0 {
        return Err(DataError::Shape {
            reason: format!("block count ({n_steps}) and block length ({n_length}) must be positive"),
        });
    }
    let window = n_steps.checked_mul(n_length).ok_or_else(|| DataError::Shape {
        reason: format!("{n_steps} blocks of {n_length} steps overflow the time dimension"),
    })?;
    if t != window {
        return Err(DataError::Shape {
            reason: format!(
                "time dimension {t} cannot be split into {n_steps} blocks of {n_length} (= {window})"
            ),
        });
    }

    Ok(x.to_shape((n, n_steps, n_length, c))?.into_owned())
}

/// Inverse of [`to_blocks`]: (N, steps, length, C) -> (N, steps * length, C).
#[allow(dead_code)]
pub fn from_blocks(x: &Array4<f32>) -> Result<Array3<f32>, DataError> {
    let (n, steps, length, c) = x.dim();
    Ok(x.to_shape((n, steps * length, c))?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, ShapeBuilder};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_windows(n: usize, t: usize, c: usize) -> Array3<f32> {
        let mut rng = StdRng::seed_from_u64(7);
        Array3::from_shape_fn((n, t, c), |_| rng.gen_range(-2.0..2.0))
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let x      = random_windows(3, 128, 9);
        let blocks = to_blocks(&x, 4, 32).unwrap();
        assert_eq!(blocks.dim(), (3, 4, 32, 9));
        assert_eq!(from_blocks(&blocks).unwrap(), x);
    }

    #[test]
    fn test_blocks_are_contiguous_in_time_order() {
        // Value encodes its own time step
        let x      = Array3::from_shape_fn((2, 128, 9), |(_, t, _)| t as f32);
        let blocks = to_blocks(&x, 4, 32).unwrap();

        for step in 0..4 {
            for i in 0..32 {
                let expected = (step * 32 + i) as f32;
                assert!(blocks.slice(s![.., step, i, ..]).iter().all(|&v| v == expected));
            }
        }
    }

    #[test]
    fn test_round_trip_on_non_standard_layout() {
        // Column-major input must still be split in logical time order
        let x       = random_windows(2, 64, 3);
        let fortran = {
            let mut f = Array3::<f32>::zeros((2, 64, 3).f());
            f.assign(&x);
            f
        };
        let blocks = to_blocks(&fortran, 2, 32).unwrap();
        assert_eq!(blocks, to_blocks(&x, 2, 32).unwrap());
    }

    #[test]
    fn test_indivisible_time_dimension() {
        let x   = Array3::<f32>::zeros((1, 100, 9));
        let err = to_blocks(&x, 4, 32).unwrap_err();
        assert!(matches!(err, DataError::Shape { .. }));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_zero_block_length() {
        let x = Array3::<f32>::zeros((1, 128, 9));
        assert!(matches!(to_blocks(&x, 4, 0), Err(DataError::Shape { .. })));
    }

    #[test]
    fn test_block_product_overflow_is_shape_error() {
        let x   = Array3::<f32>::zeros((1, 128, 9));
        let err = to_blocks(&x, usize::MAX, 2).unwrap_err();
        assert!(matches!(err, DataError::Shape { .. }));
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_reshape_is_deterministic() {
        let x = random_windows(4, 128, 9);
        assert_eq!(to_blocks(&x, 4, 32).unwrap(), to_blocks(&x, 4, 32).unwrap());
    }
}
