// ============================================================
// Layer 4 - Label Encoding
// ============================================================
// Turns the raw activity codes from y_<split>.txt into one-hot
// training targets.
//
//   raw (1-indexed):   [5, 1, 6]
//   zero-offset:       [4, 0, 5]
//   one-hot (k = 6):   [[0,0,0,0,1,0],
//                       [1,0,0,0,0,0],
//                       [0,0,0,0,0,1]]
//
// The width always comes from the caller. A split that never
// contains class 6 still produces 6 columns, so train and test
// targets line up.

use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;

use crate::data::error::DataError;
use crate::domain::activity::Activity;

/// Zero-offset 1-indexed labels and one-hot encode them into
/// `num_classes` columns, in class-index order.
pub fn prepare_labels(raw: &Array1<i64>, num_classes: usize) -> Result<Array2<f32>, DataError> {
    let mut one_hot = Array2::<f32>::zeros((raw.len(), num_classes));

    for (row, &value) in raw.iter().enumerate() {
        if value < 1 || value > num_classes as i64 {
            return Err(DataError::LabelRange { row, value, num_classes });
        }
        one_hot[[row, (value - 1) as usize]] = 1.0;
    }

    Ok(one_hot)
}

/// Index of the largest entry; the class of a one-hot row.
pub fn class_of(row: ArrayView1<f32>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCount {
    pub class:   usize,
    /// Activity name when the class index is a known UCI HAR activity
    pub name:    String,
    pub count:   usize,
    pub percent: f64,
}

/// Per-class window counts of a one-hot label matrix.
pub fn class_distribution(y: &Array2<f32>) -> Vec<ClassCount> {
    let (rows, classes) = y.dim();
    let mut counts      = vec![0usize; classes];
    for row in y.rows() {
        counts[class_of(row)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(class, count)| ClassCount {
            class,
            name: Activity::from_class_index(class)
                .map(|a| a.name().to_string())
                .unwrap_or_else(|| format!("CLASS_{class}")),
            count,
            percent: if rows > 0 { count as f64 * 100.0 / rows as f64 } else { 0.0 },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_argmax_matches_zero_offset_label() {
        let raw = array![1i64, 2, 3, 4, 5, 6, 3, 1];
        let y   = prepare_labels(&raw, 6).unwrap();

        assert_eq!(y.dim(), (8, 6));
        for (row, &label) in y.rows().into_iter().zip(raw.iter()) {
            assert_eq!(class_of(row), (label - 1) as usize);
            assert_eq!(row.sum(), 1.0);
        }
    }

    #[test]
    fn test_width_is_fixed_not_inferred() {
        let y = prepare_labels(&array![1i64, 2], 6).unwrap();
        assert_eq!(y.dim(), (2, 6));
        assert_eq!(y.column(5).sum(), 0.0);
    }

    #[test]
    fn test_zero_label_is_out_of_range() {
        let err = prepare_labels(&array![1i64, 0], 6).unwrap_err();
        assert!(matches!(err, DataError::LabelRange { row: 1, value: 0, num_classes: 6 }));
    }

    #[test]
    fn test_label_above_class_count_is_out_of_range() {
        assert!(prepare_labels(&array![6i64], 6).is_ok());
        assert!(matches!(
            prepare_labels(&array![6i64], 5),
            Err(DataError::LabelRange { value: 6, .. })
        ));
    }

    #[test]
    fn test_class_distribution() {
        let y    = prepare_labels(&array![1i64, 1, 2, 6], 6).unwrap();
        let dist = class_distribution(&y);

        assert_eq!(dist.len(), 6);
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[0].name, "WALKING");
        assert_eq!(dist[0].percent, 50.0);
        assert_eq!(dist[2].count, 0);
        assert_eq!(dist[5].name, "LAYING");
        assert_eq!(dist.iter().map(|c| c.count).sum::<usize>(), 4);
    }
}
