// ============================================================
// Layer 2 - InspectUseCase
// ============================================================
// Loads both splits without training and reports what a run
// would see: window shapes and how windows spread over the
// activity classes.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::{
    labels::{class_distribution, ClassCount},
    loader::load_dataset,
};
use crate::domain::layout::DatasetLayout;

#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub split:        String,
    /// (windows, time steps, channels)
    pub shape:        [usize; 3],
    pub distribution: Vec<ClassCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub train: SplitSummary,
    pub test:  SplitSummary,
}

pub struct InspectUseCase {
    layout: DatasetLayout,
}

impl InspectUseCase {
    pub fn new(layout: DatasetLayout) -> Self {
        Self { layout }
    }

    pub fn execute(&self) -> Result<InspectReport> {
        let data = load_dataset(&self.layout).with_context(|| {
            format!("Cannot load dataset under '{}'", self.layout.root.display())
        })?;

        let summarise = |split: &str, x: &ndarray::Array3<f32>, y: &ndarray::Array2<f32>| {
            let (n, t, c) = x.dim();
            SplitSummary {
                split:        split.to_string(),
                shape:        [n, t, c],
                distribution: class_distribution(y),
            }
        };

        Ok(InspectReport {
            train: summarise(&self.layout.train_split, &data.train.x, &data.train.y),
            test:  summarise(&self.layout.test_split, &data.test.x, &data.test.y),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::write_dataset;

    #[test]
    fn test_report_shapes_and_counts() {
        let dir    = tempfile::tempdir().unwrap();
        let layout = write_dataset(dir.path(), 128, &[1, 1, 2, 6], &[3, 3]);

        let report = InspectUseCase::new(layout).execute().unwrap();
        assert_eq!(report.train.split, "train");
        assert_eq!(report.train.shape, [4, 128, 9]);
        assert_eq!(report.test.shape, [2, 128, 9]);

        let train_counts: Vec<usize> = report.train.distribution.iter().map(|c| c.count).collect();
        assert_eq!(train_counts, vec![2, 1, 0, 0, 0, 1]);
        assert_eq!(report.train.distribution[0].name, "WALKING");
        assert_eq!(report.test.distribution[2].count, 2);
        assert_eq!(report.test.distribution[2].percent, 100.0);
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = InspectUseCase::new(DatasetLayout::new(dir.path())).execute().unwrap_err();
        assert!(err.to_string().contains("Cannot load dataset"));
    }
}
