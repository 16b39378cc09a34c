// ============================================================
// Layer 4 - Inertial Signal Loader
// ============================================================
// Reads the UCI HAR text files into ndarray tensors.
//
// On-disk format:
//   One file per channel and split. Each row is one window,
//   each column one time step (128 per window), values are
//   whitespace-delimited floats with no header, e.g.
//
//     1.0128e+000  1.0215e+000  1.0221e+000 ...
//
// Loading a split:
//   9 channel files, each (windows, 128)
//       │  stack along a new last axis, in layout order
//       ▼
//   X: (windows, 128, 9)
//   y: (windows,) raw integer labels from y_<split>.txt
//
// Every file of a split must agree on rows and columns. The
// check runs before anything is stacked.
//
// Reference: ndarray crate documentation (stack, Array2/Array3)
//            Rust Book §9 (Error Handling)

use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use std::{
    fmt::Display,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::data::error::DataError;
use crate::data::labels::prepare_labels;
use crate::domain::layout::DatasetLayout;

/// Parse a whitespace-delimited table with no header into a
/// (rows, cols) matrix. Blank lines are skipped; every other
/// line must have the same number of columns.
pub fn load_table<T>(path: &Path) -> Result<Array2<T>, DataError>
where
    T: FromStr,
    T::Err: Display,
{
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataError::FileNotFound { path: path.to_path_buf() },
        _ => DataError::Io { path: path.to_path_buf(), source: e },
    })?;

    let mut values: Vec<T>      = Vec::new();
    let mut cols: Option<usize> = None;
    let mut rows                = 0usize;

    for (i, line) in text.lines().enumerate() {
        let start = values.len();
        for token in line.split_whitespace() {
            let v = token.parse::<T>().map_err(|e| DataError::Parse {
                path:   path.to_path_buf(),
                line:   i + 1,
                reason: format!("'{token}' is not a valid number ({e})"),
            })?;
            values.push(v);
        }

        let n = values.len() - start;
        if n == 0 {
            continue;
        }
        match cols {
            None => cols = Some(n),
            Some(expected) if expected != n => {
                return Err(DataError::Parse {
                    path:   path.to_path_buf(),
                    line:   i + 1,
                    reason: format!("expected {expected} columns, found {n}"),
                });
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = cols.ok_or_else(|| DataError::Parse {
        path:   path.to_path_buf(),
        line:   0,
        reason: "file contains no data rows".to_string(),
    })?;

    Ok(Array2::from_shape_vec((rows, cols), values)?)
}

/// One channel file as a (windows, time steps) float matrix.
pub fn load_channel_file(path: &Path) -> Result<Array2<f32>, DataError> {
    let m = load_table::<f32>(path)?;
    tracing::debug!("Loaded '{}' {:?}", path.display(), m.dim());
    Ok(m)
}

/// Load every path and stack the matrices along a new last axis,
/// preserving the order of `paths`: `out[.., .., i]` is file `i`.
pub fn load_channel_group(paths: &[PathBuf]) -> Result<Array3<f32>, DataError> {
    if paths.is_empty() {
        return Err(DataError::Shape { reason: "channel group is empty".to_string() });
    }

    let matrices = paths
        .iter()
        .map(|p| load_channel_file(p))
        .collect::<Result<Vec<_>, _>>()?;

    let expected = matrices[0].dim();
    for (path, m) in paths.iter().zip(&matrices).skip(1) {
        if m.dim() != expected {
            return Err(DataError::ShapeMismatch {
                path:  path.clone(),
                expected,
                found: m.dim(),
            });
        }
    }

    let views: Vec<ArrayView2<f32>> = matrices.iter().map(|m| m.view()).collect();
    Ok(ndarray::stack(Axis(2), &views)?)
}

/// A split as stored on disk: stacked channels and raw 1-indexed labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSplit {
    /// (windows, time steps, channels)
    pub x:      Array3<f32>,
    /// (windows,)
    pub labels: Array1<i64>,
}

/// Load the channel group and label file of `split` using the
/// naming convention of `layout`.
pub fn load_split(layout: &DatasetLayout, split: &str) -> Result<RawSplit, DataError> {
    let x = load_channel_group(&layout.channel_paths(split))?;

    let label_path = layout.label_path(split);
    let y          = load_table::<i64>(&label_path)?;
    let windows    = x.dim().0;

    if y.dim() != (windows, 1) {
        return Err(DataError::ShapeMismatch {
            path:     label_path,
            expected: (windows, 1),
            found:    y.dim(),
        });
    }

    let labels = y.column(0).to_owned();
    Ok(RawSplit { x, labels })
}

/// A split ready for training: one-hot encoded labels.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSplit {
    /// (windows, time steps, channels)
    pub x: Array3<f32>,
    /// (windows, num_classes)
    pub y: Array2<f32>,
}

impl EncodedSplit {
    pub fn num_windows(&self) -> usize {
        self.x.dim().0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    pub train: EncodedSplit,
    pub test:  EncodedSplit,
}

impl LoadedDataset {
    /// (time steps, channels) shared by both splits
    pub fn window_shape(&self) -> (usize, usize) {
        let (_, t, c) = self.train.x.dim();
        (t, c)
    }

    pub fn num_classes(&self) -> usize {
        self.train.y.dim().1
    }
}

/// Load and encode both splits of the dataset described by `layout`.
///
/// Guarantees that train and test windows share their
/// (time steps, channels) shape and that both label matrices
/// have exactly `layout.num_classes` columns.
pub fn load_dataset(layout: &DatasetLayout) -> Result<LoadedDataset, DataError> {
    let train = load_split(layout, &layout.train_split)?;
    println!("{}: X {:?}, y {:?}", layout.train_split, train.x.shape(), train.labels.shape());

    let test = load_split(layout, &layout.test_split)?;
    println!("{}: X {:?}, y {:?}", layout.test_split, test.x.shape(), test.labels.shape());

    let (_, train_t, train_c) = train.x.dim();
    let (_, test_t, test_c)   = test.x.dim();
    if (train_t, train_c) != (test_t, test_c) {
        return Err(DataError::ShapeMismatch {
            path:     layout.split_dir(&layout.test_split),
            expected: (train_t, train_c),
            found:    (test_t, test_c),
        });
    }

    let train = EncodedSplit { y: prepare_labels(&train.labels, layout.num_classes)?, x: train.x };
    let test  = EncodedSplit { y: prepare_labels(&test.labels,  layout.num_classes)?, x: test.x };

    println!(
        "trainX {:?} trainy {:?} testX {:?} testy {:?}",
        train.x.shape(), train.y.shape(), test.x.shape(), test.y.shape()
    );
    tracing::info!(
        "Loaded {} training and {} test windows from '{}'",
        train.num_windows(),
        test.num_windows(),
        layout.root.join(&layout.dataset_dir).display()
    );

    Ok(LoadedDataset { train, test })
}
