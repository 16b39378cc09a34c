use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between the text files on disk
/// and the block tensors handed to the model. None of these are
/// recoverable: a malformed dataset aborts the run.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("expected input file '{}' does not exist", path.display())]
    FileNotFound { path: PathBuf },

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in '{}' line {line}: {reason}", path.display())]
    Parse { path: PathBuf, line: usize, reason: String },

    #[error(
        "shape mismatch in '{}': expected {expected:?} (rows, cols), found {found:?}",
        path.display()
    )]
    ShapeMismatch {
        path:     PathBuf,
        expected: (usize, usize),
        found:    (usize, usize),
    },

    #[error("invalid shape: {reason}")]
    Shape { reason: String },

    #[error("label {value} at row {row} outside [1, {num_classes}]")]
    LabelRange { row: usize, value: i64, num_classes: usize },
}

impl From<ndarray::ShapeError> for DataError {
    fn from(e: ndarray::ShapeError) -> Self {
        DataError::Shape { reason: e.to_string() }
    }
}
