// Test-only helpers that write a small synthetic dataset in the
// UCI HAR directory layout.

use std::{fs, path::Path};

use crate::domain::layout::DatasetLayout;

/// Write a whitespace-delimited table in the UCI style: leading
/// spaces, two-space separators, scientific notation.
pub fn write_table(path: &Path, rows: usize, cols: usize, value: impl Fn(usize, usize) -> f32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut text = String::new();
    for r in 0..rows {
        let line: Vec<String> = (0..cols).map(|c| format!("{:e}", value(r, c))).collect();
        text.push_str("  ");
        text.push_str(&line.join("  "));
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

pub fn write_labels(path: &Path, labels: &[i64]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let text: String = labels.iter().map(|l| format!("{l}\n")).collect();
    fs::write(path, text).unwrap();
}

/// Channel `i` of every window is filled with the constant `i`.
pub fn write_split(layout: &DatasetLayout, split: &str, cols: usize, labels: &[i64]) {
    for (i, path) in layout.channel_paths(split).iter().enumerate() {
        write_table(path, labels.len(), cols, |_, _| i as f32);
    }
    write_labels(&layout.label_path(split), labels);
}

/// A complete train + test dataset under `root`.
pub fn write_dataset(root: &Path, cols: usize, train: &[i64], test: &[i64]) -> DatasetLayout {
    let layout = DatasetLayout::new(root);
    write_split(&layout, &layout.train_split, cols, train);
    write_split(&layout, &layout.test_split, cols, test);
    layout
}
