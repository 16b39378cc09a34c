// ============================================================
// Layer 3 - Dataset Layout
// ============================================================
// Captures the on-disk naming convention of the UCI HAR dataset
// as data instead of string concatenation scattered around the
// loader:
//
//   <root>/<dataset_dir>/<split>/<inertial_dir>/<signal>_<axis>_<split>.txt
//   <root>/<dataset_dir>/<split>/y_<split>.txt
//
// Tests point `root` at a temporary directory and reuse the
// exact same loader code.
//
// Reference: Rust Book §5 (Structs), std::path::PathBuf

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::activity::NUM_ACTIVITIES;

/// One physical sensor signal, e.g. `body_gyro` on the `x` axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub signal: String,
    pub axis:   String,
}

impl Channel {
    pub fn new(signal: impl Into<String>, axis: impl Into<String>) -> Self {
        Self { signal: signal.into(), axis: axis.into() }
    }

    /// `<signal>_<axis>_<split>.txt`
    pub fn file_name(&self, split: &str) -> String {
        format!("{}_{}_{}.txt", self.signal, self.axis, split)
    }
}

/// The nine inertial channels in stacking order:
/// total_acc x,y,z then body_acc x,y,z then body_gyro x,y,z.
/// The order defines the last axis of every input tensor.
pub fn default_channels() -> Vec<Channel> {
    ["total_acc", "body_acc", "body_gyro"]
        .iter()
        .flat_map(|signal| ["x", "y", "z"].iter().map(move |axis| Channel::new(*signal, *axis)))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetLayout {
    /// Prefix directory that contains `dataset_dir`
    pub root:         PathBuf,
    pub dataset_dir:  String,
    pub inertial_dir: String,
    pub train_split:  String,
    pub test_split:   String,
    pub channels:     Vec<Channel>,
    /// Fixed class count for one-hot encoding, never inferred from labels
    pub num_classes:  usize,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            root:         PathBuf::from("."),
            dataset_dir:  "UCI_HAR_Dataset".to_string(),
            inertial_dir: "Inertial Signals".to_string(),
            train_split:  "train".to_string(),
            test_split:   "test".to_string(),
            channels:     default_channels(),
            num_classes:  NUM_ACTIVITIES,
        }
    }
}

impl DatasetLayout {
    /// Default UCI HAR layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), ..Self::default() }
    }

    pub fn with_dataset_dir(mut self, dataset_dir: impl Into<String>) -> Self {
        self.dataset_dir = dataset_dir.into();
        self
    }

    /// `<root>/<dataset_dir>/<split>`
    pub fn split_dir(&self, split: &str) -> PathBuf {
        self.root.join(&self.dataset_dir).join(split)
    }

    /// Channel file paths for `split`, in stacking order.
    pub fn channel_paths(&self, split: &str) -> Vec<PathBuf> {
        let dir = self.split_dir(split).join(&self.inertial_dir);
        self.channels
            .iter()
            .map(|c| dir.join(c.file_name(split)))
            .collect()
    }

    /// `<root>/<dataset_dir>/<split>/y_<split>.txt`
    pub fn label_path(&self, split: &str) -> PathBuf {
        self.split_dir(split).join(format!("y_{split}.txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_channel_order() {
        let names: Vec<String> = default_channels()
            .iter()
            .map(|c| c.file_name("train"))
            .collect();
        assert_eq!(names, vec![
            "total_acc_x_train.txt", "total_acc_y_train.txt", "total_acc_z_train.txt",
            "body_acc_x_train.txt",  "body_acc_y_train.txt",  "body_acc_z_train.txt",
            "body_gyro_x_train.txt", "body_gyro_y_train.txt", "body_gyro_z_train.txt",
        ]);
    }

    #[test]
    fn test_paths_follow_uci_convention() {
        let layout = DatasetLayout::new("/data");
        let paths  = layout.channel_paths("test");
        assert_eq!(paths.len(), 9);
        assert_eq!(
            paths[0],
            Path::new("/data/UCI_HAR_Dataset/test/Inertial Signals/total_acc_x_test.txt")
        );
        assert_eq!(
            layout.label_path("test"),
            Path::new("/data/UCI_HAR_Dataset/test/y_test.txt")
        );
    }

    #[test]
    fn test_custom_dataset_dir() {
        let layout = DatasetLayout::new("root").with_dataset_dir("HAR");
        assert_eq!(layout.split_dir("train"), Path::new("root/HAR/train"));
        assert_eq!(layout.num_classes, 6);
    }
}
