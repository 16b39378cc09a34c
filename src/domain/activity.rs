// ============================================================
// Layer 3 - Activity Domain Type
// ============================================================
// The six activities recorded in the UCI HAR dataset.
// Label files store them 1-indexed (1 = WALKING ... 6 = LAYING);
// inside the crate they are always 0-indexed class ids.

use serde::{Deserialize, Serialize};

/// Number of activity classes in the dataset.
pub const NUM_ACTIVITIES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Walking,
    WalkingUpstairs,
    WalkingDownstairs,
    Sitting,
    Standing,
    Laying,
}

impl Activity {
    pub const ALL: [Activity; NUM_ACTIVITIES] = [
        Activity::Walking,
        Activity::WalkingUpstairs,
        Activity::WalkingDownstairs,
        Activity::Sitting,
        Activity::Standing,
        Activity::Laying,
    ];

    /// Map a 0-indexed class id back to its activity.
    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Name as written in the dataset's `activity_labels.txt`.
    pub fn name(self) -> &'static str {
        match self {
            Activity::Walking           => "WALKING",
            Activity::WalkingUpstairs   => "WALKING_UPSTAIRS",
            Activity::WalkingDownstairs => "WALKING_DOWNSTAIRS",
            Activity::Sitting           => "SITTING",
            Activity::Standing          => "STANDING",
            Activity::Laying            => "LAYING",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_index_round_trip() {
        for (i, a) in Activity::ALL.iter().enumerate() {
            assert_eq!(Activity::from_class_index(i), Some(*a));
        }
        assert_eq!(Activity::from_class_index(NUM_ACTIVITIES), None);
    }

    #[test]
    fn test_names_follow_label_file_order() {
        assert_eq!(Activity::Walking.name(), "WALKING");
        assert_eq!(Activity::Laying.to_string(), "LAYING");
    }
}
