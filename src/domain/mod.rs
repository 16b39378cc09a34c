// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types describing the problem: where the dataset
// lives on disk, which activities exist, and what the network
// looks like as data.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and their invariants
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

// The six activity classes of the UCI HAR dataset
pub mod activity;

// Directory layout and channel naming of the dataset
pub mod layout;

// Declarative layer list for the CNN-LSTM network
pub mod topology;
