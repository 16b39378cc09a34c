// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong in any specific
// business layer:
//
//   metrics.rs - Training metrics logging
//                Writes per-epoch and per-run metrics to CSV,
//                snapshots the run configuration as JSON, and
//                summarises accuracy across repeated runs.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Training metrics CSV logger and accuracy summary
pub mod metrics;
