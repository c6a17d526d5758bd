//! Utility modules

pub mod target_input;

pub use target_input::{collect_targets, read_targets, TargetInputStats};
