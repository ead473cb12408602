//! Small statistics helpers for optimizer progress reporting.

pub mod descriptive;

pub use descriptive::DescriptiveStats;
