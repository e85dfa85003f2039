//! Column extraction and reduction
//!
//! Pure building blocks of the pipeline: turning a CSV body into samples and
//! folding samples into a single statistic.

pub mod column;
pub mod reducer;

pub use column::{parse_column, parse_file};
pub use reducer::Operation;
