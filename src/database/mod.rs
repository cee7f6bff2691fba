//! # Tabular Structures
//!
//! Rows, column profiles, profiled tables and the joined dataset.
pub mod column;
pub mod dataset;
pub mod row;
pub mod table;
