//! Control algorithms.

pub mod load;
