//! Helpers shared by source implementations.
pub mod fs;
