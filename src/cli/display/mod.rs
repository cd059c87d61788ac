//! Display helpers for CLI output: tables and colors.

pub mod colors;
pub mod table;

pub use colors::*;
pub use table::*;
