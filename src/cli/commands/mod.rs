//! CLI command implementations.

pub mod init;
pub mod model;
pub mod play;
pub mod profile;
pub mod themes;
