//! Database initialization and feedback schema

pub mod init;

pub use init::*;
