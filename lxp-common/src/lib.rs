//! # LXP Common Library
//!
//! Shared code for the LXP feedback services:
//! - Error type shared by storage and configuration code
//! - Configuration loading and root folder resolution
//! - SQLite initialization and feedback schema
//! - Timestamp and UUID helpers for the storage format

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
