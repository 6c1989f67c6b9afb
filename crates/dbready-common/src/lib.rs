//! # dbready-common
//!
//! Shared types, configuration, error handling, and validation used across all dbready crates.
//! This is the foundation layer — no I/O beyond loading configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;
