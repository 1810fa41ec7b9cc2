//! Core types and configuration for the tickstats system.
//!
//! This crate provides shared types used across all other crates:
//! - Tick records, instrument series and summary rows
//! - Configuration structures (schemas, metric policies)
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result, RowError};
pub use types::*;
