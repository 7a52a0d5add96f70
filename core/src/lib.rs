//! Monodef Core - Shared Types
//!
//! This module provides the error taxonomy and configuration used
//! across the monodef crates.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::ConvertConfig;
pub use error::{MonodefError, Result};

/// Monodef version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
