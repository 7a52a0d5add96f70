//! Monodef CLI library.

pub mod commands;
