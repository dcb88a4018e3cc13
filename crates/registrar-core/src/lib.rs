//! Core types and trait definitions for the Registrar term store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod lifecycle;
pub mod store;
pub mod term;

pub use error::{Error, Result};
pub use lifecycle::TermLifecycle;
