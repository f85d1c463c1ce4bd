//! Unified error types for Longan.
//!
//! This module provides the single error type used by the document model,
//! the XML readers and the editing operations.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
