//! Types shared by the document model and the layout engine.

pub mod error;
pub mod unit;

pub use error::{Error, Result};
