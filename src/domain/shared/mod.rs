//! Shared kernel - Common types used across the domain

pub mod error;
pub mod result;

pub use error::FlowError;
pub use result::Result;
