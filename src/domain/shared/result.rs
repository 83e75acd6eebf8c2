//! Domain result type

use super::error::FlowError;

/// Standard result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
