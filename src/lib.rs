//! Switchboard - An IVR call flow host built with Rust
//!
//! Serves Twilio-style voice webhooks: each inbound call is matched to
//! a registered call flow, suspended between turns in an in-memory
//! session cache, and answered with TwiML.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::FlowError;
pub use domain::shared::result::Result;
