//! Infrastructure layer - Technical implementations

pub mod session;

pub use session::{ActiveSession, SessionInfo, SessionManager};
