//! API interface implementations

pub mod metrics_handler;
pub mod router;
pub mod session_dto;
pub mod session_handler;
pub mod voice_handler;

pub use metrics_handler::{init_metrics, update_active_sessions};
pub use router::build_router;
pub use voice_handler::AppState;
