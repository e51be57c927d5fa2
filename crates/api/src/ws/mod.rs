//! WebSocket infrastructure for the live run log.
//!
//! Provides listener management, heartbeat monitoring, and the HTTP upgrade
//! handler mounted at `/ws/logs`.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
