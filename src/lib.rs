//! # console-realtime
//!
//! Realtime push-connection manager for the admin console: one persistent
//! bidirectional connection to the push server, kept alive across network
//! interruptions, with server-pushed events fanned out to any number of
//! decoupled subscribers.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use console_realtime::{RealtimeLink, RealtimeLinkOptions, TokenProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokens: Arc<dyn TokenProvider> =
//!         Arc::new(|| Some("session-token".to_string()));
//!
//!     let link = RealtimeLink::new(
//!         "wss://console.example.com/push",
//!         RealtimeLinkOptions::default(),
//!         tokens,
//!     )?;
//!
//!     link.on("errorLog", Arc::new(|payload| {
//!         println!("server error log: {payload}");
//!     }));
//!
//!     link.connect().await;
//!     Ok(())
//! }
//! ```

mod heartbeat;

pub mod link;
pub mod registry;
pub mod retry;
pub mod transport;
pub mod types;
pub mod websocket;

pub use link::{LinkState, RealtimeLink, RealtimeLinkOptions};
pub use registry::{EventHandler, EventRegistry};
pub use retry::RetryBudget;
pub use transport::{Connector, TokenProvider, TransportEvent, TransportHandle};
pub use types::{Frame, LinkError, Result};
pub use websocket::WsConnector;
