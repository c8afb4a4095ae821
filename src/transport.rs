use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::types::{Frame, Result};

/// Signals delivered by a live transport to its owner.
#[derive(Debug)]
pub enum TransportEvent {
    /// An inbound frame, already decoded.
    Frame(Frame),
    /// The transport failed. Recoverable: drives the reconnection policy.
    Error(String),
    /// The remote side closed the connection. A locally initiated
    /// `disconnect()` never produces this on a live pump: teardown drops
    /// the event receiver first.
    Closed,
}

/// A live connection: an outbound frame sink plus the inbound event stream.
///
/// Dropping `outbound` closes the underlying socket.
pub struct TransportHandle {
    pub outbound: mpsc::Sender<Frame>,
    pub events: mpsc::Receiver<TransportEvent>,
}

/// Opens transports. The link owns exactly one live handle at a time and is
/// the only component that ever touches it.
///
/// Injectable so tests can script connection outcomes without a network.
pub trait Connector: Send + Sync {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<TransportHandle>>;
}

/// Read-only view of an externally owned credential store.
///
/// The link reads the token at the moment of each connection attempt and
/// never caches it, so a rotation between attempts is honored automatically.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}
