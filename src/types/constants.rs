/// Reserved event names used by the link itself (magic strings layer).
///
/// Lifecycle notifications are dispatched through the same registry as
/// business events so the embedding UI can subscribe to everything
/// uniformly.
pub mod lifecycle_events {
    /// Dispatched once per successfully established connection.
    pub const CONNECTED: &str = "link:connected";
    /// Dispatched once when the retry budget is exhausted. Terminal.
    pub const FAILED: &str = "link:failed";
}

/// Liveness probe sent on each heartbeat tick and by `ping()`.
pub const PING_EVENT: &str = "ping";
/// Liveness reply pushed back by the server; routed like any other event.
pub const PONG_EVENT: &str = "pong";

/// Query parameter carrying the credential on the connection URL.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Default heartbeat interval (milliseconds)
pub const HEARTBEAT_INTERVAL: u64 = 25_000;

/// Default delay between reconnection attempts (milliseconds). Flat, no
/// backoff.
pub const RECONNECT_DELAY: u64 = 5_000;

/// Default number of automatic reconnection attempts before giving up.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Outbound frame / transport event channel capacity
pub const CHANNEL_CAPACITY: usize = 100;
