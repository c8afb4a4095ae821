use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use url::Url;

use crate::heartbeat::Heartbeat;
use crate::registry::{EventHandler, EventRegistry};
use crate::retry::RetryBudget;
use crate::transport::{Connector, TokenProvider, TransportEvent, TransportHandle};
use crate::types::constants::lifecycle_events;
use crate::types::{
    Frame, Result, HEARTBEAT_INTERVAL, MAX_RECONNECT_ATTEMPTS, PING_EVENT, RECONNECT_DELAY,
    TOKEN_QUERY_PARAM,
};
use crate::websocket::WsConnector;

/// Connection lifecycle states.
///
/// `Idle` is the only state an explicit `disconnect()` leaves behind;
/// `Failed` is terminal until a fresh explicit `connect()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

/// Configuration options for [`RealtimeLink`]. All intervals are in
/// milliseconds; `None` falls back to the crate defaults.
#[derive(Debug, Clone, Default)]
pub struct RealtimeLinkOptions {
    pub heartbeat_interval: Option<u64>,
    pub reconnect_delay: Option<u64>,
    pub max_reconnect_attempts: Option<u32>,
}

/// Mutable state guarded by one lock.
///
/// Every background task handle lives here so that teardown can account for
/// all of them; a timer that outlives its connection is the characteristic
/// bug this struct exists to prevent.
struct LinkShared {
    state: LinkState,
    budget: RetryBudget,
    outbound: Option<mpsc::Sender<Frame>>,
    pump_task: Option<JoinHandle<()>>,
    heartbeat_task: Option<JoinHandle<()>>,
    retry_task: Option<JoinHandle<()>>,
}

pub(crate) struct LinkInner {
    endpoint: Url,
    heartbeat_interval: Duration,
    tokens: Arc<dyn TokenProvider>,
    connector: Arc<dyn Connector>,
    registry: EventRegistry,
    shared: RwLock<LinkShared>,
}

/// The realtime connection manager.
///
/// Owns the single persistent server connection, keeps it alive across
/// network interruptions with a bounded flat-delay retry policy, and fans
/// server-pushed frames out to subscribers registered through
/// [`on`](Self::on). Subscribers never see the transport; subscriptions
/// survive reconnects and explicit disconnects.
///
/// Cloning is cheap and every clone drives the same connection.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use console_realtime::{RealtimeLink, RealtimeLinkOptions, TokenProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens: Arc<dyn TokenProvider> =
///     Arc::new(|| Some("session-token".to_string()));
///
/// let link = RealtimeLink::new(
///     "wss://console.example.com/push",
///     RealtimeLinkOptions::default(),
///     tokens,
/// )?;
///
/// link.on("statsUpdate", Arc::new(|payload| {
///     println!("stats: {payload}");
/// }));
///
/// link.connect().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeLink {
    inner: Arc<LinkInner>,
}

impl RealtimeLink {
    /// Creates a link over the default WebSocket transport.
    ///
    /// Validates the endpoint URL but does not connect; call
    /// [`connect`](Self::connect) to open the connection.
    pub fn new(
        endpoint: impl Into<String>,
        options: RealtimeLinkOptions,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        Self::with_connector(endpoint, options, tokens, Arc::new(WsConnector))
    }

    /// Creates a link over a caller-supplied [`Connector`].
    pub fn with_connector(
        endpoint: impl Into<String>,
        options: RealtimeLinkOptions,
        tokens: Arc<dyn TokenProvider>,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        let endpoint = Url::parse(&endpoint.into())?;

        let budget = RetryBudget::new(
            options
                .max_reconnect_attempts
                .unwrap_or(MAX_RECONNECT_ATTEMPTS),
            Duration::from_millis(options.reconnect_delay.unwrap_or(RECONNECT_DELAY)),
        );

        Ok(Self {
            inner: Arc::new(LinkInner {
                endpoint,
                heartbeat_interval: Duration::from_millis(
                    options.heartbeat_interval.unwrap_or(HEARTBEAT_INTERVAL),
                ),
                tokens,
                connector,
                registry: EventRegistry::new(),
                shared: RwLock::new(LinkShared {
                    state: LinkState::Idle,
                    budget,
                    outbound: None,
                    pump_task: None,
                    heartbeat_task: None,
                    retry_task: None,
                }),
            }),
        })
    }

    pub(crate) fn from_inner(inner: Arc<LinkInner>) -> Self {
        Self { inner }
    }

    /// Registers a subscriber for an event name. See
    /// [`EventRegistry::on`](crate::EventRegistry::on).
    pub fn on(&self, event: impl Into<String>, handler: EventHandler) {
        self.inner.registry.on(event, handler);
    }

    /// Removes one registration of `handler` for `event`, matched by
    /// identity.
    pub fn off(&self, event: &str, handler: &EventHandler) {
        self.inner.registry.off(event, handler);
    }

    /// Removes every subscriber for `event`.
    pub fn off_all(&self, event: &str) {
        self.inner.registry.off_all(event);
    }

    /// Opens the connection.
    ///
    /// No-op if already `Connecting` or `Connected`. Reads the current
    /// credential through the injected provider; if none is available the
    /// attempt is skipped with a logged warning and no state change. An
    /// explicit call from `Idle` or `Failed` starts a fresh retry budget.
    ///
    /// Connection trouble never surfaces here: failures drive the
    /// reconnection policy and become registry notifications under the
    /// reserved lifecycle event names.
    pub fn connect(&self) -> BoxFuture<'static, ()> {
        // Boxed at this boundary: the retry timer re-enters connect(), and
        // the recursion must go through an erased future type.
        let link = self.clone();
        Box::pin(async move { link.connect_impl().await })
    }

    async fn connect_impl(&self) {
        {
            let mut shared = self.inner.shared.write().await;
            match shared.state {
                LinkState::Connecting | LinkState::Connected => return,
                // Explicit call from a settled state; retry-driven calls
                // arrive in Reconnecting and keep their attempt count.
                LinkState::Idle | LinkState::Failed => shared.budget.reset(),
                LinkState::Reconnecting => {}
            }
            // Proceeding pre-empts any pending retry timer; a retry-driven
            // call has already cleared its own slot.
            if let Some(task) = shared.retry_task.take() {
                task.abort();
            }
        }

        let Some(token) = self.inner.tokens.token() else {
            tracing::warn!("No credential available, skipping connection attempt");
            return;
        };

        self.inner.shared.write().await.state = LinkState::Connecting;

        let url = self.build_url(&token);
        tracing::info!("Connecting to {}", self.inner.endpoint);

        match self.inner.connector.connect(&url).await {
            Ok(handle) => self.install(handle).await,
            Err(e) => {
                tracing::warn!("Connection attempt failed: {}", e);
                self.handle_failure().await;
            }
        }
    }

    /// Tears the connection down and goes back to `Idle`.
    ///
    /// Cancels the heartbeat, any pending retry timer, and the inbound
    /// pump, then drops the transport handle (which closes the socket).
    /// A local disconnect never triggers reconnection. Safe to call from
    /// any state; no-op when already idle.
    pub async fn disconnect(&self) {
        let mut shared = self.inner.shared.write().await;
        if shared.state == LinkState::Idle {
            return;
        }

        shared.state = LinkState::Idle;
        shared.outbound = None;

        let tasks = [
            shared.pump_task.take(),
            shared.heartbeat_task.take(),
            shared.retry_task.take(),
        ];
        for task in tasks.into_iter().flatten() {
            task.abort();
        }
        drop(shared);

        tracing::info!("Disconnected from realtime server");
    }

    /// True iff the state machine is `Connected` and the transport handle
    /// still reports an open connection.
    pub async fn is_connected(&self) -> bool {
        let shared = self.inner.shared.read().await;
        shared.state == LinkState::Connected
            && shared.outbound.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Sends a liveness probe if connected, otherwise silently ignored.
    ///
    /// Exposed for caller-driven keep-alives in addition to the internal
    /// heartbeat; probing is idempotent, so the two never conflict.
    pub async fn ping(&self) {
        let tx = {
            let shared = self.inner.shared.read().await;
            if shared.state != LinkState::Connected {
                return;
            }
            match shared.outbound.clone() {
                Some(tx) => tx,
                None => return,
            }
        };

        if tx.send(Frame::empty(PING_EVENT)).await.is_err() {
            tracing::debug!("Liveness probe dropped, transport is closing");
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> LinkState {
        self.inner.shared.read().await.state
    }

    /// Wires a freshly opened transport into the link: `Connected` state,
    /// fresh budget, inbound pump, heartbeat, and the one-time success
    /// notification.
    async fn install(&self, handle: TransportHandle) {
        let mut shared = self.inner.shared.write().await;
        if shared.state != LinkState::Connecting {
            // disconnect() raced the handshake; drop the transport unused.
            tracing::debug!("Connection established after teardown, discarding");
            return;
        }

        shared.state = LinkState::Connected;
        shared.budget.reset();
        shared.outbound = Some(handle.outbound);

        if let Some(task) = shared.pump_task.take() {
            task.abort();
        }
        let link = self.clone();
        let events = handle.events;
        shared.pump_task = Some(tokio::spawn(link.pump(events)));

        // At most one heartbeat timer may be outstanding.
        if let Some(task) = shared.heartbeat_task.take() {
            task.abort();
        }
        shared.heartbeat_task = Some(
            Heartbeat::new(Arc::downgrade(&self.inner), self.inner.heartbeat_interval).spawn(),
        );
        drop(shared);

        tracing::info!("Connected to realtime server");
        self.inner
            .registry
            .dispatch(lifecycle_events::CONNECTED, &serde_json::json!({}));
    }

    /// Routes transport events until the connection dies.
    async fn pump(self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                TransportEvent::Frame(frame) => {
                    self.inner.registry.dispatch(&frame.event, &frame.payload);
                }
                TransportEvent::Error(reason) => {
                    tracing::warn!("Transport error: {}", reason);
                    self.handle_failure().await;
                    break;
                }
                TransportEvent::Closed => {
                    tracing::warn!("Server closed the connection");
                    self.handle_failure().await;
                    break;
                }
            }
        }
        tracing::debug!("Inbound pump finished");
    }

    /// Reconnection policy, evaluated on every transport failure or remote
    /// disconnect.
    async fn handle_failure(&self) {
        let mut shared = self.inner.shared.write().await;
        match shared.state {
            // Locally disconnected or already given up: not recoverable.
            LinkState::Idle | LinkState::Failed => return,
            // A retry is already pending; overlapping failures must not
            // double-schedule.
            LinkState::Reconnecting => return,
            LinkState::Connecting | LinkState::Connected => {}
        }

        shared.outbound = None;
        if let Some(task) = shared.heartbeat_task.take() {
            task.abort();
        }
        // The pump exits on its own right after signalling the failure.
        shared.pump_task = None;

        if shared.budget.exhausted() {
            shared.state = LinkState::Failed;
            let attempts = shared.budget.attempts();
            drop(shared);

            tracing::error!(
                "Realtime connection lost and {} reconnection attempts failed, giving up",
                attempts
            );
            self.inner.registry.dispatch(
                lifecycle_events::FAILED,
                &serde_json::json!({ "attempts": attempts }),
            );
            return;
        }

        let delay = shared.budget.record_attempt();
        let attempt = shared.budget.attempts();
        shared.state = LinkState::Reconnecting;

        tracing::warn!("Reconnecting in {:?} (attempt {})", delay, attempt);

        let link = self.clone();
        shared.retry_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Clear our own slot first so connect() never aborts the task
            // that is invoking it.
            link.inner.shared.write().await.retry_task = None;
            link.connect().await;
        }));
    }

    fn build_url(&self, token: &str) -> String {
        let mut url = self.inner.endpoint.clone();
        url.query_pairs_mut().append_pair(TOKEN_QUERY_PARAM, token);
        url.to_string()
    }
}
