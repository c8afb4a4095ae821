use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::link::{LinkInner, RealtimeLink};

/// Issues a liveness probe on a fixed period while the connection is open.
///
/// The scheduler's sole responsibility is periodic probing (which also keeps
/// idle-timeout proxies from tearing the connection down). It does not track
/// replies or declare the connection dead: liveness failure detection is
/// left to the transport's own error/disconnect signaling.
pub(crate) struct Heartbeat {
    interval: Duration,
    link: Weak<LinkInner>,
}

impl Heartbeat {
    pub fn new(link: Weak<LinkInner>, interval: Duration) -> Self {
        Self { interval, link }
    }

    /// Spawns the recurring probe task. The link owns the returned handle
    /// and aborts it whenever the connection leaves `Connected`.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it so the first
            // probe fires one full period after the connection opened.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let link = match self.link.upgrade() {
                    Some(inner) => RealtimeLink::from_inner(inner),
                    None => break,
                };

                if !link.is_connected().await {
                    break;
                }

                link.ping().await;
            }
            tracing::debug!("Heartbeat task finished");
        })
    }
}
