use futures::future::BoxFuture;
use futures::sink::SinkExt;
use futures::stream::StreamExt;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::transport::{Connector, TransportEvent, TransportHandle};
use crate::types::{Frame, Result, CHANNEL_CAPACITY};

/// WebSocket transport backed by tokio-tungstenite.
///
/// Frames travel as JSON text messages. A write task drains the outbound
/// channel into the sink and closes the socket once the sender side is
/// dropped; a read task decodes inbound messages into [`TransportEvent`]s.
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<TransportHandle>> {
        let url = url.to_string();

        async move {
            let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
            let (mut write_half, mut read_half) = ws_stream.split();

            let (out_tx, mut out_rx) = mpsc::channel::<Frame>(CHANNEL_CAPACITY);
            let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(CHANNEL_CAPACITY);

            tokio::spawn(async move {
                while let Some(frame) = out_rx.recv().await {
                    let json = match serde_json::to_string(&frame) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!("Failed to encode frame '{}': {}", frame.event, e);
                            continue;
                        }
                    };
                    if let Err(e) = write_half.send(Message::Text(json.into())).await {
                        tracing::error!("WebSocket write error: {}", e);
                        break;
                    }
                }
                // Sender dropped or sink failed: close the socket.
                let _ = write_half.close().await;
                tracing::debug!("Write task finished");
            });

            tokio::spawn(async move {
                loop {
                    match read_half.next().await {
                        Some(Ok(Message::Text(text))) => match serde_json::from_str::<Frame>(&text)
                        {
                            Ok(frame) => {
                                if event_tx.send(TransportEvent::Frame(frame)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse frame: {} - Raw: {}", e, text);
                            }
                        },
                        Some(Ok(Message::Close(close_frame))) => {
                            if let Some(frame) = close_frame {
                                tracing::warn!(
                                    "Server closed connection: code={:?}, reason='{}'",
                                    frame.code,
                                    frame.reason
                                );
                            } else {
                                tracing::warn!("Server closed connection without close frame");
                            }
                            let _ = event_tx.send(TransportEvent::Closed).await;
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            tracing::debug!("Received ping ({} bytes)", data.len());
                        }
                        Some(Ok(Message::Pong(data))) => {
                            tracing::debug!("Received pong ({} bytes)", data.len());
                        }
                        Some(Ok(Message::Binary(data))) => {
                            tracing::warn!(
                                "Received unexpected binary message ({} bytes)",
                                data.len()
                            );
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            tracing::error!("WebSocket read error: {}", e);
                            let _ = event_tx.send(TransportEvent::Error(e.to_string())).await;
                            break;
                        }
                        None => {
                            tracing::warn!("WebSocket stream ended");
                            let _ = event_tx.send(TransportEvent::Closed).await;
                            break;
                        }
                    }
                }
                tracing::debug!("Read task finished");
            });

            Ok(TransportHandle {
                outbound: out_tx,
                events: event_rx,
            })
        }
        .boxed()
    }
}
