// WebSocket bridge to the host page.
//
// The page forwards selector `change` events as text frames and applies the
// `SET_CONTENT` updates it receives. One page connection is served at a time.

use std::fmt::Display;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

use statboard_core::page::{Page, Region};
use statboard_core::render::Html;

use crate::protocol::PageUpdate;

/// Events emitted by the bridge to the controller.
#[derive(Debug, PartialEq)]
pub enum WsEvent {
    /// A host page has connected.
    Connected { addr: String },
    /// The current host page has disconnected.
    Disconnected,
    /// A text message was received from the page (raw JSON string).
    Message(String),
}

/// How a served connection ended.
#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionEnd {
    /// The page went away; keep accepting.
    PageGone,
    /// One of the controller channels closed; stop the bridge.
    Shutdown,
}

// ---------------------------------------------------------------------------
// WsPage
// ---------------------------------------------------------------------------

/// `Page` implementation that forwards every region write to the bridge.
///
/// Writes never wait on the bridge; a full update queue drops the write.
#[derive(Debug, Clone)]
pub struct WsPage {
    tx: mpsc::Sender<PageUpdate>,
}

impl WsPage {
    pub fn new(tx: mpsc::Sender<PageUpdate>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Page for WsPage {
    async fn set_content(&mut self, region: Region, html: Html) {
        match self.tx.try_send(PageUpdate::set_content(region, html)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Bridge backlogged, dropping update for {}", region);
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Bridge closed, dropping update for {}", region);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Run the bridge on `127.0.0.1:{port}`.
///
/// Accepts one connection at a time, performs the WebSocket handshake, then
/// forwards page messages through `tx` and writes updates from `updates` to
/// the page. Updates produced while no page is connected are dropped. Returns
/// when either channel closes.
pub async fn run(
    port: u16,
    tx: mpsc::Sender<WsEvent>,
    mut updates: mpsc::Receiver<PageUpdate>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let local_addr = listener.local_addr()?;
    info!("Host bridge listening on {local_addr}");

    loop {
        let (stream, addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            update = updates.recv() => {
                match update {
                    Some(update) => {
                        debug!("No page connected, dropping update for {}", update.region());
                        continue;
                    }
                    None => break,
                }
            }
        };
        let addr_str = addr.to_string();
        info!("Accepted TCP connection from {addr_str}");

        let ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("WebSocket handshake failed for {addr_str}: {e}");
                continue;
            }
        };

        if tx
            .send(WsEvent::Connected {
                addr: addr_str.clone(),
            })
            .await
            .is_err()
        {
            break;
        }

        let (write, read) = ws_stream.split();
        let end = serve_connection(write, read, &tx, &mut updates, &addr_str).await;

        if tx.send(WsEvent::Disconnected).await.is_err() || end == ConnectionEnd::Shutdown {
            break;
        }
    }

    Ok(())
}

/// Pump one connection: page frames go to `tx`, `updates` go to the page.
///
/// Generic over the sink and stream so it can be tested with in-memory
/// values instead of sockets. Inbound frames are polled first.
pub async fn serve_connection<Si, St>(
    mut sink: Si,
    mut stream: St,
    tx: &mpsc::Sender<WsEvent>,
    updates: &mut mpsc::Receiver<PageUpdate>,
    addr: &str,
) -> ConnectionEnd
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
    St: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        tokio::select! {
            biased;

            msg_result = stream.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(WsEvent::Message(text.to_string())).await.is_err() {
                            return ConnectionEnd::Shutdown;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Page {addr} sent close frame");
                        return ConnectionEnd::PageGone;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error from {addr}: {e}");
                        return ConnectionEnd::PageGone;
                    }
                    None => return ConnectionEnd::PageGone,
                    Some(Ok(_)) => {
                        // Binary, Ping, Pong and raw frames carry nothing for us.
                    }
                }
            }

            update = updates.recv() => {
                let Some(update) = update else {
                    return ConnectionEnd::Shutdown;
                };
                let json = match serde_json::to_string(&update) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode update for {}: {e}", update.region());
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json.into())).await {
                    warn!("Failed to write to page {addr}: {e}");
                    return ConnectionEnd::PageGone;
                }
            }
        }
    }
}
