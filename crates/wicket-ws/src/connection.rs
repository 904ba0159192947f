//! Per-connection handler: read the hello, attach the socket as the
//! window's channel, then pump frames both ways.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use wicket_common::{ChannelError, WindowId};
use wicket_core::{Bridge, InboundFrame, OutboundFrame, Transport};

use crate::protocol::{ClientHello, ServerReply};
use crate::server::peer_allowed;

/// Outbound half of a socket, as seen by the bridge. Frames are queued to
/// the connection task, which owns the sink.
struct WsTransport {
    tx: mpsc::UnboundedSender<Message>,
}

impl Transport for WsTransport {
    fn send(&self, frame: &OutboundFrame) -> Result<(), ChannelError> {
        self.tx
            .send(Message::Text(frame.to_json().into()))
            .map_err(|_| ChannelError::Closed)
    }

    fn close(&self) {
        let _ = self.tx.send(Message::Close(None));
    }
}

/// Handle a single WebSocket connection, plain or TLS.
pub async fn handle_connection<S>(ws: WebSocketStream<S>, addr: SocketAddr, bridge: Bridge)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = ws.split();

    // 1. Read the hello to learn which window this socket belongs to.
    let Some((window, token)) = read_hello(&mut stream, addr).await else {
        return;
    };

    if !peer_allowed(&bridge, window, addr) {
        tracing::warn!(peer = %addr, window = %window, "Remote peer refused for private window");
        let _ = send_reply(
            &mut sink,
            &ServerReply::Error {
                message: "window is not public".into(),
            },
        )
        .await;
        let _ = sink.send(Message::Close(None)).await;
        return;
    }

    // 2. Attach as the window's channel.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let transport = Arc::new(WsTransport { tx });
    let inbound = match bridge.attach_channel(window, &token, transport) {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!(peer = %addr, window = %window, error = %e, "Channel rejected");
            let _ = send_reply(
                &mut sink,
                &ServerReply::Error {
                    message: e.to_string(),
                },
            )
            .await;
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
    };

    tracing::info!(peer = %addr, window = %window, "Browser connected");
    if inbound.deliver(InboundFrame::Connected).is_err() {
        return;
    }

    // 3. Forwarding loop.
    loop {
        tokio::select! {
            // Frames from the bridge -> this browser
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                let closing = matches!(msg, Message::Close(_));
                if sink.send(msg).await.is_err() || closing {
                    break;
                }
            }

            // Frames from this browser -> the bridge
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if inbound.deliver_json(&text).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // 4. Cleanup.
    tracing::info!(peer = %addr, window = %window, "Browser disconnected");
    let _ = inbound.deliver(InboundFrame::Disconnected);
}

/// Read and parse the first message as a hello.
async fn read_hello<S>(
    stream: &mut SplitStream<WebSocketStream<S>>,
    addr: SocketAddr,
) -> Option<(WindowId, String)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Wait up to 10 seconds for the hello message.
    let frame = tokio::time::timeout(std::time::Duration::from_secs(10), stream.next()).await;

    match frame {
        Ok(Some(Ok(Message::Text(text)))) => match serde_json::from_str::<ClientHello>(&text) {
            Ok(ClientHello::Hello { window, token }) => Some((window, token)),
            Err(e) => {
                tracing::warn!(peer = %addr, error = %e, "Invalid hello message");
                None
            }
        },
        Ok(Some(Ok(_))) => {
            tracing::warn!(peer = %addr, "Expected text hello, got binary");
            None
        }
        Ok(Some(Err(e))) => {
            tracing::warn!(peer = %addr, error = %e, "WS error during hello");
            None
        }
        Ok(None) => {
            tracing::debug!(peer = %addr, "Connection closed before hello");
            None
        }
        Err(_) => {
            tracing::warn!(peer = %addr, "Hello timeout (10s)");
            None
        }
    }
}

/// Send a reply as a JSON text frame.
async fn send_reply<S>(
    sink: &mut SplitSink<WebSocketStream<S>, Message>,
    reply: &ServerReply,
) -> Result<(), tokio_tungstenite::tungstenite::Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let json = serde_json::to_string(reply).unwrap_or_default();
    sink.send(Message::Text(json.into())).await
}
