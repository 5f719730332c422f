//! WebSocket relay: every frame a client sends is fanned out to all
//! connected clients, the sender included.

use actix_web::{get, web, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures_util::StreamExt;
use tokio::sync::broadcast;

use crate::interfaces::http::{add_log, HttpState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    Text(String),
    Binary(Vec<u8>),
}

pub fn relay_channel(capacity: usize) -> broadcast::Sender<RelayFrame> {
    let (tx, _) = broadcast::channel(capacity);
    tx
}

/// Next frame for one listener. A listener that fell behind skips what it
/// missed and carries on; `None` once the channel is closed.
pub async fn next_relayed(rx: &mut broadcast::Receiver<RelayFrame>) -> Option<RelayFrame> {
    loop {
        match rx.recv().await {
            Ok(frame) => return Some(frame),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Relay listener lagged, skipping messages");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

#[get("/ws")]
pub async fn relay(
    req: HttpRequest,
    body: web::Payload,
    data: web::Data<HttpState>,
) -> actix_web::Result<HttpResponse> {
    let (response, session, mut inbound) = actix_ws::handle(&req, body)?;

    let relay_tx = data.relay.clone();
    let mut relay_rx = relay_tx.subscribe();
    let peer = req
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!(peer = %peer, listeners = relay_tx.receiver_count(), "WebSocket connected");
    add_log(&data.logs, "INFO", "Relay", &format!("Client connected: {}", peer));

    // Outbound: relay channel -> this client.
    let mut outbound = session.clone();
    let forwarder = actix_web::rt::spawn(async move {
        while let Some(frame) = next_relayed(&mut relay_rx).await {
            let sent = match frame {
                RelayFrame::Text(text) => outbound.text(text).await,
                RelayFrame::Binary(bytes) => outbound.binary(bytes).await,
            };
            if sent.is_err() {
                break;
            }
        }
    });

    // Inbound: this client -> relay channel.
    let mut session = session;
    let logs = data.logs.clone();
    actix_web::rt::spawn(async move {
        while let Some(Ok(msg)) = inbound.next().await {
            match msg {
                Message::Text(text) => {
                    // No listeners is not an error for a relay.
                    let _ = relay_tx.send(RelayFrame::Text(text.to_string()));
                }
                Message::Binary(bytes) => {
                    let _ = relay_tx.send(RelayFrame::Binary(bytes.to_vec()));
                }
                Message::Ping(bytes) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Message::Close(reason) => {
                    tracing::debug!(?reason, "WebSocket closing");
                    break;
                }
                _ => {}
            }
        }

        forwarder.abort();
        let _ = session.close(None).await;
        tracing::info!(peer = %peer, "WebSocket disconnected");
        add_log(&logs, "INFO", "Relay", &format!("Client disconnected: {}", peer));
    });

    Ok(response)
}
