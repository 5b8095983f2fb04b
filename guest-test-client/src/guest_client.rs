use anyhow::Result;
use futures_util::stream::StreamExt;
use log::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub content: Value,
    pub timestamp: Instant,
}

#[derive(Debug)]
enum Received {
    Notification(Notification),
    Closed,
}

/// A guest's WebSocket connection, read on a background task.
pub struct Connection {
    pub guest_label: String,
    received_rx: mpsc::UnboundedReceiver<Received>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(base_url: &str, guest_id: &str, guest_label: String) -> Result<Self> {
        let ws_base = base_url
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        let url = format!("{}/guests/{}/ws", ws_base, guest_id);
        let (mut socket, _) = connect_async(url).await?;
        let (tx, rx) = mpsc::unbounded_channel();

        let label = guest_label.clone();
        let handle = tokio::spawn(async move {
            // Reading also answers the server's heartbeat pings.
            while let Some(frame) = socket.next().await {
                let received = match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                        Ok(json) => Received::Notification(Notification {
                            title: json["title"].as_str().unwrap_or_default().to_string(),
                            content: json["content"].clone(),
                            timestamp: Instant::now(),
                        }),
                        Err(e) => {
                            warn!("Unparseable frame for {}: {}", label, e);
                            continue;
                        }
                    },
                    Ok(Message::Close(_)) => Received::Closed,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", label, e);
                        Received::Closed
                    }
                };

                let closed = matches!(received, Received::Closed);
                if tx.send(received).is_err() || closed {
                    debug!("Stopped reading for {}", label);
                    break;
                }
            }
        });

        Ok(Self {
            guest_label,
            received_rx: rx,
            _handle: handle,
        })
    }

    pub async fn wait_for_notification(
        &mut self,
        title: &str,
        timeout: Duration,
    ) -> Result<Notification> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("Timeout waiting for notification: {}", title);
            }

            match tokio::time::timeout(remaining, self.received_rx.recv()).await {
                Ok(Some(Received::Notification(n))) if n.title == title => return Ok(n),
                Ok(Some(Received::Notification(_))) => continue,
                Ok(Some(Received::Closed)) | Ok(None) => {
                    anyhow::bail!("Connection closed");
                }
                Err(_) => {
                    anyhow::bail!("Timeout waiting for notification: {}", title);
                }
            }
        }
    }

    pub async fn wait_for_close(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.received_rx.recv()).await {
                Ok(Some(Received::Closed)) | Ok(None) => return Ok(()),
                Ok(Some(Received::Notification(_))) => continue,
                Err(_) => anyhow::bail!("Timeout waiting for {} to be closed", self.guest_label),
            }
        }
    }
}
