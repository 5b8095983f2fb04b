//! The duplex connection contract consumed by connection actors, plus its
//! implementation for axum WebSockets.
//!
//! A connection is split into a writer half, owned by the actor's write loop,
//! and a reader half, owned by its read loop. The two halves never share an
//! operation, which is what allows the handle to be used without a lock.

use crate::error::TransportError;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

/// Outcome of a single successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Some frame arrived. Its content is not interpreted.
    Frame,
    /// The peer sent a close signal or the stream ended.
    Closed,
}

#[async_trait]
pub trait FrameWriter: Send + 'static {
    async fn write_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Liveness probe.
    async fn write_ping(&mut self) -> Result<(), TransportError>;

    async fn write_close(&mut self) -> Result<(), TransportError>;

    /// Releases the underlying handle.
    async fn close(&mut self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait FrameReader: Send + 'static {
    async fn read(&mut self) -> Result<Inbound, TransportError>;
}

pub trait DuplexConnection: Send + 'static {
    type Writer: FrameWriter;
    type Reader: FrameReader;

    fn split(self) -> (Self::Writer, Self::Reader);
}

impl DuplexConnection for WebSocket {
    type Writer = SplitSink<WebSocket, Message>;
    type Reader = SplitStream<WebSocket>;

    fn split(self) -> (Self::Writer, Self::Reader) {
        StreamExt::split(self)
    }
}

#[async_trait]
impl FrameWriter for SplitSink<WebSocket, Message> {
    async fn write_text(&mut self, text: String) -> Result<(), TransportError> {
        self.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn write_ping(&mut self) -> Result<(), TransportError> {
        self.send(Message::Ping(Vec::new())).await?;
        Ok(())
    }

    async fn write_close(&mut self) -> Result<(), TransportError> {
        self.send(Message::Close(None)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        SinkExt::close(self).await?;
        Ok(())
    }
}

#[async_trait]
impl FrameReader for SplitStream<WebSocket> {
    async fn read(&mut self) -> Result<Inbound, TransportError> {
        match self.next().await {
            Some(Ok(Message::Close(_))) | None => Ok(Inbound::Closed),
            Some(Ok(_)) => Ok(Inbound::Frame),
            Some(Err(e)) => Err(e.into()),
        }
    }
}
