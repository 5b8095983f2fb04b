//! In-memory duplex connection used to drive actors and the messenger in tests.

use crate::error::TransportError;
use crate::message::GuestMessage;
use crate::transport::{DuplexConnection, FrameReader, FrameWriter, Inbound};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// What the server wrote, as observed by the peer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WireFrame {
    Text(String),
    Ping,
    Close,
}

/// What the peer sends back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PeerFrame {
    Message,
    Close,
    Error,
}

/// Failure switches and teardown observations shared by both ends.
#[derive(Debug, Default)]
pub(crate) struct MockState {
    fail_pings: AtomicBool,
    fail_writes: AtomicBool,
    stall_writes: AtomicBool,
    handle_closed: AtomicBool,
    reader_dropped: AtomicBool,
    in_write: AtomicBool,
    overlapping_writes: AtomicBool,
}

impl MockState {
    pub(crate) fn fail_pings(&self, fail: bool) {
        self.fail_pings.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn stall_writes(&self, stall: bool) {
        self.stall_writes.store(stall, Ordering::SeqCst);
    }

    pub(crate) fn handle_closed(&self) -> bool {
        self.handle_closed.load(Ordering::SeqCst)
    }

    pub(crate) fn reader_dropped(&self) -> bool {
        self.reader_dropped.load(Ordering::SeqCst)
    }

    pub(crate) fn saw_overlapping_writes(&self) -> bool {
        self.overlapping_writes.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockConnection {
    writer: MockWriter,
    reader: MockReader,
}

pub(crate) struct MockWriter {
    frames: mpsc::UnboundedSender<WireFrame>,
    state: Arc<MockState>,
}

pub(crate) struct MockReader {
    inbound: mpsc::UnboundedReceiver<PeerFrame>,
    state: Arc<MockState>,
}

/// The remote end of a `MockConnection`.
pub(crate) struct MockPeer {
    frames: mpsc::UnboundedReceiver<WireFrame>,
    inbound: mpsc::UnboundedSender<PeerFrame>,
    pub(crate) state: Arc<MockState>,
}

pub(crate) fn mock_connection() -> (MockConnection, MockPeer) {
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let state = Arc::new(MockState::default());

    let connection = MockConnection {
        writer: MockWriter {
            frames: frames_tx,
            state: Arc::clone(&state),
        },
        reader: MockReader {
            inbound: inbound_rx,
            state: Arc::clone(&state),
        },
    };
    let peer = MockPeer {
        frames: frames_rx,
        inbound: inbound_tx,
        state,
    };

    (connection, peer)
}

impl DuplexConnection for MockConnection {
    type Writer = MockWriter;
    type Reader = MockReader;

    fn split(self) -> (MockWriter, MockReader) {
        (self.writer, self.reader)
    }
}

impl MockWriter {
    fn push(&self, frame: WireFrame) -> Result<(), TransportError> {
        if self.state.handle_closed() {
            return Err("write on closed handle".into());
        }
        self.frames
            .send(frame)
            .map_err(|_| TransportError::from("peer went away"))
    }
}

#[async_trait]
impl FrameWriter for MockWriter {
    async fn write_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.state.in_write.swap(true, Ordering::SeqCst) {
            self.state.overlapping_writes.store(true, Ordering::SeqCst);
        }
        if self.state.stall_writes.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        // Give any would-be concurrent writer a chance to run mid-write.
        tokio::task::yield_now().await;

        let result = if self.state.fail_writes.load(Ordering::SeqCst) {
            Err("write failed".into())
        } else {
            self.push(WireFrame::Text(text))
        };
        self.state.in_write.store(false, Ordering::SeqCst);
        result
    }

    async fn write_ping(&mut self) -> Result<(), TransportError> {
        if self.state.fail_pings.load(Ordering::SeqCst) {
            return Err("ping failed".into());
        }
        self.push(WireFrame::Ping)
    }

    async fn write_close(&mut self) -> Result<(), TransportError> {
        self.push(WireFrame::Close)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.state.handle_closed.swap(true, Ordering::SeqCst) {
            return Err("handle closed twice".into());
        }
        Ok(())
    }
}

#[async_trait]
impl FrameReader for MockReader {
    async fn read(&mut self) -> Result<Inbound, TransportError> {
        match self.inbound.recv().await {
            Some(PeerFrame::Message) => Ok(Inbound::Frame),
            Some(PeerFrame::Close) | None => Ok(Inbound::Closed),
            Some(PeerFrame::Error) => Err("protocol violation".into()),
        }
    }
}

impl Drop for MockReader {
    fn drop(&mut self) {
        self.state.reader_dropped.store(true, Ordering::SeqCst);
    }
}

impl MockPeer {
    pub(crate) fn send(&self, frame: PeerFrame) {
        let _ = self.inbound.send(frame);
    }

    pub(crate) async fn next_frame(&mut self) -> Option<WireFrame> {
        self.frames.recv().await
    }

    /// Next application message, skipping heartbeats. `None` once closed.
    pub(crate) async fn next_message(&mut self) -> Option<GuestMessage> {
        loop {
            match self.frames.recv().await? {
                WireFrame::Text(text) => {
                    return Some(serde_json::from_str(&text).expect("wire frame is a GuestMessage"))
                }
                WireFrame::Ping => continue,
                WireFrame::Close => return None,
            }
        }
    }

    /// Application messages already written, without waiting.
    pub(crate) fn received_messages(&mut self) -> Vec<GuestMessage> {
        let mut messages = Vec::new();
        while let Ok(frame) = self.frames.try_recv() {
            if let WireFrame::Text(text) = frame {
                messages.push(serde_json::from_str(&text).expect("wire frame is a GuestMessage"));
            }
        }
        messages
    }

    /// Every frame already written, in wire order, without waiting.
    pub(crate) fn written_frames(&mut self) -> Vec<WireFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.frames.try_recv() {
            frames.push(frame);
        }
        frames
    }
}
