//! Connection actor: the single-writer execution unit owning one live guest
//! connection.
//!
//! Each actor runs two tasks:
//!
//! - **Write loop**: the only context allowed to write to the connection. It
//!   consumes delivery tasks from the actor's task channel and sends a
//!   heartbeat ping on a fixed interval. Every write is bounded by the write
//!   deadline; a failed or timed out write is fatal to the actor.
//! - **Read loop**: exists only to notice that the peer went away. Inbound
//!   content is discarded. It owns the deregistration callback and invokes it
//!   on its single exit path.
//!
//! The write loop ends when the task channel closes (the registry dropped its
//! entry) or a write fails. It then releases the connection and signals the
//! read loop, so both loops always terminate together.

use crate::connection::{ConnectionId, GuestId};
use crate::error::{Error, ErrorKind, Result};
use crate::message::DeliveryTask;
use crate::transport::{DuplexConnection, FrameReader, FrameWriter, Inbound};
use log::*;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(54);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(60);

/// Timing parameters shared by every actor a messenger spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    heartbeat_interval: Duration,
    write_timeout: Duration,
    liveness_timeout: Duration,
}

impl ConnectionSettings {
    /// The heartbeat must fire before the peer is considered dead, so
    /// `heartbeat_interval` has to be shorter than `liveness_timeout`.
    pub fn new(
        heartbeat_interval: Duration,
        write_timeout: Duration,
        liveness_timeout: Duration,
    ) -> Result<Self> {
        if heartbeat_interval.is_zero() || write_timeout.is_zero() {
            return Err(Error::with_source(
                ErrorKind::Config,
                "heartbeat interval and write timeout must be non-zero",
            ));
        }
        if heartbeat_interval >= liveness_timeout {
            return Err(Error::with_source(
                ErrorKind::Config,
                format!(
                    "heartbeat interval ({heartbeat_interval:?}) must be shorter than the liveness timeout ({liveness_timeout:?})"
                ),
            ));
        }

        Ok(Self {
            heartbeat_interval,
            write_timeout,
            liveness_timeout,
        })
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    pub fn liveness_timeout(&self) -> Duration {
        self.liveness_timeout
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
        }
    }
}

/// Removes the actor's entry from the registry. Consumed by the read loop.
pub(crate) type Deregister = Box<dyn FnOnce() + Send + 'static>;

/// Registry-side handle to a running actor.
///
/// The task sender stored here is the only sender for the actor's task
/// channel, so dropping the handle is what tells the actor to shut down.
pub(crate) struct ConnectionHandle {
    pub(crate) id: ConnectionId,
    pub(crate) tasks: mpsc::UnboundedSender<DeliveryTask>,
    pub(crate) writer: JoinHandle<()>,
    pub(crate) reader: JoinHandle<()>,
}

impl ConnectionHandle {
    /// Closes the task channel and waits for both loops to exit.
    pub(crate) async fn close_and_wait(self) {
        let ConnectionHandle {
            tasks,
            writer,
            reader,
            ..
        } = self;
        drop(tasks);

        for (name, loop_handle) in [("write", writer), ("read", reader)] {
            if let Err(e) = loop_handle.await {
                warn!("Guest connection {name} loop ended abnormally: {e}");
            }
        }
    }
}

/// Splits the connection and spawns both loops.
pub(crate) fn spawn<C: DuplexConnection>(
    guest_id: GuestId,
    id: ConnectionId,
    connection: C,
    settings: ConnectionSettings,
    deregister: Deregister,
) -> ConnectionHandle {
    let (writer, reader) = connection.split();
    let (tasks, task_rx) = mpsc::unbounded_channel();
    let (writer_done_tx, writer_done_rx) = oneshot::channel();

    let writer = tokio::spawn(write_loop(
        guest_id.clone(),
        writer,
        task_rx,
        settings,
        writer_done_tx,
    ));
    let reader = tokio::spawn(read_loop(
        guest_id,
        reader,
        settings.liveness_timeout,
        writer_done_rx,
        deregister,
    ));

    ConnectionHandle {
        id,
        tasks,
        writer,
        reader,
    }
}

async fn write_loop<W: FrameWriter>(
    guest_id: GuestId,
    mut writer: W,
    mut tasks: mpsc::UnboundedReceiver<DeliveryTask>,
    settings: ConnectionSettings,
    writer_done: oneshot::Sender<()>,
) {
    let mut heartbeat = time::interval_at(
        Instant::now() + settings.heartbeat_interval,
        settings.heartbeat_interval,
    );
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            task = tasks.recv() => match task {
                Some(task) => {
                    let outcome = deliver(&mut writer, &task, settings.write_timeout).await;
                    let fatal = matches!(&outcome, Err(e) if e.is_fatal());
                    if let Err(e) = &outcome {
                        warn!("Failed to deliver message to guest {guest_id}: {e}");
                    }
                    task.respond(outcome);
                    if fatal {
                        break;
                    }
                }
                None => {
                    debug!("Task channel closed for guest {guest_id}, sending close frame");
                    if let Err(e) = with_deadline(settings.write_timeout, writer.write_close()).await {
                        debug!("Close frame to guest {guest_id} not delivered: {e}");
                    }
                    break;
                }
            },
            _ = heartbeat.tick() => {
                trace!("Sending heartbeat to guest {guest_id}");
                if let Err(e) = with_deadline(settings.write_timeout, writer.write_ping()).await {
                    warn!("Heartbeat to guest {guest_id} failed, closing connection: {e}");
                    break;
                }
            }
        }
    }

    drop(heartbeat);
    // Anything still queued is dropped; each waiting caller sees its reply slot close.
    drop(tasks);

    if let Err(e) = with_deadline(settings.write_timeout, writer.close()).await {
        debug!("Closing connection for guest {guest_id} reported: {e}");
    }
    drop(writer_done);
    info!("Guest {guest_id} connection writer stopped");
}

async fn deliver<W: FrameWriter>(
    writer: &mut W,
    task: &DeliveryTask,
    write_timeout: Duration,
) -> Result<()> {
    let frame = task.frame();
    trace!("Writing \"{}\" ({} bytes)", task.title(), frame.len());
    with_deadline(write_timeout, writer.write_text(frame.to_owned())).await
}

async fn with_deadline<F>(deadline: Duration, write: F) -> Result<()>
where
    F: Future<Output = core::result::Result<(), crate::error::TransportError>>,
{
    match time::timeout(deadline, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Error::transport(e)),
        Err(elapsed) => Err(Error::with_source(ErrorKind::WriteTimeout, elapsed)),
    }
}

async fn read_loop<R: FrameReader>(
    guest_id: GuestId,
    mut reader: R,
    liveness_timeout: Duration,
    mut writer_done: oneshot::Receiver<()>,
    deregister: Deregister,
) {
    loop {
        tokio::select! {
            _ = &mut writer_done => {
                debug!("Writer for guest {guest_id} stopped, ending read loop");
                break;
            }
            read = time::timeout(liveness_timeout, reader.read()) => match read {
                Ok(Ok(Inbound::Frame)) => continue,
                Ok(Ok(Inbound::Closed)) => {
                    info!("Guest {guest_id} closed the connection");
                    break;
                }
                Ok(Err(e)) => {
                    warn!("Read error on guest {guest_id} connection: {e}");
                    break;
                }
                Err(_) => {
                    warn!("Guest {guest_id} silent for {liveness_timeout:?}, presuming connection dead");
                    break;
                }
            }
        }
    }

    drop(reader);
    deregister();
}
