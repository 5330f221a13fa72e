//! Line-delimited JSON over stdin/stdout
//!
//! One reader task decodes inbound lines into `Message`s and feeds a channel;
//! one writer task drains the outbound channel, writing each message on its
//! own line. Only protocol messages ever reach stdout.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::Transport;
use crate::error::Result;
use crate::node::Message;
use crate::transport_error;

/// Counters for the stdio transport
#[derive(Debug, Default)]
pub struct TransportStats {
    pub messages_received: AtomicU64,
    pub messages_sent: AtomicU64,
    pub decode_errors: AtomicU64,
}

/// Point-in-time copy of `TransportStats`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrozenTransportStats {
    pub messages_received: u64,
    pub messages_sent: u64,
    pub decode_errors: u64,
}

impl TransportStats {
    pub fn freeze(&self) -> FrozenTransportStats {
        FrozenTransportStats {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}

/// Outbound half: stamps message ids and queues messages for the writer task
#[derive(Debug)]
pub struct StdioTransport {
    outbound_tx: mpsc::Sender<Message>,
    next_msg_id: AtomicU64,
    stats: Arc<TransportStats>,
}

impl StdioTransport {
    pub fn new(buffer: usize, stats: Arc<TransportStats>) -> (Self, mpsc::Receiver<Message>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer);
        let transport = Self {
            outbound_tx,
            next_msg_id: AtomicU64::new(0),
            stats,
        };
        (transport, outbound_rx)
    }

    fn next_msg_id(&self) -> u64 {
        self.next_msg_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn send(&self, mut message: Message) -> Result<()> {
        if message.body.msg_id.is_none() {
            message.body.msg_id = Some(self.next_msg_id());
        }
        self.outbound_tx
            .send(message)
            .await
            .map_err(|e| transport_error!("outbound channel closed, dropping message to {}", e.0.dest))
    }
}

/// Decode inbound lines until EOF or until the receiving side goes away
pub async fn read_messages<R>(
    mut reader: R,
    inbound_tx: mpsc::Sender<Message>,
    stats: Arc<TransportStats>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }
        // bytes, not str: a line that is not UTF-8 is just another bad line
        match serde_json::from_slice::<Message>(line) {
            Ok(message) => {
                stats.messages_received.fetch_add(1, Ordering::Relaxed);
                if inbound_tx.send(message).await.is_err() {
                    debug!("Inbound channel closed, stopping reader");
                    break;
                }
            }
            Err(e) => {
                // no envelope means no sender to answer
                stats.decode_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Dropping undecodable input line: {}", e);
            }
        }
    }
    debug!("Input closed");
    Ok(())
}

/// Write every queued message as one JSON line, flushing after each
pub async fn write_messages<W>(
    mut outbound_rx: mpsc::Receiver<Message>,
    mut writer: W,
    stats: Arc<TransportStats>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound_rx.recv().await {
        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        stats.messages_sent.fetch_add(1, Ordering::Relaxed);
    }
    writer.shutdown().await?;
    Ok(())
}
