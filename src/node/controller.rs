//! Process runtime: wires stdin and stdout to the node
//!
//! The controller owns the `init` handshake. Until a node exists every
//! request except `init` is answered with a temporarily-unavailable error.
//! Afterwards each inbound message is handled on its own task.
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::{BroadcastNode, Message, Reply, Request};
use crate::error::{MurmurError, Result};
use crate::settings;
use crate::transport::{self, StdioTransport, Transport, TransportStats};
use crate::transport_error;

pub struct NodeController {
    settings: settings::Settings,
    transport: Arc<dyn Transport>,
    node: Option<Arc<BroadcastNode>>,
    tasks: JoinSet<()>,
}

impl std::fmt::Debug for NodeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeController")
            .field("node", &self.node)
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}

impl NodeController {
    pub fn new(settings: settings::Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
            node: None,
            tasks: JoinSet::new(),
        }
    }

    pub fn node(&self) -> Option<&Arc<BroadcastNode>> {
        self.node.as_ref()
    }

    /// Handle messages until the inbound channel closes, then wait for
    /// in-flight handlers to finish
    pub async fn start(mut self, mut inbound_rx: mpsc::Receiver<Message>) {
        while let Some(message) = inbound_rx.recv().await {
            self.dispatch(message).await;
            while let Some(joined) = self.tasks.try_join_next() {
                log_join(joined);
            }
        }
        info!("Inbound closed, waiting on {} handlers", self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            log_join(joined);
        }
        if let Some(node) = &self.node {
            info!("Final node state: {:?}", node);
        }
    }

    pub async fn dispatch(&mut self, message: Message) {
        match &self.node {
            Some(node) => {
                let node = Arc::clone(node);
                self.tasks.spawn(async move {
                    let kind = message.body.kind.clone();
                    if let Err(e) = node.handle(message).await {
                        warn!("[{}] Could not answer {}: {}", node.name(), kind, e);
                    }
                });
            }
            None => {
                if let Err(e) = self.handle_uninitialized(message).await {
                    warn!("Could not answer pre-init message: {}", e);
                }
            }
        }
    }

    async fn handle_uninitialized(&mut self, message: Message) -> Result<()> {
        if message.body.is_reply() {
            debug!("Ignoring {} before init", message.body.kind);
            return Ok(());
        }
        let reply = match Request::decode(&message.body) {
            Ok(Request::Init(init)) => {
                let node = BroadcastNode::new(init, &self.settings, Arc::clone(&self.transport));
                self.node = Some(Arc::new(node));
                Reply::InitOk
            }
            Ok(_) => Reply::from(&MurmurError::NotInitialized),
            Err(e) => Reply::from(&e),
        };
        self.transport.send(Message::reply_to(&message, reply)).await
    }
}

fn log_join(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!("Message handler task failed: {}", e);
    }
}

/// Run a node over the given line-oriented input and output until input ends
pub async fn run<R, W>(settings: settings::Settings, reader: R, writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    settings.validate()?;

    let stats = Arc::new(TransportStats::default());
    let (stdio, outbound_rx) = StdioTransport::new(settings.outbound_buffer, Arc::clone(&stats));
    let (inbound_tx, inbound_rx) = mpsc::channel(settings.outbound_buffer);

    let writer_task = tokio::spawn(transport::write_messages(
        outbound_rx,
        writer,
        Arc::clone(&stats),
    ));
    let reader_task = tokio::spawn(transport::read_messages(
        reader,
        inbound_tx,
        Arc::clone(&stats),
    ));

    // dropping the controller drops the last outbound sender, ending the writer
    NodeController::new(settings, Arc::new(stdio))
        .start(inbound_rx)
        .await;

    let read_result = reader_task
        .await
        .map_err(|e| transport_error!("reader task failed: {}", e))?;
    let write_result = writer_task
        .await
        .map_err(|e| transport_error!("writer task failed: {}", e))?;

    let frozen = stats.freeze();
    info!(
        "Shutting down: {} received, {} sent, {} undecodable",
        frozen.messages_received, frozen.messages_sent, frozen.decode_errors
    );
    read_result.and(write_result)
}
