use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    BroadcastRequest, Disseminator, IdGenerator, InitRequest, Message, NodeName, Reply, Request,
};
use crate::error::{MurmurError, Result};
use crate::settings;
use crate::transport::Transport;

/// An initialised cluster member: routes each request to the value store,
/// the id generator or the disseminator and sends exactly one reply.
pub struct BroadcastNode {
    name: NodeName,
    ids: IdGenerator,
    disseminator: Disseminator,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for BroadcastNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastNode")
            .field("name", &self.name)
            .field("peers", &self.disseminator.peers().len())
            .field("fanout_mode", &self.disseminator.mode())
            .field("values", &self.disseminator.store().len())
            .field("id_counter", &self.ids.current())
            .finish()
    }
}

impl BroadcastNode {
    pub fn new(
        init: InitRequest,
        settings: &settings::Settings,
        transport: Arc<dyn Transport>,
    ) -> Self {
        info!(
            "[{}] Initialized with {} cluster members ({} fanout)",
            init.node_id,
            init.node_ids.len(),
            settings.fanout_mode
        );
        Self {
            ids: IdGenerator::new(settings.id_separator.clone()),
            disseminator: Disseminator::new(
                init.node_id.clone(),
                init.node_ids,
                settings.fanout_mode,
            ),
            name: init.node_id,
            transport,
        }
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn disseminator(&self) -> &Disseminator {
        &self.disseminator
    }

    /// Handle one inbound message, replying to it unless it is itself a reply
    pub async fn handle(&self, message: Message) -> Result<()> {
        if message.body.is_reply() {
            debug!(
                "[{}] Absorbing {} from {}",
                self.name, message.body.kind, message.src
            );
            return Ok(());
        }

        let outcome = match Request::decode(&message.body) {
            Ok(request) => self.handle_request(&message.src, request).await,
            Err(e) => Err(e),
        };
        let reply = outcome.unwrap_or_else(|e| {
            warn!(
                "[{}] {} from {} failed ({}): {}",
                self.name,
                message.body.kind,
                message.src,
                e.error_type(),
                e
            );
            Reply::from(&e)
        });
        self.transport.send(Message::reply_to(&message, reply)).await
    }

    pub async fn handle_request(&self, src: &NodeName, request: Request) -> Result<Reply> {
        match request {
            Request::Init(init) => Err(MurmurError::PreconditionFailed(format!(
                "node already initialized as {}, refusing re-init as {}",
                self.name, init.node_id
            ))),
            Request::Echo(payload) => Ok(Reply::EchoOk { payload }),
            Request::Generate => Ok(Reply::GenerateOk {
                id: self.ids.next_global_id(&self.name),
            }),
            Request::Broadcast(BroadcastRequest { message }) => {
                self.disseminator
                    .disseminate(message, src, self.transport.as_ref())
                    .await;
                Ok(Reply::BroadcastOk)
            }
            Request::Read => Ok(Reply::ReadOk {
                messages: self.disseminator.store().snapshot(),
            }),
            Request::Topology(topology) => {
                let version = self.disseminator.update_topology(topology.topology);
                debug!("[{}] Topology updated to version {}", self.name, version);
                Ok(Reply::TopologyOk)
            }
        }
    }
}
