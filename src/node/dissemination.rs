use std::collections::HashMap;

use tracing::{debug, warn};

use super::{Body, Message, NodeName, Topology, Value, ValueStore};
use crate::settings::FanoutMode;
use crate::transport::Transport;

/// Flood dissemination of broadcast values.
///
/// A value moves from unknown to known exactly once per node, on whichever
/// `broadcast` (from a client or a peer) inserts it first. Only that call
/// fans the value out; every later delivery is absorbed by the store.
#[derive(Debug)]
pub struct Disseminator {
    node: NodeName,
    peers: Vec<NodeName>,
    mode: FanoutMode,
    store: ValueStore,
    topology: Topology,
}

impl Disseminator {
    pub fn new(node: NodeName, peers: Vec<NodeName>, mode: FanoutMode) -> Self {
        Self {
            node,
            peers,
            mode,
            store: ValueStore::new(),
            topology: Topology::new(),
        }
    }

    /// Every cluster member named at init, self included
    pub fn peers(&self) -> &[NodeName] {
        &self.peers
    }

    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn mode(&self) -> FanoutMode {
        self.mode
    }

    pub fn update_topology(&self, neighbours: HashMap<NodeName, Vec<NodeName>>) -> u64 {
        self.topology.replace(neighbours)
    }

    /// Record `value`; if it is new, return the peers it must be forwarded to
    pub fn accept(&self, value: Value, sender: &NodeName) -> Option<Vec<NodeName>> {
        if self.store.insert(value) {
            Some(self.fanout_targets(sender))
        } else {
            None
        }
    }

    /// Peers to forward to, never including self or the sender
    pub fn fanout_targets(&self, sender: &NodeName) -> Vec<NodeName> {
        let candidates = match self.mode {
            FanoutMode::Flood => self.peers.clone(),
            FanoutMode::Topology => self
                .topology
                .neighbours_of(&self.node)
                .unwrap_or_else(|| self.peers.clone()),
        };
        candidates
            .into_iter()
            .filter(|peer| peer != &self.node && peer != sender)
            .collect()
    }

    /// Accept `value` and, if it was new, send it on to every target.
    ///
    /// Sends are best effort: failures are logged and not retried. Returns
    /// whether the value was new.
    pub async fn disseminate<T>(&self, value: Value, sender: &NodeName, transport: &T) -> bool
    where
        T: Transport + ?Sized,
    {
        let Some(targets) = self.accept(value, sender) else {
            debug!("[{}] Already have {}, not forwarding", self.node, value);
            return false;
        };
        debug!(
            "[{}] New value {} from {} {}, forwarding to {} peers",
            self.node,
            value,
            if sender.is_client() { "client" } else { "peer" },
            sender,
            targets.len()
        );
        for peer in targets {
            let gossip = Message::new(self.node.clone(), peer, Body::broadcast(value));
            let dest = gossip.dest.clone();
            if let Err(e) = transport.send(gossip).await {
                warn!("[{}] Failed to forward {} to {}: {}", self.node, value, dest, e);
            }
        }
        true
    }
}
