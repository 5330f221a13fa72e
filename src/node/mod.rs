//! Broadcast node
//!
//! A cluster member that floods integer values to its peers, hands out
//! cluster-unique ids, and answers reads of every value it has seen.
pub mod broadcast_node;
pub mod controller;
pub mod dissemination;
pub mod id_generator;
pub mod messages;
pub mod node_id;
pub mod topology;
pub mod value_store;

pub use broadcast_node::BroadcastNode;
pub use controller::{run, NodeController};
pub use dissemination::Disseminator;
pub use id_generator::IdGenerator;
pub use messages::{
    Body, BroadcastRequest, InitRequest, Message, Reply, Request, TopologyRequest,
};
pub use node_id::NodeName;
pub use topology::Topology;
pub use value_store::{Value, ValueStore};
