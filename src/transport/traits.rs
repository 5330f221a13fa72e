//! Transport traits for the node's outbound side
//!
//! Handlers never talk to stdout directly; they hand finished messages to a
//! `Transport`, which lets the same node logic run against the stdio
//! runtime or an in-memory recorder.

use async_trait::async_trait;

use crate::error::Result;
use crate::node::Message;

/// Trait for sending messages to peers and clients
#[async_trait]
pub trait Transport: Send + Sync {
    /// Queue a message for delivery to `message.dest`.
    ///
    /// Implementations assign a fresh `msg_id` when the body has none.
    async fn send(&self, message: Message) -> Result<()>;
}
