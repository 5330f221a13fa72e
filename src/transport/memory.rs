//! In-memory transport that records every outbound message
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::Transport;
use crate::error::Result;
use crate::node::{Message, NodeName};

#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<Message>>,
    next_msg_id: AtomicU64,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything sent so far
    pub fn take(&self) -> Vec<Message> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sent_to(&self, dest: &NodeName) -> Vec<Message> {
        self.sent()
            .into_iter()
            .filter(|m| &m.dest == dest)
            .collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, mut message: Message) -> Result<()> {
        if message.body.msg_id.is_none() {
            message.body.msg_id = Some(self.next_msg_id.fetch_add(1, Ordering::Relaxed) + 1);
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }
}
