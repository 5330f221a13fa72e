//! Transport Module
//!
//! Moves node-protocol messages in and out of the process. The production
//! transport speaks line-delimited JSON over stdin/stdout; the in-memory
//! transport records outbound messages for tests and embedding.

pub mod memory;
pub mod stdio;
pub mod traits;

pub use memory::MemoryTransport;
pub use stdio::{read_messages, write_messages, FrozenTransportStats, StdioTransport, TransportStats};
pub use traits::Transport;
