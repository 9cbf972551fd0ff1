//! # Bridge
//!
//! Everything between a caller and the core: command routing, the wire
//! shapes of results and errors, and a JSON-lines transport.
//!
//! ```text
//! {"call", "command", "payload"} ──▶ transport ──▶ Navigator::handle
//!                                                      │
//!        {"call", "result"|"error"} ◀──────────────────┘
//! ```

pub mod dispatcher;
pub mod transport;
pub mod wire;

pub use dispatcher::Navigator;
pub use wire::{CommandResult, ErrorPayload};
