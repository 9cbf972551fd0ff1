//! # Core Navigation Logic
//!
//! This module owns the navigation hierarchy and every rule about how it
//! may change. It knows nothing about transports or native views.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • schema (validation)  │
//!                    │  • state (hierarchy)    │
//!                    │  • update() (commit)    │
//!                    │                         │
//!                    │  No I/O. Emits effects. │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │   Bridge   │      │  Renderer  │      │   Tests    │
//!     │ dispatcher │      │  (effects) │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`]: component specs, options, command parameters and results
//! - [`schema`]: turns untyped payloads into those types, or says which field is wrong
//! - [`registry`]: every live component, ids, and the retain policy
//! - [`state`]: the root, the modal stack, and the navigation operations
//! - [`action`]: the `Action` enum and the atomic `update()`
//! - [`config`]: `~/.nativenav/config.toml`
//! - [`error`]: the error taxonomy shared by all of the above

pub mod action;
pub mod config;
pub mod error;
pub mod registry;
pub mod schema;
pub mod state;
pub mod types;

pub use action::{Action, Effect, Outcome, Transition, update};
pub use error::{ErrorKind, NavigationError};
pub use state::NavigationState;
