//! # Rendering
//!
//! The core only produces `Effect`s. Whatever owns the native views
//! implements [`Renderer`] and receives them here, one at a time, in the
//! order they were committed.
//!
//! ```text
//! Navigator ──(unbounded mpsc)──▶ render worker ──▶ Renderer::apply
//! ```

pub mod renderer;
pub mod renderers;
pub mod worker;

pub use renderer::{RenderError, Renderer};
pub use renderers::{ChannelRenderer, LogRenderer};
pub use worker::spawn_render_worker;
