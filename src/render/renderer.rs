use std::fmt;

use async_trait::async_trait;

use crate::core::action::Effect;

/// Errors a renderer can report. They are logged by the worker and never
/// undo the navigation change that produced the effect.
#[derive(Debug)]
pub enum RenderError {
    /// The renderer could not carry out the effect (e.g. unknown view path).
    Rejected { effect: &'static str, reason: String },
    /// The downstream channel was closed. Not retryable.
    ChannelClosed,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Rejected { effect, reason } => {
                write!(f, "{effect} rejected: {reason}")
            }
            RenderError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for RenderError {}

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the name of the renderer.
    fn name(&self) -> &str;

    /// Carries out one effect. Called sequentially, in commit order.
    async fn apply(&self, effect: Effect) -> Result<(), RenderError>;
}
