//! Renderer that only writes effects to the log. Used when nothing on the
//! other side wants render events.

use async_trait::async_trait;
use log::info;

use crate::core::action::Effect;
use crate::render::{RenderError, Renderer};

#[derive(Debug, Default)]
pub struct LogRenderer;

#[async_trait]
impl Renderer for LogRenderer {
    fn name(&self) -> &str {
        "log"
    }

    async fn apply(&self, effect: Effect) -> Result<(), RenderError> {
        match &effect {
            Effect::Mount { component } => {
                info!("mount {} {}", component.component_type, component.id)
            }
            Effect::Update {
                component,
                animated,
            } => info!("update {} (animated: {animated})", component.id),
            Effect::SetRoot { id, animated } => match id {
                Some(id) => info!("set root {id} (animated: {animated})"),
                None => info!("clear root"),
            },
            Effect::Present {
                id,
                style,
                animated,
            } => info!("present {id} as {style:?} (animated: {animated})"),
            Effect::Dismiss { id, animated } => info!("dismiss {id} (animated: {animated})"),
            Effect::Retain { id } => info!("retain {id} off-screen"),
            Effect::Destroy { id } => info!("destroy {id}"),
        }
        Ok(())
    }
}
