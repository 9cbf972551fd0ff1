//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::bridge::Navigator;
use crate::core::action::Effect;
use crate::core::state::NavigationState;
use crate::render::{RenderError, Renderer};

/// A renderer that remembers every effect it was given.
#[derive(Default)]
pub struct RecordingRenderer {
    effects: Mutex<Vec<Effect>>,
}

impl RecordingRenderer {
    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().clone()
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    fn name(&self) -> &str {
        "recording"
    }

    async fn apply(&self, effect: Effect) -> Result<(), RenderError> {
        self.effects.lock().push(effect);
        Ok(())
    }
}

/// Creates a Navigator over empty state, plus the receiving end of its
/// effect channel.
pub fn test_navigator() -> (Navigator, UnboundedReceiver<Effect>) {
    Navigator::new(NavigationState::default())
}

/// Drains whatever effects are queued right now.
pub fn drain(effects: &mut UnboundedReceiver<Effect>) -> Vec<Effect> {
    let mut drained = Vec::new();
    while let Ok(effect) = effects.try_recv() {
        drained.push(effect);
    }
    drained
}

/// `setRoot` payload for a stack `main` holding one view `home`.
pub fn main_stack_root() -> Value {
    json!({
        "component": {
            "type": "stack",
            "id": "main",
            "stack": [{ "type": "view", "id": "home", "path": "/home" }]
        }
    })
}
