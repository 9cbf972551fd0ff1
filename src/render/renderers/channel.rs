//! Renderer that forwards effects to an mpsc channel. The host on the other
//! end decides what to do with them (the CLI prints them as event lines).

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::action::Effect;
use crate::render::{RenderError, Renderer};

pub struct ChannelRenderer {
    sender: Sender<Effect>,
}

impl ChannelRenderer {
    pub fn new(sender: Sender<Effect>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Renderer for ChannelRenderer {
    fn name(&self) -> &str {
        "channel"
    }

    async fn apply(&self, effect: Effect) -> Result<(), RenderError> {
        self.sender
            .send(effect)
            .await
            .map_err(|_| RenderError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_forwards_in_order() {
        let (tx, mut rx) = mpsc::channel(4);
        let renderer = ChannelRenderer::new(tx);
        renderer.apply(Effect::Retain { id: "a".into() }).await.unwrap();
        renderer.apply(Effect::Destroy { id: "b".into() }).await.unwrap();

        assert_eq!(rx.recv().await, Some(Effect::Retain { id: "a".into() }));
        assert_eq!(rx.recv().await, Some(Effect::Destroy { id: "b".into() }));
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let err = ChannelRenderer::new(tx)
            .apply(Effect::Destroy { id: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::ChannelClosed));
    }
}
