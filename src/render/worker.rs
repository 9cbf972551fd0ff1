use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::core::action::Effect;
use crate::render::Renderer;

/// Feeds committed effects to `renderer` until the sending side is gone.
///
/// Effects are applied one at a time so the renderer sees them in commit
/// order. A failed effect is logged and skipped.
pub fn spawn_render_worker(
    renderer: Arc<dyn Renderer>,
    mut effects: UnboundedReceiver<Effect>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("Render worker started with {} renderer", renderer.name());
        while let Some(effect) = effects.recv().await {
            let target = effect.component_id().map(str::to_string);
            if let Err(e) = renderer.apply(effect).await {
                warn!(
                    "{} renderer failed on {}: {e}",
                    renderer.name(),
                    target.as_deref().unwrap_or("<none>")
                );
            }
        }
        debug!("Render worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;
    use crate::test_support::RecordingRenderer;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct FailingRenderer;

    #[async_trait]
    impl Renderer for FailingRenderer {
        fn name(&self) -> &str {
            "failing"
        }

        async fn apply(&self, _effect: Effect) -> Result<(), RenderError> {
            Err(RenderError::Rejected {
                effect: "any",
                reason: "always".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_worker_applies_in_order_and_stops() {
        let renderer = Arc::new(RecordingRenderer::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_render_worker(renderer.clone(), rx);

        tx.send(Effect::Retain { id: "a".into() }).unwrap();
        tx.send(Effect::Destroy { id: "b".into() }).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(
            renderer.effects(),
            vec![Effect::Retain { id: "a".into() }, Effect::Destroy { id: "b".into() }]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_recording_renderer_shared_across_workers() {
        let renderer = Arc::new(RecordingRenderer::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let (tx, rx) = mpsc::unbounded_channel();
                let handle = spawn_render_worker(renderer.clone(), rx);
                for n in 0..25 {
                    tx.send(Effect::Destroy { id: format!("w{i}-{n}") }).unwrap();
                }
                handle
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(renderer.effects().len(), 100);
    }

    #[tokio::test]
    async fn test_worker_survives_render_failures() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_render_worker(Arc::new(FailingRenderer), rx);
        tx.send(Effect::Destroy { id: "x".into() }).unwrap();
        tx.send(Effect::Destroy { id: "y".into() }).unwrap();
        drop(tx);
        assert!(handle.await.is_ok());
    }
}
