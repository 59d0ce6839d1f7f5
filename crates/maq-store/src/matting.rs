//! Background-removal gateway.
//!
//! Wraps the local matting model (an opaque, long-running load +
//! inference call) behind a staged progress stream. The operation is not
//! cancellable mid-flight, so there is deliberately no cancel affordance
//! here. Callers abandon interest by dropping the pending future or the
//! event receiver; late events then land in a closed channel and the
//! send results are ignored on this side.

use crate::error::InferenceError;
use tokio::sync::mpsc;

/// Progress of one removal run, in emission order:
/// `Loading` → `Processing*` → `Done` | `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum MattingEvent {
    /// Model weights are being loaded.
    Loading,
    /// Inference underway; `fraction` is in 0..=1.
    Processing { fraction: f32 },
    /// Finished; the returned bytes carry an alpha channel.
    Done,
    /// Terminal failure; the original image is untouched.
    Failed { message: String },
}

/// Capability trait for the matting model.
///
/// `infer` performs model load + inference on `image` and reports raw
/// progress fractions through `progress`. Implementations must keep
/// yielding to the executor so progress can be observed while they run.
pub trait MattingModel {
    fn infer(
        &self,
        image: Vec<u8>,
        progress: mpsc::UnboundedSender<f32>,
    ) -> impl Future<Output = Result<Vec<u8>, InferenceError>> + Send;
}

/// Stateless wrapper exposing the one removal operation.
pub struct BackgroundRemover<M: MattingModel> {
    model: M,
}

impl<M: MattingModel> BackgroundRemover<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Remove the background from `image`, emitting staged progress on
    /// `events` and returning the image with alpha.
    ///
    /// Progress sends never block (the channel is unbounded), so a slow
    /// consumer cannot stall inference.
    pub async fn remove_background(
        &self,
        image: Vec<u8>,
        events: &mpsc::UnboundedSender<MattingEvent>,
    ) -> Result<Vec<u8>, InferenceError> {
        let _ = events.send(MattingEvent::Loading);

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let infer = self.model.infer(image, progress_tx);
        tokio::pin!(infer);

        let result = loop {
            tokio::select! {
                // Forward progress as it arrives; fall through to the
                // inference result once the model drops its sender.
                maybe_fraction = progress_rx.recv() => match maybe_fraction {
                    Some(fraction) => {
                        let _ = events.send(MattingEvent::Processing {
                            fraction: fraction.clamp(0.0, 1.0),
                        });
                    }
                    None => break infer.await,
                },
                result = &mut infer => break result,
            }
        };

        // Fractions that raced completion still precede the terminal event.
        while let Ok(fraction) = progress_rx.try_recv() {
            let _ = events.send(MattingEvent::Processing {
                fraction: fraction.clamp(0.0, 1.0),
            });
        }

        match &result {
            Ok(_) => {
                let _ = events.send(MattingEvent::Done);
            }
            Err(e) => {
                log::warn!("background removal failed: {e}");
                let _ = events.send(MattingEvent::Failed {
                    message: e.to_string(),
                });
            }
        }
        result
    }
}
