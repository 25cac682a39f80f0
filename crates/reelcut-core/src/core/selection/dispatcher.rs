//! Classification Dispatch
//!
//! Fans windows out to the classifier with bounded concurrency and unions the
//! per-window answers. The batch fails fast: the first window error cancels
//! every task still in flight.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::response::parse_indices;
use super::{ClassificationContext, Classifier, SelectionIndexSet, Window, WindowRequest};
use crate::core::{CoreError, CoreResult, Cue};

/// Bounded-concurrency fan-out of windows to a [`Classifier`]
#[derive(Clone)]
pub struct ClassificationDispatcher {
    classifier: Arc<dyn Classifier>,
    max_workers: usize,
}

impl ClassificationDispatcher {
    /// Creates a dispatcher allowing at most `max_workers` in-flight calls
    pub fn new(classifier: Arc<dyn Classifier>, max_workers: usize) -> Self {
        Self {
            classifier,
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Classifies every window and returns the union of in-range indices.
    ///
    /// Windows may complete in any order; the result does not depend on it.
    pub async fn dispatch(
        &self,
        cues: &[Cue],
        windows: &[Window],
        context: &ClassificationContext,
    ) -> CoreResult<SelectionIndexSet> {
        if windows.is_empty() {
            return Ok(SelectionIndexSet::default());
        }

        let permits = self.max_workers.min(windows.len());
        let semaphore = Arc::new(Semaphore::new(permits));
        let context = Arc::new(context.clone());
        let total_windows = windows.len();

        info!(
            windows = total_windows,
            workers = permits,
            cues = cues.len(),
            "Dispatching classification"
        );

        let mut tasks = JoinSet::new();
        for window in windows {
            let request = WindowRequest::new(*window, total_windows, cues);
            let classifier = Arc::clone(&self.classifier);
            let semaphore = Arc::clone(&semaphore);
            let context = Arc::clone(&context);

            tasks.spawn(async move {
                let ordinal = request.window.ordinal;
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| CoreError::Internal(format!("worker pool closed: {}", e)))?;

                let raw = classifier
                    .classify(&request, &context)
                    .await
                    .map_err(|e| e.in_window(ordinal))?;
                let indices = parse_indices(&raw).map_err(|e| e.in_window(ordinal))?;

                debug!(window = ordinal, selected = indices.len(), "Window classified");
                Ok::<_, CoreError>(indices)
            });
        }

        let mut collected: Vec<i64> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(CoreError::Internal(format!(
                    "classification task panicked: {}",
                    e
                ))),
            };

            match outcome {
                Ok(indices) => collected.extend(indices),
                Err(e) => {
                    warn!(
                        window = ?e.window(),
                        error = %e,
                        "Window classification failed, cancelling remaining windows"
                    );
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        let raw_count = collected.len();
        let selection = SelectionIndexSet::from_raw(collected.iter().copied(), cues.len());
        let out_of_range = collected
            .iter()
            .filter(|&&i| i < 0 || i as u64 >= cues.len() as u64)
            .count();
        if out_of_range > 0 {
            warn!(
                dropped = out_of_range,
                cue_count = cues.len(),
                "Dropped out-of-range classifier indices"
            );
        }

        debug!(
            returned = raw_count,
            unique = selection.len(),
            "Classification complete"
        );
        Ok(selection)
    }
}
