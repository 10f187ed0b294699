//! Parallel layout of independent requests.
//!
//! Each request gets its own blocking task. Controllers share no mutable state,
//! so the only shared value is the `Arc` around the controller itself.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::compression::attempt::{LayoutRequest, LayoutResult};
use crate::compression::controller::CompressionController;
use crate::errors::LayoutError;
use crate::layout::Renderer;

/// Lays out every request concurrently. Results come back in request order.
///
/// `timeout` becomes each request's time budget, replacing the configured one.
/// A request that runs out of time falls through to the terminal and minimal
/// passes, the same as one that runs out of attempts.
pub async fn layout_batch<R>(
    controller: Arc<CompressionController<R>>,
    requests: Vec<LayoutRequest>,
    timeout: Option<Duration>,
) -> Vec<Result<LayoutResult, LayoutError>>
where
    R: Renderer + 'static,
{
    let budget = timeout.or_else(|| controller.config().time_budget());
    info!(
        requests = requests.len(),
        budget_ms = budget.map(|b| b.as_millis() as u64),
        "Starting layout batch"
    );

    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let controller = Arc::clone(&controller);
            let span = tracing::Span::current();
            // CPU-bound: rendering and measuring must stay off the async executor.
            tokio::task::spawn_blocking(move || {
                span.in_scope(|| controller.layout_with_budget(&request, budget))
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        results.push(handle.await.unwrap_or_else(|e| {
            Err(LayoutError::Internal(anyhow::anyhow!(
                "spawn_blocking failed in layout {index}: {e}"
            )))
        }));
    }
    results
}
