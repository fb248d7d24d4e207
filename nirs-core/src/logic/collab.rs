//! Bounded collaborator calls
//!
//! Collaborators are plain synchronous traits. Anything that may block runs on
//! the blocking pool under a deadline; on expiry the result is discarded and
//! `CollaboratorTimeout` is returned. `run_bounded_each` applies the deadline
//! to every call of a sequence rather than to the sequence as a whole.

use std::time::Duration;

use tokio::sync::mpsc;

use super::error::{Collaborator, PipelineError, PipelineResult};

fn aborted(collaborator: Collaborator) -> PipelineError {
    match collaborator {
        Collaborator::Signer => PipelineError::Signing("record signing failed".to_string()),
        other => PipelineError::CollaboratorFailed(other),
    }
}

fn timed_out(collaborator: Collaborator, timeout: Duration) -> PipelineError {
    let timeout_ms = timeout.as_millis() as u64;
    log::warn!("{} exceeded {} ms bound", collaborator, timeout_ms);
    PipelineError::CollaboratorTimeout { collaborator, timeout_ms }
}

pub(crate) async fn run_bounded<T, F>(
    collaborator: Collaborator,
    timeout: Duration,
    work: F,
) -> PipelineResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_err)) => {
            log::error!("{} task aborted: {}", collaborator, join_err);
            Err(aborted(collaborator))
        }
        Err(_) => Err(timed_out(collaborator, timeout)),
    }
}

/// Maps `items` through `work` on one blocking task, bounding each call.
///
/// Stops at the first `Err`. When a call overruns, the remaining items are
/// never started: the worker notices the dropped receiver on its next send.
pub(crate) async fn run_bounded_each<I, T, F>(
    collaborator: Collaborator,
    timeout: Duration,
    items: Vec<I>,
    work: F,
) -> PipelineResult<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> PipelineResult<T> + Send + 'static,
{
    let expected = items.len();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let worker = tokio::task::spawn_blocking(move || {
        for item in items {
            let out = work(item);
            let stop = out.is_err();
            if tx.send(out).is_err() || stop {
                break;
            }
        }
    });

    let mut results = Vec::with_capacity(expected);
    while results.len() < expected {
        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(Ok(value))) => results.push(value),
            Ok(Some(Err(e))) => return Err(e),
            Ok(None) => {
                // Sender dropped early: the worker panicked
                if let Err(join_err) = worker.await {
                    log::error!("{} task aborted: {}", collaborator, join_err);
                }
                return Err(aborted(collaborator));
            }
            Err(_) => return Err(timed_out(collaborator, timeout)),
        }
    }
    Ok(results)
}
