//! Bounded fan-out for asynchronous per-document work
//!
//! At most `concurrency` tasks hold a permit at once. An optional batch
//! deadline cancels whatever has not finished; those slots come back as
//! failures so the caller can count them as zero.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    pub concurrency: usize,
    pub deadline: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFailure {
    #[error("cancelled: batch deadline elapsed")]
    DeadlineElapsed,
    #[error("task panicked")]
    Panicked,
}

/// Run every task with bounded concurrency. Results come back in input order.
pub async fn run_bounded<F>(
    tasks: Vec<F>,
    options: PoolOptions,
) -> Vec<Result<F::Output, TaskFailure>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let count = tasks.len();
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut set = JoinSet::new();
    for (index, task) in tasks.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        set.spawn(async move {
            // Never closed, so this always yields a permit
            let _permit = semaphore.acquire_owned().await;
            (index, task.await)
        });
    }

    let mut slots: Vec<Option<F::Output>> = (0..count).map(|_| None).collect();
    let deadline = options.deadline.map(|d| Instant::now() + d);
    let mut deadline_elapsed = false;
    loop {
        let next = match deadline {
            Some(at) => match tokio::time::timeout_at(at, set.join_next()).await {
                Ok(next) => next,
                Err(_) => {
                    deadline_elapsed = true;
                    set.abort_all();
                    tracing::warn!(
                        pending = set.len(),
                        "corpus batch deadline elapsed; cancelling remaining documents"
                    );
                    break;
                }
            },
            None => set.join_next().await,
        };
        match next {
            None => break,
            Some(Ok((index, output))) => slots[index] = Some(output),
            Some(Err(e)) => tracing::warn!(error = %e, "corpus task failed"),
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.ok_or(if deadline_elapsed {
                TaskFailure::DeadlineElapsed
            } else {
                TaskFailure::Panicked
            })
        })
        .collect()
}
