//! Bounded worker pool for per-file processing.
//!
//! The producer enumerates tasks into a bounded channel; workers pull, run
//! the per-file closure, and push outcomes through a second bounded channel
//! to the collecting caller. Backpressure on both channels caps memory: the
//! producer blocks when workers lag, workers block when the collector lags.
//!
//! With one worker the pool degenerates to a deterministic sequential loop,
//! which is the supported mode for reproducible tests.

use crossbeam_channel::bounded;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Cooperative cancellation flag shared between the driver and its caller.
///
/// Workers check the token between files, never mid-file. Cancelling twice
/// is the same as cancelling once.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Channel capacity per worker; keeps the walker ahead without unbounded
/// buffering.
const QUEUE_FACTOR: usize = 2;

/// Run `process` over `tasks` with `workers` threads, collecting outcomes.
///
/// Outcome order is unspecified in parallel mode; the caller sorts. Tasks
/// skipped due to cancellation simply produce no outcome.
pub fn run_tasks<T, R>(
    tasks: Vec<T>,
    workers: usize,
    cancel: &CancelToken,
    process: impl Fn(T) -> R + Sync,
) -> Vec<R>
where
    T: Send,
    R: Send,
{
    if workers <= 1 {
        let mut out = Vec::with_capacity(tasks.len());
        for task in tasks {
            if cancel.is_cancelled() {
                break;
            }
            out.push(process(task));
        }
        return out;
    }

    let capacity = workers * QUEUE_FACTOR;
    let (task_tx, task_rx) = bounded::<T>(capacity);
    let (result_tx, result_rx) = bounded::<R>(capacity);
    let process = &process;

    std::thread::scope(|scope| {
        scope.spawn(move || {
            for task in tasks {
                if cancel.is_cancelled() {
                    debug!("producer stopping: cancelled");
                    break;
                }
                if task_tx.send(task).is_err() {
                    break;
                }
            }
            // Dropping the sender closes the task channel.
        });

        for _ in 0..workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let outcome = process(task);
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
        drop(task_rx);
        drop(result_tx);

        let mut out = Vec::new();
        while let Ok(outcome) = result_rx.recv() {
            out.push(outcome);
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_mode_preserves_order() {
        let cancel = CancelToken::new();
        let out = run_tasks(vec![1, 2, 3, 4], 1, &cancel, |n| n * 10);
        assert_eq!(out, vec![10, 20, 30, 40]);
    }

    #[test]
    fn parallel_mode_processes_everything() {
        let cancel = CancelToken::new();
        let mut out = run_tasks((0..100).collect(), 4, &cancel, |n: i32| n + 1);
        out.sort();
        assert_eq!(out, (1..=100).collect::<Vec<_>>());
    }

    #[test]
    fn cancelled_token_stops_before_work_starts() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let out = run_tasks(vec![1, 2, 3], 1, &cancel, |n| n);
        assert!(out.is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let cancel = CancelToken::new();
        cancel.cancel();
        cancel.cancel();
        assert!(cancel.is_cancelled());
    }
}
