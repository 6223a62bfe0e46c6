use crate::error::PipelineError;
use rayon::ThreadPoolBuilder;
use std::sync::mpsc;
use tracing::warn;

/// Outcome of one fan-out/fan-in stage. `completed` holds `(input index,
/// result)` pairs sorted by index, so result order depends only on submission
/// order, never on completion timing. Failed items are logged and excluded;
/// they never abort sibling tasks.
#[derive(Debug)]
pub struct StageOutcome<R> {
    pub completed: Vec<(usize, R)>,
    pub failed: Vec<(usize, PipelineError)>,
}

impl<R> StageOutcome<R> {
    pub fn results(self) -> Vec<R> {
        self.completed.into_iter().map(|(_, result)| result).collect()
    }
}

/// Map `task` over `items` with a bounded worker pool, preserving input
/// order. Each item is tagged with its submission index; completions arrive
/// in arbitrary order over a channel and are sorted back by tag.
pub fn map_ordered<T, R, F>(items: Vec<T>, workers: usize, stage: &str, task: F) -> StageOutcome<R>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> Result<R, PipelineError> + Send + Sync,
{
    if items.is_empty() {
        return StageOutcome {
            completed: Vec::new(),
            failed: Vec::new(),
        };
    }

    let pool = match ThreadPoolBuilder::new().num_threads(workers.max(1)).build() {
        Ok(pool) => pool,
        Err(error) => {
            warn!(stage, %error, "worker pool unavailable, running inline");
            return map_inline(items, stage, task);
        }
    };

    let (sender, receiver) = mpsc::channel();
    pool.scope(|scope| {
        for (index, item) in items.into_iter().enumerate() {
            let sender = sender.clone();
            let task = &task;
            scope.spawn(move |_| {
                let outcome = task(index, item);
                // The receiver outlives the scope; a send can only fail if it
                // was dropped, which cannot happen here.
                let _ = sender.send((index, outcome));
            });
        }
    });
    drop(sender);

    let mut completed = Vec::new();
    let mut failed = Vec::new();
    for (index, outcome) in receiver {
        match outcome {
            Ok(result) => completed.push((index, result)),
            Err(error) => {
                warn!(stage, item = index, %error, "task failed, item excluded");
                failed.push((index, error));
            }
        }
    }

    completed.sort_by_key(|(index, _)| *index);
    failed.sort_by_key(|(index, _)| *index);
    StageOutcome { completed, failed }
}

fn map_inline<T, R, F>(items: Vec<T>, stage: &str, task: F) -> StageOutcome<R>
where
    F: Fn(usize, T) -> Result<R, PipelineError>,
{
    let mut completed = Vec::new();
    let mut failed = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match task(index, item) {
            Ok(result) => completed.push((index, result)),
            Err(error) => {
                warn!(stage, item = index, %error, "task failed, item excluded");
                failed.push((index, error));
            }
        }
    }
    StageOutcome { completed, failed }
}
