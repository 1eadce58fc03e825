//! Reporting how far a run has got.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

pub trait ProgressTracker: Send + Sync {
    fn begin_subtask(&self, description: &str);

    /// Called by workers with the number of nodes they just finished.
    fn log_progress(&self, nodes: usize);

    fn end_subtask(&self, description: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressTracker;

impl ProgressTracker for NullProgressTracker {
    fn begin_subtask(&self, _description: &str) {}

    fn log_progress(&self, _nodes: usize) {}

    fn end_subtask(&self, _description: &str) {}
}

/// Logs subtask boundaries and every completed quarter of a subtask with `tracing`.
#[derive(Debug)]
pub struct TracingProgressTracker {
    task_name: String,
    volume: usize,
    processed: AtomicUsize,
    logged_quarters: AtomicUsize,
    subtask: Mutex<String>,
}

impl TracingProgressTracker {
    /// `volume` is the number of nodes processed by one subtask.
    pub fn new(task_name: impl Into<String>, volume: usize) -> Self {
        Self {
            task_name: task_name.into(),
            volume,
            processed: AtomicUsize::new(0),
            logged_quarters: AtomicUsize::new(0),
            subtask: Mutex::new(String::new()),
        }
    }

    /// Nodes processed in the current subtask.
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }
}

impl ProgressTracker for TracingProgressTracker {
    fn begin_subtask(&self, description: &str) {
        self.processed.store(0, Ordering::Relaxed);
        self.logged_quarters.store(0, Ordering::Relaxed);
        *self.subtask.lock() = description.to_owned();
        info!("{} :: {} :: Start", self.task_name, description);
    }

    fn log_progress(&self, nodes: usize) {
        if self.volume == 0 {
            return;
        }
        let processed = self.processed.fetch_add(nodes, Ordering::Relaxed) + nodes;
        let quarters = (processed.min(self.volume) * 4) / self.volume;
        let previous = self.logged_quarters.fetch_max(quarters, Ordering::Relaxed);
        if quarters > previous {
            let subtask = self.subtask.lock();
            info!("{} :: {} {}%", self.task_name, subtask, quarters * 25);
        }
    }

    fn end_subtask(&self, description: &str) {
        info!("{} :: {} :: Finished", self.task_name, description);
    }
}
