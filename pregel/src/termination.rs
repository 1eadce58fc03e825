use crate::errors::PregelError;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cooperatively polled cancellation signal, shared by cloning.
///
/// A run checks the flag before every superstep and stops with
/// [`PregelError::Terminated`] once it has been raised.
#[derive(Debug, Clone, Default)]
pub struct TerminationFlag {
    terminated: Arc<AtomicBool>,
}

impl TerminationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
    }

    pub fn running(&self) -> bool {
        !self.terminated.load(Ordering::Acquire)
    }

    pub fn assert_running(&self) -> Result<(), PregelError> {
        if self.running() {
            Ok(())
        } else {
            Err(PregelError::Terminated)
        }
    }
}
