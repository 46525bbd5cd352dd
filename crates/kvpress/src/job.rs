use crate::{Command, CompletionLatch};
use std::sync::Arc;

/// A single unit of work: one command plus the latch of the batch it belongs
/// to.
///
/// Jobs are immutable once built and are consumed by exactly one worker,
/// which must call [`Job::complete`] after the execution attempt regardless
/// of its outcome.
#[derive(Debug)]
pub struct Job {
    command: Command,
    completion: Arc<CompletionLatch>,
}

impl Job {
    pub const fn new(command: Command, completion: Arc<CompletionLatch>) -> Self {
        Self {
            command,
            completion,
        }
    }

    pub const fn command(&self) -> &Command {
        &self.command
    }

    /// Signals the batch latch. Consumes the job so it cannot be signalled
    /// twice.
    pub fn complete(self) {
        self.completion.count_down();
    }
}
