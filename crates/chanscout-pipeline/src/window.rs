//! Wall-clock budget for a single run.

use std::time::{Duration, Instant};

/// Deadline value created once per run and passed to every stage.
///
/// Stages check [`ExecutionWindow::is_expired`] at the top of each loop that
/// could issue another call and return what they have when it trips.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionWindow {
    started: Instant,
    budget: Duration,
}

impl ExecutionWindow {
    /// Starts the clock now.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.budget
    }
}
