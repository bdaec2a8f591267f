//! Wait behaviors and polling options.

use bitflags::bitflags;
use std::time::Duration;

bitflags! {
    /// How [`wait_results`](super::SessionService::wait_results) decides to
    /// return before everything is resolved.
    ///
    /// The empty set, [`WaitBehavior::ALL`], waits for every task.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WaitBehavior: u32 {
        /// Return as soon as one awaited task is resolved
        const ANY = 1;
        /// Return as soon as one awaited task fails
        const BREAK_ON_ERROR = 1 << 1;
    }
}

impl WaitBehavior {
    /// Wait until every awaited task is resolved
    pub const ALL: Self = Self::empty();
}

/// Polling parameters of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Pause between two status polls
    pub polling: Duration,
    /// Give up after this long, leaving unresolved tasks tracked
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl WaitOptions {
    pub const DEFAULT: Self = Self {
        polling: Duration::from_millis(500),
        timeout: None,
    };

    pub fn with_polling(mut self, polling: Duration) -> Self {
        self.polling = polling;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
