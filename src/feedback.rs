//! User-visible feedback for mutations.
//!
//! The original UI showed a spinner for a fixed delay before an add or
//! edit "completed", then a success toast. That is cosmetic, so it lives
//! behind an injectable hook: the console implementation can sleep and
//! print, tests and one-shot mode use the silent no-op. Nothing here may
//! affect data-model behavior.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

pub trait Feedback {
    /// Announce that a mutation is in flight (e.g. "Adding user...").
    fn working(&self, label: &str);

    /// Announce a completed mutation.
    fn success(&self, message: &str);

    /// The simulated latency between `working` and the commit.
    fn pause(&self);
}

/// Prints to stdout and sleeps for the configured latency.
pub struct ConsoleFeedback {
    delay_ms: u64,
}

impl ConsoleFeedback {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Feedback for ConsoleFeedback {
    fn working(&self, label: &str) {
        if self.delay_ms > 0 {
            print!("{}... ", label);
            io::stdout().flush().ok();
        }
    }

    fn success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn pause(&self) {
        if self.delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.delay_ms));
        }
    }
}

/// No output, no sleeping. Used by tests and `-c` one-shot mode where the
/// caller prints its own result.
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn working(&self, _label: &str) {}
    fn success(&self, _message: &str) {}
    fn pause(&self) {}
}
