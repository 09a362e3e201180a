use tokio::time::Duration;
use tokio::time::Instant;

/// Single resettable deadline coalescing bursts of registry changes.
///
/// At most one deadline is outstanding; `reset` replaces it with
/// `now + quiet_period` instead of accumulating.
#[derive(Clone, Debug)]
pub struct DebounceTimer {
    next_deadline: Option<Instant>,
    quiet_period: Duration,
}

impl DebounceTimer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            next_deadline: None,
            quiet_period,
        }
    }

    /// Arms the timer, discarding any countdown in flight
    pub fn reset(&mut self) {
        self.next_deadline = Some(Instant::now() + self.quiet_period);
    }

    pub fn disarm(&mut self) {
        self.next_deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_deadline.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Time left before firing; `None` when disarmed
    pub fn remaining(&self) -> Option<Duration> {
        self.next_deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.next_deadline, Some(deadline) if deadline <= Instant::now())
    }
}
