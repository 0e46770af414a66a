//! Single-flight guard for reconciliation passes.
//!
//! At most one pass is in flight.  Requests that arrive while a pass is
//! running collapse into a single trailing pass, however many there are.

/// Where the scheduler is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassState {
    /// No pass in flight.
    #[default]
    Idle,
    /// A pass is in flight and nothing has happened since it started.
    Running,
    /// A pass is in flight and at least one request arrived meanwhile.
    RunningDirty,
}

#[derive(Debug, Default)]
pub struct PassScheduler {
    state: PassState,
    coalesced: u64,
}

impl PassScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PassState::Idle
    }

    /// Number of requests absorbed by an in-flight pass so far.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Ask for a pass.  Returns `true` when the caller must start one now.
    pub fn request(&mut self) -> bool {
        match self.state {
            PassState::Idle => {
                self.state = PassState::Running;
                true
            }
            PassState::Running | PassState::RunningDirty => {
                self.state = PassState::RunningDirty;
                self.coalesced += 1;
                false
            }
        }
    }

    /// Report that the in-flight pass completed (successfully or not).
    /// Returns `true` when a trailing pass must start now; the scheduler
    /// then stays in [`PassState::Running`].
    pub fn finish(&mut self) -> bool {
        match self.state {
            PassState::RunningDirty => {
                self.state = PassState::Running;
                true
            }
            PassState::Running | PassState::Idle => {
                self.state = PassState::Idle;
                false
            }
        }
    }

    /// Forget any in-flight pass, e.g. after the worker went away.
    pub fn reset(&mut self) {
        self.state = PassState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_starts_a_pass() {
        let mut s = PassScheduler::new();
        assert!(s.is_idle());
        assert!(s.request());
        assert_eq!(s.state(), PassState::Running);
    }

    #[test]
    fn finish_without_new_requests_goes_idle() {
        let mut s = PassScheduler::new();
        s.request();
        assert!(!s.finish());
        assert!(s.is_idle());
    }

    #[test]
    fn burst_coalesces_into_one_trailing_pass() {
        let mut s = PassScheduler::new();
        assert!(s.request());
        for _ in 0..10 {
            assert!(!s.request());
        }
        assert_eq!(s.state(), PassState::RunningDirty);
        assert_eq!(s.coalesced(), 10);

        // One trailing pass, then idle.
        assert!(s.finish());
        assert_eq!(s.state(), PassState::Running);
        assert!(!s.finish());
        assert!(s.is_idle());
    }

    #[test]
    fn spurious_finish_is_harmless() {
        let mut s = PassScheduler::new();
        assert!(!s.finish());
        assert!(s.is_idle());
    }

    #[test]
    fn reset_allows_a_new_pass() {
        let mut s = PassScheduler::new();
        s.request();
        s.request();
        s.reset();
        assert!(s.request());
    }
}
