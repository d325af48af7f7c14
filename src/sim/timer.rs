/// Timer values over a virtual millisecond clock.
///
/// Timers never call back into anything. The owner asks `due_at()`, decides
/// what to run, then reports back with `fire()`. Disarming or dropping the
/// owner is all it takes to cancel.

pub type Millis = u64;

/// Fixed-period repeating timer with two states: stopped and running.
#[derive(Clone, Debug)]
pub struct RepeatingTimer {
    period: Millis,
    next_due: Option<Millis>,
}

impl RepeatingTimer {
    pub fn new(period: Millis) -> Self {
        RepeatingTimer { period, next_due: None }
    }

    /// stopped -> running; first firing one period after `now`.
    /// Returns false (and changes nothing) if already running.
    pub fn start(&mut self, now: Millis) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now + self.period);
        true
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn due_at(&self) -> Option<Millis> {
        self.next_due
    }

    /// Consume the current firing and schedule the next one a period later.
    pub fn fire(&mut self) {
        if let Some(t) = self.next_due {
            self.next_due = Some(t + self.period);
        }
    }

    /// Drop any backlog: next firing one period after `now`.
    pub fn rebase(&mut self, now: Millis) {
        if self.next_due.is_some() {
            self.next_due = Some(now + self.period);
        }
    }
}

/// Single outstanding delayed action.
#[derive(Clone, Debug, Default)]
pub struct OneShotTimer {
    due: Option<Millis>,
}

impl OneShotTimer {
    /// Cancel-and-reschedule.
    pub fn arm(&mut self, at: Millis) {
        self.due = Some(at);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due_at(&self) -> Option<Millis> {
        self.due
    }
}
