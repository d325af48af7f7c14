/// Engine: owns the single mutable `EngineState` slot, the tick timer,
/// the respawn timer and the random source.
///
/// The host drives it with a monotonically increasing millisecond clock:
///
/// ```text
///   activate(now)      stopped -> running, immediate scatter + reset
///   set_heading(h)     last call before the next tick wins
///   advance(now)       fire every due tick / respawn in time order
///   deactivate()       running -> stopped, timers cancelled
///   teardown()         like deactivate, and nothing ever mutates again
/// ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::grid::Heading;
use crate::domain::snake::GrowthTiming;
use super::event::EngineEvent;
use super::lifecycle::{self, Lifecycle};
use super::state::EngineState;
use super::step;
use super::timer::{Millis, RepeatingTimer};

pub const TICK_MS: Millis = 200;

/// Ticks fired in a single `advance` before the backlog is dropped.
pub const MAX_CATCH_UP: u32 = 8;

pub struct Engine<R: Rng = StdRng> {
    state: EngineState,
    ticker: RepeatingTimer,
    lifecycle: Lifecycle,
    rng: R,
    timing: GrowthTiming,
    disposed: bool,
}

impl Engine<StdRng> {
    /// Production engine seeded from the OS.
    pub fn from_os(timing: GrowthTiming) -> Self {
        Engine::new(StdRng::from_os_rng(), timing)
    }

    /// Reproducible engine: same seed, same scatters.
    pub fn seeded(seed: u64, timing: GrowthTiming) -> Self {
        Engine::new(StdRng::seed_from_u64(seed), timing)
    }
}

impl<R: Rng> Engine<R> {
    pub fn new(rng: R, timing: GrowthTiming) -> Self {
        Engine {
            state: EngineState::idle(),
            ticker: RepeatingTimer::new(TICK_MS),
            lifecycle: Lifecycle::new(),
            rng,
            timing,
            disposed: false,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn respawn_pending(&self) -> bool {
        self.lifecycle.is_pending()
    }

    /// Start the animation with a fresh random layout.
    /// No-op while already running or after teardown.
    pub fn activate(&mut self, now: Millis) -> Option<EngineEvent> {
        if self.disposed || self.state.activated {
            return None;
        }
        let mut next = lifecycle::fresh_start(&self.state, &mut self.rng);
        next.activated = true;
        self.state = next;
        self.lifecycle.cancel();
        self.ticker.start(now);
        log::info!("engine activated at {now}ms");
        Some(EngineEvent::Activated)
    }

    /// Stop ticking and drop any pending respawn. The layout stays as it is.
    pub fn deactivate(&mut self) -> Option<EngineEvent> {
        if self.disposed || !self.state.activated {
            return None;
        }
        self.ticker.stop();
        self.lifecycle.cancel();
        let mut next = self.state.clone();
        next.activated = false;
        self.state = next;
        log::info!("engine deactivated");
        Some(EngineEvent::Deactivated)
    }

    /// Cancel every timer. After this the state is frozen for good.
    pub fn teardown(&mut self) -> Option<EngineEvent> {
        if self.disposed {
            return None;
        }
        self.ticker.stop();
        self.lifecycle.cancel();
        self.disposed = true;
        log::info!("engine torn down");
        Some(EngineEvent::TornDown)
    }

    pub fn set_heading(&mut self, heading: Heading) {
        if self.disposed || self.state.heading() == heading {
            return;
        }
        log::trace!("heading -> {heading:?}");
        self.state = self.state.with_heading(heading);
    }

    /// Run every tick and respawn due at or before `now`, in time order.
    /// A respawn due at the same instant as a tick goes first.
    pub fn advance(&mut self, now: Millis) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.disposed {
            return events;
        }

        let mut fired = 0;
        loop {
            let tick_due = self.ticker.due_at().filter(|&t| t <= now);
            let respawn_due = self.lifecycle.due_at().filter(|&t| t <= now);

            match (tick_due, respawn_due) {
                (None, None) => break,
                (Some(t), Some(r)) if t < r => self.run_tick(t, now, &mut fired, &mut events),
                (Some(t), None) => self.run_tick(t, now, &mut fired, &mut events),
                (_, Some(r)) => {
                    self.lifecycle.fire();
                    self.respawn(r, &mut events);
                }
            }
        }

        events
    }

    fn run_tick(&mut self, at: Millis, now: Millis, fired: &mut u32, events: &mut Vec<EngineEvent>) {
        if *fired == MAX_CATCH_UP {
            log::debug!("tick backlog at {now}ms, coalescing");
            self.ticker.rebase(now);
            return;
        }
        self.ticker.fire();
        *fired += 1;
        self.tick(at, events);
    }

    fn tick(&mut self, at: Millis, events: &mut Vec<EngineEvent>) {
        let (next, step_events) = step::step(&self.state, self.timing);
        self.state = next;

        for e in &step_events {
            if let EngineEvent::LetterEaten { ch, x, y, .. } = e {
                log::debug!(
                    "ate {ch:?} at ({x},{y}), {} left",
                    crate::domain::letter::remaining(&self.state.letters)
                );
            }
        }
        events.extend(step_events);

        if self.lifecycle.observe(&self.state, at) {
            log::info!("all letters eaten at {at}ms, respawn armed");
        }
    }

    fn respawn(&mut self, at: Millis, events: &mut Vec<EngineEvent>) {
        self.state = lifecycle::fresh_start(&self.state, &mut self.rng);
        log::info!("respawned at {at}ms");
        events.push(EngineEvent::Respawned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{Cell, BOARD_CENTER};
    use crate::domain::letter::{Letter, PHRASE};
    use crate::domain::snake::Snake;

    fn engine() -> Engine {
        Engine::seeded(1234, GrowthTiming::SameTick)
    }

    /// Running engine with a single letter right in front of the snake.
    fn one_bite_from_done() -> Engine {
        let mut e = engine();
        e.activate(0);
        e.state.snake = Snake::new(BOARD_CENTER, Heading::Right);
        e.state.letters = vec![Letter { ch: 'L', pos: Cell::new(10, 5), eaten: false, scattered: true }];
        e
    }

    fn count(events: &[EngineEvent], wanted: &EngineEvent) -> usize {
        events.iter().filter(|e| *e == wanted).count()
    }

    #[test]
    fn starts_idle_and_stopped() {
        let e = engine();
        assert!(!e.is_running());
        assert_eq!(e.state(), &EngineState::idle());
    }

    #[test]
    fn no_ticks_before_activation() {
        let mut e = engine();
        assert!(e.advance(10_000).is_empty());
        assert_eq!(e.state(), &EngineState::idle());
    }

    #[test]
    fn activation_scatters_and_resets() {
        let mut e = engine();
        assert_eq!(e.activate(0), Some(EngineEvent::Activated));
        let s = e.state();
        assert!(s.activated);
        assert!(e.is_running());
        assert_eq!(s.letters.len(), PHRASE.chars().count());
        assert!(s.letters.iter().all(|l| l.scattered && !l.eaten));
        assert_eq!(s.snake.segments().collect::<Vec<_>>(), vec![BOARD_CENTER]);
        assert_eq!(s.heading(), Heading::Right);
    }

    #[test]
    fn reactivation_is_noop() {
        let mut e = engine();
        e.activate(0);
        let before = e.state().clone();
        assert_eq!(e.activate(50), None);
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn seeded_engines_scatter_identically() {
        let mut a = engine();
        let mut b = engine();
        a.activate(0);
        b.activate(0);
        assert_eq!(a.state().letters, b.state().letters);
    }

    #[test]
    fn one_step_per_period() {
        let mut e = engine();
        e.activate(0);
        e.state.letters.clear();
        e.advance(199);
        assert_eq!(e.state().snake.head(), BOARD_CENTER);
        e.advance(200);
        assert_eq!(e.state().snake.head(), Cell::new(10, 5));
        e.advance(600);
        assert_eq!(e.state().snake.head(), Cell::new(12, 5));
    }

    #[test]
    fn last_heading_before_tick_wins() {
        let mut e = engine();
        e.activate(0);
        e.state.letters.clear();
        e.set_heading(Heading::Up);
        e.set_heading(Heading::Down);
        e.advance(200);
        assert_eq!(e.state().snake.head(), Cell::new(9, 6));
    }

    #[test]
    fn backlog_is_capped() {
        let mut e = engine();
        e.activate(0);
        e.state.letters.clear();
        e.set_heading(Heading::Left);
        e.advance(200 * 50);
        // Nine cells of room on the left; eight ticks ran before coalescing.
        assert_eq!(e.state().snake.head(), Cell::new(1, 5));
        e.advance(200 * 51);
        assert_eq!(e.state().snake.head(), Cell::new(0, 5));
    }

    #[test]
    fn completion_respawns_exactly_once_after_delay() {
        let mut e = one_bite_from_done();
        let events = e.advance(200);
        assert_eq!(count(&events, &EngineEvent::AllEaten), 1);
        assert!(e.respawn_pending());

        // Ticks keep running through the pause.
        let events = e.advance(1699);
        assert_eq!(count(&events, &EngineEvent::Respawned), 0);
        assert!(e.state().all_eaten());
        assert_ne!(e.state().snake.head(), Cell::new(10, 5));

        let events = e.advance(1700);
        assert_eq!(count(&events, &EngineEvent::Respawned), 1);
        assert!(!e.respawn_pending());

        let s = e.state();
        assert_eq!(s.letters.len(), PHRASE.chars().count());
        assert!(s.letters.iter().all(|l| !l.eaten));
        assert_eq!(s.snake.segments().collect::<Vec<_>>(), vec![BOARD_CENTER]);
        assert_eq!(s.heading(), Heading::Right);
        assert!(!s.growth_pending);
        assert!(s.activated);
    }

    #[test]
    fn respawn_goes_before_a_tick_at_the_same_instant() {
        let mut e = one_bite_from_done();
        e.advance(200);
        // Respawn due at 1700; align a tick with it.
        e.ticker.rebase(1500);
        let events = e.advance(1700);
        let respawn = events.iter().position(|x| *x == EngineEvent::Respawned);
        assert_eq!(respawn, Some(0));
        // The tick at 1700 moved the fresh snake off the centre.
        assert_eq!(e.state().snake.head(), Cell::new(10, 5));
    }

    #[test]
    fn teardown_during_pending_respawn_freezes_state() {
        let mut e = one_bite_from_done();
        e.advance(200);
        assert!(e.respawn_pending());

        assert_eq!(e.teardown(), Some(EngineEvent::TornDown));
        let frozen = e.state().clone();
        assert!(!e.respawn_pending());
        assert!(!e.is_running());

        assert!(e.advance(1_000_000).is_empty());
        e.set_heading(Heading::Up);
        assert_eq!(e.activate(2_000_000), None);
        assert_eq!(e.teardown(), None);
        assert!(e.advance(5_000_000).is_empty());
        assert_eq!(e.state(), &frozen);
    }

    #[test]
    fn deactivate_cancels_timers_and_allows_restart() {
        let mut e = one_bite_from_done();
        e.advance(200);
        assert_eq!(e.deactivate(), Some(EngineEvent::Deactivated));
        assert!(!e.respawn_pending());
        assert!(!e.is_running());
        assert!(!e.state().activated);
        let paused = e.state().clone();
        assert!(e.advance(10_000).is_empty());
        assert_eq!(e.state(), &paused);

        assert_eq!(e.activate(10_000), Some(EngineEvent::Activated));
        assert!(!e.state().all_eaten());
        e.advance(10_200);
        assert_ne!(e.state().snake.head(), BOARD_CENTER);
    }
}
