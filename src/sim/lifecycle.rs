/// Lifecycle orchestration: completion detection and the delayed respawn.
///
/// The pause before a respawn is presentation only. Ticks keep running while
/// it is pending and the snake roams over the (invisible) eaten letters.

use rand::Rng;

use crate::domain::grid::{Heading, BOARD_CENTER};
use crate::domain::letter::{self, PHRASE};
use super::state::EngineState;
use super::timer::{Millis, OneShotTimer};

pub const RESPAWN_DELAY_MS: Millis = 1500;

/// Snake back to the centre facing right, letters rescattered, no pending
/// growth. Used for both first activation and every respawn.
pub fn fresh_start<R: Rng + ?Sized>(state: &EngineState, rng: &mut R) -> EngineState {
    let mut next = state.clone();
    next.snake.reset(BOARD_CENTER, Heading::Right);
    next.letters = letter::scatter(PHRASE, rng);
    next.growth_pending = false;
    next
}

#[derive(Clone, Debug)]
pub struct Lifecycle {
    respawn: OneShotTimer,
    delay: Millis,
}

impl Lifecycle {
    pub fn new() -> Self {
        Lifecycle { respawn: OneShotTimer::default(), delay: RESPAWN_DELAY_MS }
    }

    /// Arm the respawn on the completion edge. Returns true if it armed.
    /// While a respawn is already pending this does nothing.
    pub fn observe(&mut self, state: &EngineState, now: Millis) -> bool {
        if self.respawn.is_armed() || !state.all_eaten() {
            return false;
        }
        self.respawn.arm(now + self.delay);
        true
    }

    pub fn due_at(&self) -> Option<Millis> {
        self.respawn.due_at()
    }

    pub fn is_pending(&self) -> bool {
        self.respawn.is_armed()
    }

    /// Consume the pending respawn.
    pub fn fire(&mut self) {
        self.respawn.cancel();
    }

    pub fn cancel(&mut self) {
        self.respawn.cancel();
    }
}
