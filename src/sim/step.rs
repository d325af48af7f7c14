/// The step function: advances the engine state by one tick.
///
/// Processing order:
///   1. Snake movement (wall stall, letter consumption, growth)
///   2. Growth bookkeeping
///   3. Completion check (edge only: all eaten now, not before)
///
/// Pure transition: takes the current state, returns the next one plus the
/// events that describe what happened.

use crate::domain::snake::GrowthTiming;
use super::event::EngineEvent;
use super::state::EngineState;

pub fn step(state: &EngineState, timing: GrowthTiming) -> (EngineState, Vec<EngineEvent>) {
    let mut events = Vec::new();
    let was_complete = state.all_eaten();

    let out = state.snake.step(&state.letters, state.growth_pending, timing);

    if out.stalled {
        events.push(EngineEvent::Stalled);
    }

    if out.grew {
        if let Some(index) = out.eaten {
            let l = out.letters[index];
            events.push(EngineEvent::LetterEaten { index, ch: l.ch, x: l.pos.x, y: l.pos.y });
        }
    }

    if out.snake.len() > state.snake.len() {
        events.push(EngineEvent::Grew { length: out.snake.len() });
    }

    let next = EngineState {
        snake: out.snake,
        letters: out.letters,
        growth_pending: out.growth_pending,
        activated: state.activated,
    };

    if !was_complete && next.all_eaten() {
        events.push(EngineEvent::AllEaten);
    }

    (next, events)
}
