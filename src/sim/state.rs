/// EngineState: the complete snapshot the presentation layer reads.
///
/// A plain value. Transitions build a new state instead of mutating
/// shared fields, and the engine holds the only mutable slot.

use crate::domain::grid::{Cell, Heading, BOARD_CENTER};
use crate::domain::letter::{self, Letter, PHRASE};
use crate::domain::snake::Snake;

/// What a board cell shows, in painting priority order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Occupant {
    Head,
    Body,
    Letter { ch: char, scattered: bool },
    Empty,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EngineState {
    pub snake: Snake,
    pub letters: Vec<Letter>,
    pub growth_pending: bool,
    pub activated: bool,
}

impl EngineState {
    /// Pre-activation layout: snake at the centre facing right, phrase on a row.
    pub fn idle() -> Self {
        EngineState {
            snake: Snake::new(BOARD_CENTER, Heading::Right),
            letters: letter::idle_row(PHRASE),
            growth_pending: false,
            activated: false,
        }
    }

    pub fn heading(&self) -> Heading {
        self.snake.heading()
    }

    pub fn with_heading(&self, heading: Heading) -> Self {
        let mut next = self.clone();
        next.snake.set_heading(heading);
        next
    }

    pub fn uneaten(&self) -> impl Iterator<Item = &Letter> {
        self.letters.iter().filter(|l| !l.eaten)
    }

    pub fn all_eaten(&self) -> bool {
        letter::all_eaten(&self.letters)
    }

    pub fn occupant(&self, cell: Cell) -> Occupant {
        if self.snake.head() == cell {
            return Occupant::Head;
        }
        if self.snake.contains(cell) {
            return Occupant::Body;
        }
        match self.uneaten().find(|l| l.pos == cell) {
            Some(l) => Occupant::Letter { ch: l.ch, scattered: l.scattered },
            None => Occupant::Empty,
        }
    }
}
