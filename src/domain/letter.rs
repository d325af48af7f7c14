/// Letter field: the characters of the loading phrase and where they sit.
///
/// Every operation is a plain function over a slice and never mutates its
/// input. The engine swaps whole fields in and out.

use rand::Rng;

use super::grid::{Cell, BOARD_HEIGHT, BOARD_WIDTH};

/// The phrase the snake eats, one letter per character.
pub const PHRASE: &str = "Loading...";

/// Row and starting column of the idle (pre-activation) layout.
const IDLE_ROW_Y: i32 = 8;
const IDLE_ROW_X: i32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Letter {
    pub ch: char,
    pub pos: Cell,
    pub eaten: bool,
    /// False only for the idle row; the renderer fades those.
    pub scattered: bool,
}

/// Idle layout: the phrase spelled left to right on a fixed row.
pub fn idle_row(phrase: &str) -> Vec<Letter> {
    phrase
        .chars()
        .enumerate()
        .map(|(i, ch)| Letter {
            ch,
            pos: Cell::new(IDLE_ROW_X + i as i32, IDLE_ROW_Y),
            eaten: false,
            scattered: false,
        })
        .collect()
}

/// Independent uniform placement for each character. Positions may coincide.
pub fn scatter<R: Rng + ?Sized>(phrase: &str, rng: &mut R) -> Vec<Letter> {
    phrase
        .chars()
        .map(|ch| Letter {
            ch,
            pos: Cell::new(rng.random_range(0..BOARD_WIDTH), rng.random_range(0..BOARD_HEIGHT)),
            eaten: false,
            scattered: true,
        })
        .collect()
}

/// Index of the first uneaten letter at `cell`, in sequence order.
pub fn find_uneaten_at(letters: &[Letter], cell: Cell) -> Option<usize> {
    letters.iter().position(|l| !l.eaten && l.pos == cell)
}

/// Copy of `letters` with `index` marked eaten. Out-of-range is a no-op.
pub fn mark_eaten(letters: &[Letter], index: usize) -> Vec<Letter> {
    let mut next = letters.to_vec();
    if let Some(l) = next.get_mut(index) {
        l.eaten = true;
    }
    next
}

/// True iff the field is non-empty and every letter is eaten.
/// An empty field never counts as complete.
pub fn all_eaten(letters: &[Letter]) -> bool {
    !letters.is_empty() && letters.iter().all(|l| l.eaten)
}

pub fn remaining(letters: &[Letter]) -> usize {
    letters.iter().filter(|l| !l.eaten).count()
}
