/// Snake state machine: ordered body segments (head first) and a heading.
///
/// Body contiguity is not enforced. Segments are simply the cells the head
/// occupied on successive past ticks.

use std::collections::VecDeque;

use super::grid::{in_bounds, Cell, Heading};
use super::letter::{self, Letter};

/// When an eaten letter turns into an extra body segment.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GrowthTiming {
    /// The step that eats keeps its tail.
    #[default]
    SameTick,
    /// The eat sets a pending credit; the next successful step keeps its tail.
    NextTick,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Snake {
    segments: VecDeque<Cell>,
    heading: Heading,
}

/// Result of one `Snake::step`.
#[derive(Clone, Debug)]
pub struct SnakeStep {
    pub snake: Snake,
    pub letters: Vec<Letter>,
    /// Index of the letter eaten on this step, if any.
    pub eaten: Option<usize>,
    /// A letter was eaten on this step.
    pub grew: bool,
    /// Growth credit carried into the next step.
    pub growth_pending: bool,
    /// Candidate head was off the board; nothing changed.
    pub stalled: bool,
}

impl Snake {
    pub fn new(start: Cell, heading: Heading) -> Self {
        Snake { segments: VecDeque::from([start]), heading }
    }

    pub fn head(&self) -> Cell {
        self.segments[0]
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = Cell> + '_ {
        self.segments.iter().copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }

    /// Unconditional overwrite. Reversing straight into the body is allowed.
    pub fn set_heading(&mut self, heading: Heading) {
        self.heading = heading;
    }

    pub fn reset(&mut self, start: Cell, heading: Heading) {
        self.segments.clear();
        self.segments.push_back(start);
        self.heading = heading;
    }

    /// Advance one cell along the heading, eating the first uneaten letter
    /// at the new head.
    pub fn step(&self, letters: &[Letter], growth_pending: bool, timing: GrowthTiming) -> SnakeStep {
        let candidate = self.head().offset(self.heading);

        // Walls stall the snake; pending growth survives the stall.
        if !in_bounds(candidate) {
            return SnakeStep {
                snake: self.clone(),
                letters: letters.to_vec(),
                eaten: None,
                grew: false,
                growth_pending,
                stalled: true,
            };
        }

        let eaten = letter::find_uneaten_at(letters, candidate);
        let letters = match eaten {
            Some(i) => letter::mark_eaten(letters, i),
            None => letters.to_vec(),
        };
        let grew = eaten.is_some();

        let (keep_tail, growth_pending) = match timing {
            GrowthTiming::SameTick => (grew || growth_pending, false),
            GrowthTiming::NextTick => (growth_pending, grew),
        };

        let mut snake = self.clone();
        snake.segments.push_front(candidate);
        if !keep_tail {
            snake.segments.pop_back();
        }

        SnakeStep { snake, letters, eaten, grew, growth_pending, stalled: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{BOARD_CENTER, BOARD_HEIGHT, BOARD_WIDTH};

    fn letter_at(ch: char, x: i32, y: i32) -> Letter {
        Letter { ch, pos: Cell::new(x, y), eaten: false, scattered: true }
    }

    fn cells(snake: &Snake) -> Vec<(i32, i32)> {
        snake.segments().map(|c| (c.x, c.y)).collect()
    }

    #[test]
    fn moves_one_cell_in_every_heading() {
        for heading in [Heading::Up, Heading::Down, Heading::Left, Heading::Right] {
            let snake = Snake::new(BOARD_CENTER, heading);
            let out = snake.step(&[], false, GrowthTiming::SameTick);
            assert_eq!(out.snake.head(), BOARD_CENTER.offset(heading));
            assert_eq!(out.snake.len(), 1);
            assert!(!out.grew);
            assert!(!out.stalled);
        }
    }

    #[test]
    fn three_steps_right_without_letters() {
        let mut snake = Snake::new(BOARD_CENTER, Heading::Right);
        for _ in 0..3 {
            snake = snake.step(&[], false, GrowthTiming::SameTick).snake;
        }
        assert_eq!(cells(&snake), vec![(12, 5)]);
    }

    #[test]
    fn eating_grows_on_same_tick() {
        let snake = Snake::new(BOARD_CENTER, Heading::Right);
        let field = vec![letter_at('L', 10, 5)];
        let out = snake.step(&field, false, GrowthTiming::SameTick);
        assert_eq!(cells(&out.snake), vec![(10, 5), (9, 5)]);
        assert!(out.grew);
        assert_eq!(out.eaten, Some(0));
        assert!(out.letters[0].eaten);
        assert!(!out.growth_pending);

        // Next plain step keeps length 2.
        let out = out.snake.step(&out.letters, out.growth_pending, GrowthTiming::SameTick);
        assert_eq!(cells(&out.snake), vec![(11, 5), (10, 5)]);
    }

    #[test]
    fn eating_grows_on_next_tick() {
        let snake = Snake::new(BOARD_CENTER, Heading::Right);
        let field = vec![letter_at('L', 10, 5)];
        let out = snake.step(&field, false, GrowthTiming::NextTick);
        assert_eq!(cells(&out.snake), vec![(10, 5)]);
        assert!(out.grew);
        assert!(out.growth_pending);

        let out = out.snake.step(&out.letters, out.growth_pending, GrowthTiming::NextTick);
        assert_eq!(cells(&out.snake), vec![(11, 5), (10, 5)]);
        assert!(!out.growth_pending);
    }

    #[test]
    fn consecutive_eats_each_add_one_segment() {
        let field = vec![letter_at('a', 10, 5), letter_at('b', 11, 5)];
        for timing in [GrowthTiming::SameTick, GrowthTiming::NextTick] {
            let mut snake = Snake::new(BOARD_CENTER, Heading::Right);
            let mut letters = field.clone();
            let mut pending = false;
            for _ in 0..3 {
                let out = snake.step(&letters, pending, timing);
                snake = out.snake;
                letters = out.letters;
                pending = out.growth_pending;
            }
            assert_eq!(snake.len(), 3, "{timing:?}");
        }
    }

    #[test]
    fn eats_lowest_index_of_overlapping_letters() {
        let snake = Snake::new(BOARD_CENTER, Heading::Right);
        let field = vec![letter_at('x', 0, 0), letter_at('a', 10, 5), letter_at('b', 10, 5)];
        let out = snake.step(&field, false, GrowthTiming::SameTick);
        assert_eq!(out.eaten, Some(1));
        assert_eq!(out.letters.iter().filter(|l| l.eaten).count(), 1);
        assert!(!out.letters[2].eaten);
    }

    #[test]
    fn eaten_letters_are_not_eaten_again() {
        let snake = Snake::new(BOARD_CENTER, Heading::Right);
        let mut field = vec![letter_at('a', 10, 5)];
        field[0].eaten = true;
        let out = snake.step(&field, false, GrowthTiming::SameTick);
        assert!(!out.grew);
        assert_eq!(out.snake.len(), 1);
    }

    #[test]
    fn walls_stall_without_change() {
        let edges = [
            (Cell::new(0, 3), Heading::Left),
            (Cell::new(BOARD_WIDTH - 1, 3), Heading::Right),
            (Cell::new(4, 0), Heading::Up),
            (Cell::new(4, BOARD_HEIGHT - 1), Heading::Down),
        ];
        for (start, heading) in edges {
            let snake = Snake::new(start, heading);
            let out = snake.step(&[], true, GrowthTiming::NextTick);
            assert!(out.stalled);
            assert!(!out.grew);
            assert!(out.growth_pending);
            assert_eq!(out.snake, snake);
        }
    }

    #[test]
    fn reversal_is_not_guarded() {
        let mut snake = Snake::new(BOARD_CENTER, Heading::Right);
        let field = vec![letter_at('a', 10, 5)];
        let out = snake.step(&field, false, GrowthTiming::SameTick);
        snake = out.snake;
        snake.set_heading(Heading::Left);
        let out = snake.step(&out.letters, false, GrowthTiming::SameTick);
        assert_eq!(cells(&out.snake), vec![(9, 5), (10, 5)]);
    }

    #[test]
    fn reset_returns_single_segment() {
        let mut snake = Snake::new(Cell::new(2, 2), Heading::Up);
        let out = snake.step(&[letter_at('a', 2, 1)], false, GrowthTiming::SameTick);
        snake = out.snake;
        assert_eq!(snake.len(), 2);
        snake.reset(BOARD_CENTER, Heading::Right);
        assert_eq!(cells(&snake), vec![(9, 5)]);
        assert_eq!(snake.heading(), Heading::Right);
    }
}
