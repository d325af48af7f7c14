/// Grid model: board dimensions, cells and headings.
/// Pure value logic. Every positional operation goes through `in_bounds`.

pub const BOARD_WIDTH: i32 = 20;
pub const BOARD_HEIGHT: i32 = 10;

/// Where the snake starts (idle and after every respawn).
pub const BOARD_CENTER: Cell = Cell { x: 9, y: 5 };

/// A board coordinate. Signed so that the cell one step past a wall
/// can be represented and rejected by `in_bounds`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// Neighbour one step along `heading`. May be out of bounds.
    pub fn offset(self, heading: Heading) -> Cell {
        let (dx, dy) = heading.delta();
        Cell { x: self.x + dx, y: self.y + dy }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    /// Unit vector in screen space (y grows downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Heading::Up    => (0, -1),
            Heading::Down  => (0, 1),
            Heading::Left  => (-1, 0),
            Heading::Right => (1, 0),
        }
    }
}

#[inline]
pub fn in_bounds(cell: Cell) -> bool {
    cell.x >= 0 && cell.x < BOARD_WIDTH && cell.y >= 0 && cell.y < BOARD_HEIGHT
}
