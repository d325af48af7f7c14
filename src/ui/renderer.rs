/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Reads `EngineState` only. Text color, backdrop and the narrow flag come
/// from `DisplayConfig` and never reach the simulation.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::DisplayConfig;
use crate::domain::grid::{Cell as GridCell, BOARD_HEIGHT, BOARD_WIDTH};
use crate::domain::letter::PHRASE;
use crate::sim::state::{EngineState, Occupant};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every cell, so gaps between rows match.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
    const BOARD_BG: Color = Color::Rgb { r: 30, g: 30, b: 48 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, Cell::BASE_BG);
    }
}

// ── Layout ──

/// Each board cell is two terminal columns wide, roughly square on screen.
const CELL_W: usize = 2;

const BOARD_COLS: usize = BOARD_WIDTH as usize * CELL_W + 2;
const BOARD_ROWS: usize = BOARD_HEIGHT as usize + 2;

const SNAKE_HEAD: Color = Color::Rgb { r: 120, g: 255, b: 140 };
const SNAKE_BODY: Color = Color::Rgb { r: 40, g: 170, b: 70 };
const LETTER_FG: Color = Color::White;
const LETTER_FADED: Color = Color::DarkGrey;
const BORDER_FG: Color = Color::Rgb { r: 90, g: 90, b: 130 };
const BACKDROP_FG: Color = Color::Rgb { r: 55, g: 55, b: 80 };
const BANNER_FG: Color = Color::Rgb { r: 200, g: 200, b: 220 };

/// Top-left terminal position of the board frame (border included).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Layout {
    pub x: usize,
    pub y: usize,
}

impl Layout {
    pub fn for_terminal(term_w: usize, term_h: usize) -> Self {
        // Board, one blank row, banner, one blank row, hint.
        let block_h = BOARD_ROWS + 4;
        Layout {
            x: term_w.saturating_sub(BOARD_COLS) / 2,
            y: term_h.saturating_sub(block_h) / 2,
        }
    }

    /// Board cell under a terminal position, border excluded.
    pub fn cell_at(&self, col: u16, row: u16) -> Option<GridCell> {
        let (col, row) = (col as usize, row as usize);
        let inner_x = self.x + 1;
        let inner_y = self.y + 1;
        if col < inner_x || row < inner_y {
            return None;
        }
        let gx = (col - inner_x) / CELL_W;
        let gy = row - inner_y;
        if gx < BOARD_WIDTH as usize && gy < BOARD_HEIGHT as usize {
            Some(GridCell::new(gx as i32, gy as i32))
        } else {
            None
        }
    }
}

pub fn is_narrow(term_w: usize, narrow_columns: u16) -> bool {
    term_w <= narrow_columns as usize
}

/// Custom banner colour applies on wide viewports only.
fn banner_color(display: &DisplayConfig, narrow: bool) -> Color {
    match display.text_color {
        Some(c) if !narrow => c,
        _ => BANNER_FG,
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    layout: Layout,
    display: DisplayConfig,
}

impl Renderer {
    pub fn new(display: DisplayConfig) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            layout: Layout { x: 0, y: 0 },
            display,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Where the board sits in the current frame.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back differs from front for every cell.
        self.back.cells.fill(Cell::INVALID);
        self.layout = Layout::for_terminal(w, h);
    }

    pub fn render(&mut self, state: &EngineState, anim_tick: u64, respawn_pending: bool) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        let narrow = is_narrow(self.term_w, self.display.narrow_columns);
        compose(&mut self.front, self.layout, &self.display, state, anim_tick, respawn_pending, narrow);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose(
    buf: &mut FrameBuffer,
    layout: Layout,
    display: &DisplayConfig,
    state: &EngineState,
    anim_tick: u64,
    respawn_pending: bool,
    narrow: bool,
) {
    compose_backdrop(buf, &display.background);
    compose_board(buf, layout, state);

    let banner_y = layout.y + BOARD_ROWS + 1;
    if state.activated {
        compose_banner(buf, banner_y, anim_tick, banner_color(display, narrow));
    }

    let hint = match (state.activated, respawn_pending, narrow) {
        (false, _, false) => "hover the board or press Enter to start  ·  Esc to dismiss",
        (false, _, true) => "Enter: start  Esc: quit",
        (true, true, _) => "",
        (true, false, false) => "arrows / WASD / drag to steer  ·  Esc to dismiss",
        (true, false, true) => "arrows: steer  Esc: quit",
    };
    buf.put_centered(banner_y + 2, hint, LETTER_FADED);
}

/// Backdrop art, tiled across the whole screen, dimmed.
fn compose_backdrop(buf: &mut FrameBuffer, art: &[String]) {
    if art.is_empty() {
        return;
    }
    let art: Vec<Vec<char>> = art.iter().map(|l| l.chars().collect()).collect();
    for y in 0..buf.height {
        let line = &art[y % art.len()];
        if line.is_empty() {
            continue;
        }
        for x in 0..buf.width {
            let ch = line[x % line.len()];
            if ch != ' ' {
                buf.set(x, y, Cell { ch, fg: BACKDROP_FG, bg: Cell::BASE_BG });
            }
        }
    }
}

fn compose_board(buf: &mut FrameBuffer, layout: Layout, state: &EngineState) {
    let (x0, y0) = (layout.x, layout.y);
    let right = x0 + BOARD_COLS - 1;
    let bottom = y0 + BOARD_ROWS - 1;
    let border = |ch| Cell { ch, fg: BORDER_FG, bg: Cell::BASE_BG };

    buf.set(x0, y0, border('╭'));
    buf.set(right, y0, border('╮'));
    buf.set(x0, bottom, border('╰'));
    buf.set(right, bottom, border('╯'));
    for x in x0 + 1..right {
        buf.set(x, y0, border('─'));
        buf.set(x, bottom, border('─'));
    }
    for y in y0 + 1..bottom {
        buf.set(x0, y, border('│'));
        buf.set(right, y, border('│'));
    }

    for gy in 0..BOARD_HEIGHT {
        for gx in 0..BOARD_WIDTH {
            let sx = x0 + 1 + gx as usize * CELL_W;
            let sy = y0 + 1 + gy as usize;
            let (lhs, rhs, fg) = match state.occupant(GridCell::new(gx, gy)) {
                Occupant::Head => ('█', '█', SNAKE_HEAD),
                Occupant::Body => ('▓', '▓', SNAKE_BODY),
                Occupant::Letter { ch, scattered } => {
                    let fg = if scattered { LETTER_FG } else { LETTER_FADED };
                    (ch, ' ', fg)
                }
                Occupant::Empty => (' ', ' ', LETTER_FADED),
            };
            buf.set(sx, sy, Cell { ch: lhs, fg, bg: Cell::BOARD_BG });
            buf.set(sx + 1, sy, Cell { ch: rhs, fg, bg: Cell::BOARD_BG });
        }
    }
}

/// The phrase with a highlight sweeping across it.
fn compose_banner(buf: &mut FrameBuffer, y: usize, anim_tick: u64, fg: Color) {
    let len = PHRASE.chars().count();
    let x = buf.width.saturating_sub(len) / 2;
    let lit = (anim_tick / 4) as usize % (len + 4);
    for (i, ch) in PHRASE.chars().enumerate() {
        let color = if i == lit { Color::White } else { fg };
        buf.set(x + i, y, Cell { ch, fg: color, bg: Cell::BASE_BG });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Heading;
    use crate::domain::snake::Snake;

    fn display() -> DisplayConfig {
        DisplayConfig { text_color: Some(Color::Cyan), background: vec![], narrow_columns: 60 }
    }

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    #[test]
    fn layout_centers_board() {
        let l = Layout::for_terminal(80, 24);
        assert_eq!(l.x, (80 - BOARD_COLS) / 2);
        assert_eq!(l.y, (24 - (BOARD_ROWS + 4)) / 2);
        // Tiny terminals pin the board to the corner.
        assert_eq!(Layout::for_terminal(10, 5), Layout { x: 0, y: 0 });
    }

    #[test]
    fn cell_at_maps_double_width_cells() {
        let l = Layout { x: 10, y: 3 };
        assert_eq!(l.cell_at(11, 4), Some(GridCell::new(0, 0)));
        assert_eq!(l.cell_at(12, 4), Some(GridCell::new(0, 0)));
        assert_eq!(l.cell_at(13, 4), Some(GridCell::new(1, 0)));
        assert_eq!(l.cell_at(11 + 39, 4 + 9), Some(GridCell::new(19, 9)));
        assert_eq!(l.cell_at(10, 4), None); // border
        assert_eq!(l.cell_at(11 + 40, 4), None);
        assert_eq!(l.cell_at(11, 4 + 10), None);
    }

    #[test]
    fn narrow_viewport_ignores_text_color() {
        let d = display();
        assert!(is_narrow(60, d.narrow_columns));
        assert!(!is_narrow(61, d.narrow_columns));
        assert_eq!(banner_color(&d, false), Color::Cyan);
        assert_eq!(banner_color(&d, true), BANNER_FG);
    }

    #[test]
    fn idle_board_shows_faded_row_and_no_banner() {
        let mut buf = FrameBuffer::new(80, 24);
        let layout = Layout::for_terminal(80, 24);
        let state = EngineState::idle();
        compose(&mut buf, layout, &display(), &state, 0, false, false);

        let head = buf.get(layout.x + 1 + 9 * CELL_W, layout.y + 1 + 5);
        assert_eq!(head.ch, '█');
        let first = buf.get(layout.x + 1 + 5 * CELL_W, layout.y + 1 + 8);
        assert_eq!(first.ch, 'L');
        assert_eq!(first.fg, LETTER_FADED);
        assert!(!row_text(&buf, layout.y + BOARD_ROWS + 1).contains(PHRASE));
    }

    #[test]
    fn running_board_shows_body_and_banner() {
        let mut buf = FrameBuffer::new(80, 24);
        let layout = Layout::for_terminal(80, 24);
        let mut state = EngineState::idle();
        state.activated = true;
        state.letters.clear();
        let snake = Snake::new(GridCell::new(3, 3), Heading::Right);
        let step = snake.step(
            &[crate::domain::letter::Letter {
                ch: 'x',
                pos: GridCell::new(4, 3),
                eaten: false,
                scattered: true,
            }],
            false,
            crate::domain::snake::GrowthTiming::SameTick,
        );
        state.snake = step.snake;
        compose(&mut buf, layout, &display(), &state, 0, false, false);

        assert_eq!(buf.get(layout.x + 1 + 4 * CELL_W, layout.y + 4).ch, '█');
        assert_eq!(buf.get(layout.x + 1 + 3 * CELL_W, layout.y + 4).ch, '▓');
        assert!(row_text(&buf, layout.y + BOARD_ROWS + 1).contains(PHRASE));
    }

    #[test]
    fn backdrop_tiles_behind_board() {
        let mut buf = FrameBuffer::new(20, 4);
        compose_backdrop(&mut buf, &["ab".to_string(), "".to_string()]);
        assert_eq!(row_text(&buf, 0), "ab".repeat(10));
        assert_eq!(row_text(&buf, 1), " ".repeat(20));
        assert_eq!(buf.get(3, 2).fg, BACKDROP_FG);
    }
}
