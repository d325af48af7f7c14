/// Terminal input: keys and mouse, translated into engine intents.
///
/// Each frame `drain_events()` empties crossterm's queue. Directional intents
/// (arrow/WASD keys, left-button drags) are kept in arrival order, so feeding
/// them to the engine one by one gives last-wins semantics. Pointer positions
/// are kept for hover activation.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::domain::grid::Heading;

/// Minimum dominant-axis travel, in pixel-ish units, for a drag to count.
pub const SWIPE_THRESHOLD: f32 = 20.0;

/// Approximate pixel size of a terminal cell, used to scale drags.
const CELL_PX_W: f32 = 8.0;
const CELL_PX_H: f32 = 16.0;

/// Arrow keys map 1:1; WASD as a convenience. Anything else is ignored.
pub fn heading_for_key(code: KeyCode) -> Option<Heading> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Heading::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Heading::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Heading::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Heading::Right),
        _ => None,
    }
}

/// Classify a finished swipe. The dominant axis wins (ties go horizontal);
/// its travel must exceed `SWIPE_THRESHOLD`. Positive y points down.
pub fn classify_swipe(dx: f32, dy: f32) -> Option<Heading> {
    if dx.abs() >= dy.abs() {
        if dx > SWIPE_THRESHOLD {
            Some(Heading::Right)
        } else if dx < -SWIPE_THRESHOLD {
            Some(Heading::Left)
        } else {
            None
        }
    } else if dy > SWIPE_THRESHOLD {
        Some(Heading::Down)
    } else if dy < -SWIPE_THRESHOLD {
        Some(Heading::Up)
    } else {
        None
    }
}

pub struct InputState {
    /// Keys pressed during the most recent drain, in order.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    raw_events: Vec<KeyEvent>,

    /// Directional intents in arrival order.
    headings: Vec<Heading>,

    /// Pointer positions (column, row) seen this frame.
    pointer: Vec<(u16, u16)>,

    /// Where the current left-button drag started.
    drag_origin: Option<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            headings: Vec::with_capacity(4),
            pointer: Vec::with_capacity(8),
            drag_origin: None,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before advancing the engine.
    pub fn drain_events(&mut self) {
        self.clear_frame();
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.feed(ev),
                Err(e) => {
                    log::warn!("terminal event read failed: {e}");
                    break;
                }
            }
        }
    }

    fn clear_frame(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.headings.clear();
        self.pointer.clear();
    }

    /// Apply one terminal event to this frame's state.
    pub fn feed(&mut self, ev: Event) {
        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                self.raw_events.push(key);
                self.fresh_presses.push(key.code);
                if let Some(h) = heading_for_key(key.code) {
                    self.headings.push(h);
                }
            }
            Event::Mouse(mouse) => self.feed_mouse(mouse),
            _ => {}
        }
    }

    fn feed_mouse(&mut self, mouse: MouseEvent) {
        let at = (mouse.column, mouse.row);
        self.pointer.push(at);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_origin = Some(at);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((x0, y0)) = self.drag_origin.take() {
                    let dx = (at.0 as f32 - x0 as f32) * CELL_PX_W;
                    let dy = (at.1 as f32 - y0 as f32) * CELL_PX_H;
                    if let Some(h) = classify_swipe(dx, dy) {
                        log::trace!("swipe ({dx},{dy}) -> {h:?}");
                        self.headings.push(h);
                    }
                }
            }
            _ => {}
        }
    }

    /// Directional intents this frame, oldest first.
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// Pointer positions seen this frame.
    pub fn pointer(&self) -> &[(u16, u16)] {
        &self.pointer
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
