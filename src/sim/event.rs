/// Events emitted by engine transitions.
/// The host consumes these for sound and logging; painting reads the state.

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum EngineEvent {
    Activated,
    LetterEaten { index: usize, ch: char, x: i32, y: i32 },
    Grew { length: usize },
    Stalled,
    AllEaten,
    Respawned,
    Deactivated,
    TornDown,
}
