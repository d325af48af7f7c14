pub mod engine;
pub mod event;
pub mod lifecycle;
pub mod state;
pub mod step;
pub mod timer;
