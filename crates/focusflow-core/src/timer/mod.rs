mod engine;
mod phase;
mod quotes;

pub use engine::{TimerEngine, TimerSnapshot, TimerState};
pub use phase::Phase;
pub use quotes::{QuotePicker, DEFAULT_QUOTES};
