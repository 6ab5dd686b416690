mod driver;
mod engine;
mod phase;

pub use driver::{EventReceiver, TimerDriver, TimerHandle, TICK_PERIOD};
pub use engine::{SessionEngine, Status, TickOutcome, Transition};
pub use phase::{format_clock, Phase};
