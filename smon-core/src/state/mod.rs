//! Character and link state
//!
//! Small explicit state machines driven by the animation tick. Transitions
//! are pure functions of the current state and an event; the trackers
//! around them own the timers that produce the events.

pub mod link;
pub mod mood;
pub mod sleep;

pub use link::{LinkMonitor, LinkState, LinkStats};
pub use mood::Mood;
pub use sleep::{SleepEvent, SleepState, SleepTracker};
