pub mod clock;
pub mod idle;
pub mod input;
pub mod report;
pub mod state;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use report::{SessionReport, SubmitReason};
pub use state::{Session, SessionAction, SessionSettings, SessionState, TickOutcome, TickToken, TypingMode};
