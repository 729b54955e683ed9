//! Typing-test engine for government-exam practice.
//!
//! `engine` holds the pure pieces (tokenizing, alignment, metrics, feedback),
//! `session` the timed state machine that drives them, and `exam` / `passage`
//! the category rules and texts a session is built from. The terminal front
//! end lives in the binary.

pub mod config;
pub mod engine;
pub mod error;
pub mod exam;
pub mod passage;
pub mod session;
