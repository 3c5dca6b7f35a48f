//! Core event/action contract for the consensus simulation engine.
//!
//! This crate defines the boundary between the engine and its runner:
//!
//! - [`Event`]: all timer-driven inputs to the engine
//! - [`Action`]: all outputs the engine asks the runner to perform
//! - [`LogEvent`] / [`Severity`]: the structured notification stream
//! - [`EngineError`]: the recoverable failure taxonomy
//!
//! # Architecture
//!
//! The engine is built on a simple event-driven model:
//!
//! ```text
//! Events → SimulationEngine::handle() → Actions
//! ```
//!
//! The engine is:
//! - **Synchronous**: no async, no .await
//! - **Deterministic**: same state + seed + event = same actions
//! - **Pure-ish**: mutates itself, but performs no I/O
//!
//! All scheduling is handled by the runner, which delivers events, executes
//! the returned actions, and forwards emitted notifications to subscribers.

mod action;
mod error;
mod event;
mod report;

pub use action::{Action, TimerId};
pub use error::EngineError;
pub use event::Event;
pub use report::{LogEvent, Severity};
