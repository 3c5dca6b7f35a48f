//! Byzantine consensus simulation engine.
//!
//! This crate implements the simulated consensus round as a synchronous,
//! deterministic state machine in the `Events → handle() → Actions` model:
//!
//! - [`network`]: the node set, role assignment, and tolerance clamping
//! - [`behavior`]: the Byzantine sender behavior generator
//! - [`ledger`]: the append log of emitted messages (presentation timing)
//! - [`quorum`]: threshold arithmetic, pure and independently testable
//! - [`state`]: the phase state machine tying it all together
//!
//! The engine performs no I/O and holds no timers of its own; scheduling is
//! requested through actions and replayed back as events by a runner.

pub mod behavior;
pub mod config;
pub mod ledger;
pub mod network;
pub mod quorum;
pub mod state;

pub use behavior::BehaviorPolicy;
pub use config::{BehaviorBuckets, EngineConfig, PhaseSchedule};
pub use ledger::{InFlightMessage, MessageLedger};
pub use network::{ClampedFaults, NetworkModel, RoleAssignment};
pub use state::{RoundVerdict, SimulationEngine};
