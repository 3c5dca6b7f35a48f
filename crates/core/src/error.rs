//! Recoverable engine failures.

use thiserror::Error;

/// Everything that can go wrong at the engine's command surface.
///
/// All variants are recoverable: the engine stays in a consistent, resumable
/// state and additionally emits the matching [`crate::LogEvent`] so the
/// presentation layer sees the failure too.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A round start found no leader in the node set.
    #[error("no leader available; cannot start a consensus round")]
    NoLeader,

    /// The configuration was rejected outright. Over-tolerance fault counts
    /// are clamped and reported instead, never surfaced through this variant.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A manual advance (or round start) arrived while a previous transition
    /// was still settling or a round was already running.
    #[error("advance rejected: a transition is already in progress")]
    ReentrantAdvance,

    /// A role reassignment arrived while round `round` was in progress.
    #[error("cannot reassign roles while round {round} is in progress")]
    RoleChangeDuringRound { round: u64 },
}
