//! Structured notification stream.
//!
//! The engine emits one [`LogEvent`] per state transition and per Byzantine
//! behavior decision. Events carry the node ids and values involved and no
//! presentation formatting; rendering them as text is the consumer's job.

use byzsim_types::{ByzantineBehavior, MessageKind, Mode, NodeId, Phase, Value};
use serde::{Deserialize, Serialize};

/// Severity class of a notification, used by presentation layers to style
/// the log panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Neutral bookkeeping.
    Message,
    /// Protocol progress.
    Consensus,
    /// Malicious activity or a failed outcome.
    Failure,
}

/// A structured notification emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    // ─── Network assignment ───
    /// The node set was (re)created.
    NetworkInitialized {
        node_count: u32,
        byzantine: Vec<NodeId>,
        leader: Option<NodeId>,
        /// The `⌊(n−1)/3⌋` fault bound for this node count.
        tolerance: u32,
    },
    /// A requested fault count exceeded the tolerance bound and was reduced.
    FaultCountClamped { requested: u32, effective: u32, tolerance: u32 },
    /// Roles were re-drawn over the existing node set.
    RolesReassigned {
        byzantine: Vec<NodeId>,
        leader: Option<NodeId>,
    },
    /// No honest node was left to take the leader role.
    NoHonestNodes,
    /// The network was reset to a fresh assignment.
    NetworkReset,

    // ─── Round lifecycle ───
    RoundStarted { round: u64, mode: Mode },
    PhaseEntered { round: u64, phase: Phase },
    /// The leader fixed its proposal for the round.
    ValueProposed { leader: NodeId, value: Value },
    /// An automatic round was cancelled before completing.
    RoundAborted { round: u64 },

    // ─── Per-node traffic decisions ───
    /// An honest sender broadcast a message this phase.
    HonestSend {
        node: NodeId,
        kind: MessageKind,
        value: Value,
    },
    /// A Byzantine sender's draw for this phase.
    ByzantineDecision {
        node: NodeId,
        phase: Phase,
        behavior: ByzantineBehavior,
        /// `None` when the node stayed silent.
        value: Option<Value>,
    },
    /// A node fell short of the threshold for the given message kind.
    ThresholdNotMet {
        node: NodeId,
        kind: MessageKind,
        have: usize,
        need: usize,
    },
    /// A node accumulated enough commits and finalized the value.
    NodeCommitted { node: NodeId, value: Value, commits: usize },

    // ─── Verdict ───
    ConsensusReached {
        round: u64,
        value: Value,
        nodes: Vec<NodeId>,
    },
    ConsensusFailed {
        round: u64,
        committed: usize,
        required: usize,
    },

    // ─── Rejected commands ───
    /// A round start or manual advance found no leader.
    NoLeader,
    /// A manual advance arrived while the engine was busy.
    AdvanceRejected,
    /// A role reassignment arrived mid-round.
    ReassignRejected { round: u64 },
    /// A configuration was rejected outright (distinct from clamping).
    InvalidConfiguration { reason: String },
}

impl LogEvent {
    /// Severity class of this event.
    pub fn severity(&self) -> Severity {
        match self {
            LogEvent::NetworkInitialized { .. }
            | LogEvent::FaultCountClamped { .. }
            | LogEvent::RolesReassigned { .. }
            | LogEvent::NetworkReset
            | LogEvent::RoundAborted { .. }
            | LogEvent::ThresholdNotMet { .. } => Severity::Message,

            LogEvent::RoundStarted { .. }
            | LogEvent::PhaseEntered { .. }
            | LogEvent::ValueProposed { .. }
            | LogEvent::HonestSend { .. }
            | LogEvent::NodeCommitted { .. }
            | LogEvent::ConsensusReached { .. } => Severity::Consensus,

            LogEvent::NoHonestNodes
            | LogEvent::ByzantineDecision { .. }
            | LogEvent::ConsensusFailed { .. }
            | LogEvent::NoLeader
            | LogEvent::AdvanceRejected
            | LogEvent::ReassignRejected { .. }
            | LogEvent::InvalidConfiguration { .. } => Severity::Failure,
        }
    }
}

impl From<&crate::EngineError> for LogEvent {
    fn from(err: &crate::EngineError) -> Self {
        use crate::EngineError;
        match err {
            EngineError::NoLeader => LogEvent::NoLeader,
            EngineError::ReentrantAdvance => LogEvent::AdvanceRejected,
            EngineError::RoleChangeDuringRound { round } => {
                LogEvent::ReassignRejected { round: *round }
            }
            EngineError::InvalidConfiguration { reason } => LogEvent::InvalidConfiguration {
                reason: reason.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_match_source_log_classes() {
        let ev = LogEvent::ByzantineDecision {
            node: NodeId(2),
            phase: Phase::Prepare,
            behavior: ByzantineBehavior::Silent,
            value: None,
        };
        assert_eq!(ev.severity(), Severity::Failure);

        let ev = LogEvent::NodeCommitted {
            node: NodeId(1),
            value: Value::Zero,
            commits: 3,
        };
        assert_eq!(ev.severity(), Severity::Consensus);

        let ev = LogEvent::FaultCountClamped {
            requested: 2,
            effective: 1,
            tolerance: 1,
        };
        assert_eq!(ev.severity(), Severity::Message);
    }

    #[test]
    fn log_events_round_trip_through_json() {
        let ev = LogEvent::ConsensusReached {
            round: 3,
            value: Value::Zero,
            nodes: vec![NodeId(0), NodeId(1), NodeId(3)],
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn errors_map_to_failure_events() {
        let err = crate::EngineError::NoLeader;
        let ev = LogEvent::from(&err);
        assert_eq!(ev, LogEvent::NoLeader);
        assert_eq!(ev.severity(), Severity::Failure);
    }
}
