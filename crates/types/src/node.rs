//! Node identity, roles, and per-round state.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique node identifier, stable for the lifetime of a round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a node within the current network assignment.
///
/// The leader is a distinguished honest node; exactly one exists per
/// assignment and it is never Byzantine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    Honest,
    Byzantine,
    Leader,
}

/// A binary consensus value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Zero,
    One,
}

impl Value {
    /// The canonical value the leader proposes.
    pub const CANONICAL: Value = Value::Zero;

    /// The opposite value.
    pub fn flipped(self) -> Value {
        match self {
            Value::Zero => Value::One,
            Value::One => Value::Zero,
        }
    }

    /// Draw a uniformly random value.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Value {
        if rng.gen::<bool>() {
            Value::One
        } else {
            Value::Zero
        }
    }

    /// Numeric form, for display and serialization boundaries.
    pub fn as_bit(self) -> u8 {
        match self {
            Value::Zero => 0,
            Value::One => 1,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_bit())
    }
}

/// Per-round received-message store, separate from the message ledger.
///
/// Quorum evaluation reads these sequences exclusively; the ledger is a
/// timing artifact and never participates in threshold counting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbox {
    /// Ordered `(sender, value)` pairs received during the prepare phase.
    pub prepare: Vec<(NodeId, Value)>,
    /// Ordered `(sender, value)` pairs received during the commit phase.
    pub commit: Vec<(NodeId, Value)>,
}

impl Inbox {
    /// Drop all entries at the start of a round.
    pub fn clear(&mut self) {
        self.prepare.clear();
        self.commit.clear();
    }
}

/// A simulated consensus participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub role: NodeRole,
    /// Randomly assigned at network (re)initialization; pinned to
    /// [`Value::CANONICAL`] once the node becomes leader.
    pub initial_value: Value,
    pub received_value: Option<Value>,
    pub sent_value: Option<Value>,
    pub proposed_value: Option<Value>,
    pub prepared_value: Option<Value>,
    pub committed_value: Option<Value>,
    pub inbox: Inbox,
}

impl Node {
    /// Create a fresh honest node with the given initial value.
    pub fn new(id: NodeId, initial_value: Value) -> Self {
        Self {
            id,
            role: NodeRole::Honest,
            initial_value,
            received_value: None,
            sent_value: None,
            proposed_value: None,
            prepared_value: None,
            committed_value: None,
            inbox: Inbox::default(),
        }
    }

    pub fn is_leader(&self) -> bool {
        self.role == NodeRole::Leader
    }

    pub fn is_byzantine(&self) -> bool {
        self.role == NodeRole::Byzantine
    }

    /// Clear every round-scoped field. Identity, role, and initial value
    /// survive; they belong to the network assignment, not the round.
    pub fn reset_round_state(&mut self) {
        self.received_value = None;
        self.sent_value = None;
        self.proposed_value = None;
        self.prepared_value = None;
        self.committed_value = None;
        self.inbox.clear();
    }
}
