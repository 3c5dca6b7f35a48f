//! The consensus round state machine.
//!
//! This module implements the simulated three-phase round as a synchronous,
//! event-driven model. Caller commands are direct methods so they can report
//! typed errors; scheduled work arrives through [`SimulationEngine::handle`].
//!
//! # State Machine Flow
//!
//! 1. **Round start** → leader fixes its proposal, pre-prepare broadcast
//! 2. **Prepare** → every replica broadcasts (Byzantine senders consult the
//!    behavior generator), inboxes fill
//! 3. **Commit** → per-node prepare threshold gates the commit broadcast
//! 4. **Finalize** → per-node commit threshold sets committed values and the
//!    round verdict; phase returns to idle
//!
//! All scheduling is expressed as actions; the engine never blocks.

use crate::behavior::{self, BehaviorPolicy};
use crate::config::EngineConfig;
use crate::ledger::{InFlightMessage, MessageLedger};
use crate::network::{NetworkModel, RoleAssignment};
use crate::quorum;
use byzsim_core::{Action, EngineError, Event, LogEvent, TimerId};
use byzsim_types::{
    ByzantineBehavior, Message, MessageKind, Mode, Node, NodeId, Phase, ProtocolVariant, Value,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Outcome of the most recent finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundVerdict {
    pub round: u64,
    /// The leader's proposed value for the round.
    pub value: Value,
    /// Nodes that committed the proposed value, in id order.
    pub committed: Vec<NodeId>,
    /// Consensus is reached iff every non-Byzantine node committed.
    pub reached: bool,
}

/// The consensus simulation engine.
///
/// Owns the node set (via the network model), the message ledger, and the
/// round state. Deterministic: all randomness flows from the seed given at
/// construction.
pub struct SimulationEngine {
    config: EngineConfig,
    rng: ChaCha8Rng,
    network: NetworkModel,
    ledger: MessageLedger,

    phase: Phase,
    mode: Mode,
    round: u64,
    /// Whether a round is currently in progress.
    round_active: bool,
    /// Manual-mode serialization flag: set while an advance is settling.
    busy: bool,
    /// Cannot-double-finalize guard, reset once the commit→idle transition
    /// completes.
    finalized: bool,

    /// Current simulated time (set by the runner before each call).
    now: Duration,

    last_verdict: Option<RoundVerdict>,
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("nodes", &self.network.node_count())
            .field("byzantine", &self.network.byzantine_count())
            .field("phase", &self.phase)
            .field("mode", &self.mode)
            .field("round", &self.round)
            .field("round_active", &self.round_active)
            .finish()
    }
}

impl SimulationEngine {
    /// Create an engine with an empty node set. Call
    /// [`initialize_network`](Self::initialize_network) before starting a
    /// round.
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            network: NetworkModel::default(),
            ledger: MessageLedger::default(),
            phase: Phase::Idle,
            mode: Mode::Manual,
            round: 0,
            round_active: false,
            busy: false,
            finalized: false,
            now: Duration::ZERO,
            last_verdict: None,
            config,
        }
    }

    // ─── Command surface ───

    /// (Re)create the node set with fresh roles and values.
    ///
    /// Clamps `fault_count` to `⌊(n−1)/3⌋` (reported, not an error), aborts
    /// any round in progress, and zeroes the round counter and ledger.
    pub fn initialize_network(
        &mut self,
        node_count: u32,
        fault_count: u32,
    ) -> Result<Vec<Action>, EngineError> {
        if node_count == 0 {
            return Err(EngineError::InvalidConfiguration {
                reason: "node count must be at least 1".into(),
            });
        }

        let mut actions = Vec::new();
        self.abort_round(&mut actions);

        self.config.node_count = node_count;
        self.config.fault_count = fault_count;

        let (network, assignment) = NetworkModel::initialize(node_count, fault_count, &mut self.rng);
        self.network = network;
        self.ledger.reset();
        self.round = 0;
        self.phase = Phase::Idle;
        self.busy = false;
        self.finalized = false;
        self.last_verdict = None;

        info!(
            node_count,
            byzantine = ?assignment.byzantine,
            leader = ?assignment.leader,
            "network initialized"
        );
        self.report_assignment(&assignment, false, &mut actions);
        Ok(actions)
    }

    /// Reset to a fresh assignment with the current node and fault counts.
    pub fn reset_network(&mut self) -> Vec<Action> {
        let mut actions = vec![Action::Emit(LogEvent::NetworkReset)];
        match self.initialize_network(self.config.node_count, self.config.fault_count) {
            Ok(more) => actions.extend(more),
            Err(err) => {
                warn!(%err, "reset rejected");
                actions.push(Action::Emit(LogEvent::from(&err)));
            }
        }
        actions
    }

    /// Re-draw roles over the existing node set. Rejected mid-round.
    pub fn reassign_roles(&mut self) -> Result<Vec<Action>, EngineError> {
        if self.round_active {
            return Err(EngineError::RoleChangeDuringRound { round: self.round });
        }
        if self.network.node_count() == 0 {
            return Err(EngineError::InvalidConfiguration {
                reason: "network has not been initialized".into(),
            });
        }

        let assignment = self.network.reassign_roles(self.config.fault_count, &mut self.rng);
        self.busy = false;
        self.finalized = false;
        self.last_verdict = None;

        info!(
            byzantine = ?assignment.byzantine,
            leader = ?assignment.leader,
            "roles reassigned"
        );
        let mut actions = Vec::new();
        self.report_assignment(&assignment, true, &mut actions);
        Ok(actions)
    }

    /// Start a round in the given mode.
    ///
    /// Automatic rounds schedule every transition up front as cancellable
    /// timers keyed by the round id. Starting in manual mode performs the
    /// first transition immediately, exactly like a manual advance from idle.
    pub fn start_round(&mut self, mode: Mode) -> Result<Vec<Action>, EngineError> {
        match mode {
            Mode::Manual => {
                if self.round_active || self.busy {
                    return Err(EngineError::ReentrantAdvance);
                }
                self.advance_manual_step()
            }
            Mode::Automatic => {
                if self.round_active || self.busy {
                    return Err(EngineError::ReentrantAdvance);
                }
                if self.network.leader_id().is_none() {
                    return Err(EngineError::NoLeader);
                }

                let mut actions = Vec::new();
                self.begin_round(Mode::Automatic, &mut actions);
                for target in [Phase::PrePrepare, Phase::Prepare, Phase::Commit, Phase::Idle] {
                    actions.push(Action::SetTimer {
                        id: TimerId::Phase {
                            round: self.round,
                            target,
                        },
                        delay: self.config.schedule.offset(target),
                    });
                }
                Ok(actions)
            }
        }
    }

    /// Perform one manual phase transition.
    ///
    /// From idle this starts a new round (pre-prepare); the third call in a
    /// round performs commit entry and finalization together, returning to
    /// idle. Rejected while a previous advance is settling or an automatic
    /// round is running.
    pub fn advance_manual_step(&mut self) -> Result<Vec<Action>, EngineError> {
        if self.busy {
            return Err(EngineError::ReentrantAdvance);
        }
        if self.round_active && self.mode == Mode::Automatic {
            return Err(EngineError::ReentrantAdvance);
        }

        let mut actions = Vec::new();
        match self.phase {
            Phase::Idle => {
                if self.network.leader_id().is_none() {
                    return Err(EngineError::NoLeader);
                }
                self.begin_round(Mode::Manual, &mut actions);
                self.enter_pre_prepare(&mut actions);
                self.arm_settle(&mut actions);
            }
            Phase::PrePrepare => {
                self.enter_prepare(&mut actions);
                self.arm_settle(&mut actions);
            }
            Phase::Prepare => {
                self.enter_commit(&mut actions);
                self.finalize_round(&mut actions);
                self.finalized = false;
            }
            // A round at rest never sits in commit; the final advance above
            // collapses commit entry and finalization. Finish defensively.
            Phase::Commit => {
                self.finalize_round(&mut actions);
                self.finalized = false;
            }
        }
        Ok(actions)
    }

    /// Process a scheduled event delivered by the runner.
    pub fn handle(&mut self, event: Event) -> Vec<Action> {
        let mut actions = Vec::new();
        match event {
            Event::PhaseTimer { round, target } => {
                if !self.round_active || round != self.round {
                    trace!(round, ?target, current = self.round, "ignoring stale phase timer");
                    return actions;
                }
                match target {
                    Phase::PrePrepare => self.enter_pre_prepare(&mut actions),
                    Phase::Prepare => self.enter_prepare(&mut actions),
                    Phase::Commit => self.enter_commit(&mut actions),
                    Phase::Idle => {
                        self.finalize_round(&mut actions);
                        self.finalized = false;
                    }
                }
            }
            Event::SettleElapsed { round } => {
                if round == self.round {
                    self.busy = false;
                }
            }
        }
        actions
    }

    /// Set the current simulated time. Called by the runner before each
    /// command or event delivery.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    // ─── Query surface ───

    pub fn nodes(&self) -> &[Node] {
        self.network.nodes()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Variant-aware label of the current phase.
    pub fn phase_label(&self) -> &'static str {
        self.phase.label(self.config.variant)
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn variant(&self) -> ProtocolVariant {
        self.config.variant
    }

    /// Cumulative messages sent since the last network initialization.
    pub fn message_count(&self) -> u64 {
        self.ledger.sent_total()
    }

    /// Messages still in flight at the current simulated time.
    pub fn in_flight(&self) -> Vec<InFlightMessage> {
        self.ledger.in_flight(self.now)
    }

    /// Drop fully-transited messages from the ledger. Presentation-driven;
    /// never affects quorum state.
    pub fn expire_messages(&mut self) {
        self.ledger.expire(self.now);
    }

    pub fn last_verdict(&self) -> Option<&RoundVerdict> {
        self.last_verdict.as_ref()
    }

    pub fn is_round_active(&self) -> bool {
        self.round_active
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    // ─── Internals ───

    fn begin_round(&mut self, mode: Mode, actions: &mut Vec<Action>) {
        self.round += 1;
        self.round_active = true;
        self.finalized = false;
        self.mode = mode;
        self.network.reset_round_state();
        info!(round = self.round, ?mode, "round started");
        actions.push(Action::Emit(LogEvent::RoundStarted {
            round: self.round,
            mode,
        }));
    }

    fn arm_settle(&mut self, actions: &mut Vec<Action>) {
        self.busy = true;
        actions.push(Action::SetTimer {
            id: TimerId::Settle { round: self.round },
            delay: self.config.settle_delay,
        });
    }

    /// Cancel pending timers and abandon any round in progress.
    fn abort_round(&mut self, actions: &mut Vec<Action>) {
        if !self.round_active {
            return;
        }
        for target in [Phase::PrePrepare, Phase::Prepare, Phase::Commit, Phase::Idle] {
            actions.push(Action::CancelTimer {
                id: TimerId::Phase {
                    round: self.round,
                    target,
                },
            });
        }
        actions.push(Action::CancelTimer {
            id: TimerId::Settle { round: self.round },
        });
        actions.push(Action::Emit(LogEvent::RoundAborted { round: self.round }));
        debug!(round = self.round, "round aborted");
        self.round_active = false;
        self.busy = false;
        self.phase = Phase::Idle;
    }

    fn report_assignment(
        &self,
        assignment: &RoleAssignment,
        reassignment: bool,
        actions: &mut Vec<Action>,
    ) {
        if let Some(clamp) = assignment.clamped {
            actions.push(Action::Emit(LogEvent::FaultCountClamped {
                requested: clamp.requested,
                effective: clamp.effective,
                tolerance: clamp.tolerance,
            }));
        }
        if reassignment {
            actions.push(Action::Emit(LogEvent::RolesReassigned {
                byzantine: assignment.byzantine.clone(),
                leader: assignment.leader,
            }));
        } else {
            actions.push(Action::Emit(LogEvent::NetworkInitialized {
                node_count: self.network.node_count(),
                byzantine: assignment.byzantine.clone(),
                leader: assignment.leader,
                tolerance: quorum::max_faulty(self.network.node_count()),
            }));
        }
        if assignment.leader.is_none() {
            actions.push(Action::Emit(LogEvent::NoHonestNodes));
        }
    }

    fn enter_phase(&mut self, phase: Phase, actions: &mut Vec<Action>) {
        self.phase = phase;
        debug!(round = self.round, ?phase, "phase entered");
        actions.push(Action::Emit(LogEvent::PhaseEntered {
            round: self.round,
            phase,
        }));
    }

    fn record(&mut self, from: NodeId, to: NodeId, kind: MessageKind, value: Value) {
        trace!(%from, %to, ?kind, %value, "message recorded");
        self.ledger.record(Message {
            from,
            to,
            kind,
            value,
            emitted_at: self.now,
            transit: self.config.transit_duration,
        });
    }

    /// The leader's id and proposed value, if both exist.
    fn proposal(&self) -> Option<(NodeId, Value)> {
        let leader = self.network.leader()?;
        Some((leader.id, leader.proposed_value?))
    }

    /// idle → pre-prepare: the leader fixes its proposal and broadcasts it.
    fn enter_pre_prepare(&mut self, actions: &mut Vec<Action>) {
        self.enter_phase(Phase::PrePrepare, actions);

        let Some(leader_id) = self.network.leader_id() else {
            warn!("pre-prepare without a leader; round cannot proceed");
            return;
        };
        let value = {
            let nodes = self.network.nodes_mut();
            let Some(leader) = nodes.iter_mut().find(|n| n.id == leader_id) else {
                return;
            };
            leader.proposed_value = Some(leader.initial_value);
            leader.initial_value
        };
        actions.push(Action::Emit(LogEvent::ValueProposed {
            leader: leader_id,
            value,
        }));

        for i in 0..self.network.nodes().len() {
            let to = self.network.nodes()[i].id;
            if to == leader_id {
                continue;
            }
            {
                let node = &mut self.network.nodes_mut()[i];
                node.proposed_value = Some(value);
                node.received_value = Some(value);
            }
            self.record(leader_id, to, MessageKind::PrePrepare, value);
        }
    }

    /// pre-prepare → prepare: every replica broadcasts; Byzantine senders
    /// consult the behavior generator against the leader's proposal.
    fn enter_prepare(&mut self, actions: &mut Vec<Action>) {
        self.enter_phase(Phase::Prepare, actions);

        let Some((leader_id, proposed)) = self.proposal() else {
            warn!("prepare without a proposal; round cannot proceed");
            return;
        };
        let policy = BehaviorPolicy::for_variant(self.config.variant);

        // Decide every sender's transmission first (RNG draws in id order),
        // then apply the broadcasts.
        let senders: Vec<(NodeId, bool)> = self
            .network
            .nodes()
            .iter()
            .filter(|n| n.id != leader_id)
            .map(|n| (n.id, n.is_byzantine()))
            .collect();

        let mut sends: Vec<(NodeId, Option<Value>)> = Vec::new();
        for (id, is_byzantine) in senders {
            if is_byzantine {
                let (behavior, value) =
                    behavior::draw(policy, self.config.behavior, proposed, &mut self.rng);
                debug!(node = %id, ?behavior, ?value, "byzantine prepare decision");
                actions.push(Action::Emit(LogEvent::ByzantineDecision {
                    node: id,
                    phase: Phase::Prepare,
                    behavior,
                    value,
                }));
                sends.push((id, value));
            } else {
                actions.push(Action::Emit(LogEvent::HonestSend {
                    node: id,
                    kind: MessageKind::Prepare,
                    value: proposed,
                }));
                sends.push((id, Some(proposed)));
            }
        }

        for (sender, value) in sends {
            // A silent sender leaves no trace: no message, no inbox entry.
            let Some(value) = value else { continue };
            self.broadcast(sender, MessageKind::Prepare, value);
        }
    }

    /// prepare → commit: the prepare threshold gates each replica's commit
    /// broadcast; the leader enters commit unconditionally.
    fn enter_commit(&mut self, actions: &mut Vec<Action>) {
        self.enter_phase(Phase::Commit, actions);

        let Some((leader_id, proposed)) = self.proposal() else {
            warn!("commit without a proposal; round cannot proceed");
            return;
        };
        let required =
            quorum::required_matching(self.network.node_count(), self.network.byzantine_count());
        let policy = BehaviorPolicy::for_variant(self.config.variant);

        let mut sends: Vec<(NodeId, Value)> = Vec::new();
        for i in 0..self.network.nodes().len() {
            let (id, is_byzantine, have) = {
                let node = &self.network.nodes()[i];
                if node.id == leader_id {
                    continue;
                }
                // Implicit credits: the leader's unsent-to-itself prepare,
                // plus the node's own broadcast when it matched.
                let credits = 1 + usize::from(node.sent_value == Some(proposed));
                (
                    node.id,
                    node.is_byzantine(),
                    quorum::matching_votes(&node.inbox.prepare, proposed, credits),
                )
            };

            if have < required {
                actions.push(Action::Emit(LogEvent::ThresholdNotMet {
                    node: id,
                    kind: MessageKind::Prepare,
                    have,
                    need: required,
                }));
                continue;
            }

            self.network.nodes_mut()[i].prepared_value = Some(proposed);
            if is_byzantine {
                let (behavior, value) = match policy {
                    BehaviorPolicy::DeterministicFlip => {
                        (ByzantineBehavior::Flip, Some(proposed.flipped()))
                    }
                    BehaviorPolicy::ThreeWay => {
                        behavior::draw(policy, self.config.behavior, proposed, &mut self.rng)
                    }
                };
                debug!(node = %id, ?behavior, ?value, "byzantine commit decision");
                actions.push(Action::Emit(LogEvent::ByzantineDecision {
                    node: id,
                    phase: Phase::Commit,
                    behavior,
                    value,
                }));
                if let Some(value) = value {
                    sends.push((id, value));
                }
            } else {
                actions.push(Action::Emit(LogEvent::HonestSend {
                    node: id,
                    kind: MessageKind::Commit,
                    value: proposed,
                }));
                sends.push((id, proposed));
            }
        }

        // The leader always commits its own proposal.
        if let Some(leader) = self.network.nodes_mut().iter_mut().find(|n| n.id == leader_id) {
            leader.prepared_value = Some(proposed);
        }
        actions.push(Action::Emit(LogEvent::HonestSend {
            node: leader_id,
            kind: MessageKind::Commit,
            value: proposed,
        }));
        sends.push((leader_id, proposed));

        for (sender, value) in sends {
            self.broadcast(sender, MessageKind::Commit, value);
        }
    }

    /// commit → idle: the commit threshold sets committed values and the
    /// round verdict. Consensus requires every non-Byzantine node to commit.
    fn finalize_round(&mut self, actions: &mut Vec<Action>) {
        if self.finalized {
            warn!(round = self.round, "duplicate finalization suppressed");
            return;
        }
        self.finalized = true;

        if let Some((leader_id, proposed)) = self.proposal() {
            let required = quorum::required_matching(
                self.network.node_count(),
                self.network.byzantine_count(),
            );

            let mut committed = Vec::new();
            for i in 0..self.network.nodes().len() {
                let (id, have) = {
                    let node = &self.network.nodes()[i];
                    if node.is_byzantine() {
                        continue;
                    }
                    // The leader's commit is implicit for everyone else; a
                    // node that commit-broadcast the value also counts its
                    // own unsent-to-itself message.
                    let credits = usize::from(node.id != leader_id)
                        + usize::from(node.prepared_value == Some(proposed));
                    (
                        node.id,
                        quorum::matching_votes(&node.inbox.commit, proposed, credits),
                    )
                };
                if have >= required {
                    self.network.nodes_mut()[i].committed_value = Some(proposed);
                    committed.push(id);
                    actions.push(Action::Emit(LogEvent::NodeCommitted {
                        node: id,
                        value: proposed,
                        commits: have,
                    }));
                } else {
                    actions.push(Action::Emit(LogEvent::ThresholdNotMet {
                        node: id,
                        kind: MessageKind::Commit,
                        have,
                        need: required,
                    }));
                }
            }

            let loyal = self.network.loyal_count();
            let reached = loyal > 0 && committed.len() == loyal;
            info!(
                round = self.round,
                reached,
                committed = committed.len(),
                loyal,
                "round finalized"
            );
            if reached {
                actions.push(Action::Emit(LogEvent::ConsensusReached {
                    round: self.round,
                    value: proposed,
                    nodes: committed.clone(),
                }));
            } else {
                actions.push(Action::Emit(LogEvent::ConsensusFailed {
                    round: self.round,
                    committed: committed.len(),
                    required: loyal,
                }));
            }
            self.last_verdict = Some(RoundVerdict {
                round: self.round,
                value: proposed,
                committed,
                reached,
            });
        } else {
            warn!("finalize without a proposal; recording a failed round");
            actions.push(Action::Emit(LogEvent::ConsensusFailed {
                round: self.round,
                committed: 0,
                required: self.network.loyal_count(),
            }));
        }

        self.enter_phase(Phase::Idle, actions);
        self.round_active = false;
    }

    /// Send `value` from `sender` to every other node: one inbox entry per
    /// receiver plus one ledger record per edge.
    fn broadcast(&mut self, sender: NodeId, kind: MessageKind, value: Value) {
        {
            let nodes = self.network.nodes_mut();
            for node in nodes.iter_mut() {
                if node.id == sender {
                    // sent_value records the prepare-phase transmission.
                    if kind == MessageKind::Prepare {
                        node.sent_value = Some(value);
                    }
                    continue;
                }
                match kind {
                    MessageKind::Prepare => node.inbox.prepare.push((sender, value)),
                    MessageKind::Commit => node.inbox.commit.push((sender, value)),
                    MessageKind::PrePrepare => {}
                }
            }
        }
        for i in 0..self.network.nodes().len() {
            let to = self.network.nodes()[i].id;
            if to != sender {
                self.record(sender, to, kind, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byzsim_types::NodeRole;

    fn ready_engine(node_count: u32, fault_count: u32, seed: u64) -> SimulationEngine {
        let config = EngineConfig {
            node_count,
            fault_count,
            ..EngineConfig::default()
        };
        let mut engine = SimulationEngine::new(config, seed);
        engine
            .initialize_network(node_count, fault_count)
            .expect("initialization");
        engine
    }

    /// Drive a full manual round, clearing the settle flag between advances.
    fn run_manual_round(engine: &mut SimulationEngine) {
        for _ in 0..3 {
            engine.advance_manual_step().expect("advance");
            engine.handle(Event::SettleElapsed {
                round: engine.round(),
            });
        }
    }

    #[test]
    fn start_without_network_reports_no_leader() {
        let mut engine = SimulationEngine::new(EngineConfig::default(), 1);
        assert_eq!(
            engine.start_round(Mode::Automatic),
            Err(EngineError::NoLeader)
        );
        assert_eq!(engine.advance_manual_step(), Err(EngineError::NoLeader));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn zero_nodes_is_an_invalid_configuration() {
        let mut engine = SimulationEngine::new(EngineConfig::default(), 1);
        assert!(matches!(
            engine.initialize_network(0, 0),
            Err(EngineError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn manual_advance_is_rejected_while_settling() {
        let mut engine = ready_engine(4, 1, 42);
        engine.advance_manual_step().expect("first advance");
        assert_eq!(
            engine.advance_manual_step(),
            Err(EngineError::ReentrantAdvance)
        );

        engine.handle(Event::SettleElapsed { round: 1 });
        assert!(engine.advance_manual_step().is_ok());
    }

    #[test]
    fn reassignment_is_rejected_mid_round() {
        let mut engine = ready_engine(4, 1, 42);
        engine.advance_manual_step().expect("advance");
        assert_eq!(
            engine.reassign_roles(),
            Err(EngineError::RoleChangeDuringRound { round: 1 })
        );
    }

    #[test]
    fn full_manual_round_reaches_consensus_under_flip() {
        let mut engine = ready_engine(4, 1, 42);
        run_manual_round(&mut engine);

        assert_eq!(engine.phase(), Phase::Idle);
        let verdict = engine.last_verdict().expect("verdict");
        assert!(verdict.reached);
        assert_eq!(verdict.value, Value::Zero);
        assert_eq!(verdict.committed.len(), 3);
        for node in engine.nodes() {
            if node.is_byzantine() {
                assert!(node.committed_value.is_none());
            } else {
                assert_eq!(node.committed_value, Some(Value::Zero));
            }
        }
    }

    #[test]
    fn fourth_advance_starts_a_fresh_round() {
        let mut engine = ready_engine(4, 1, 42);
        run_manual_round(&mut engine);
        assert_eq!(engine.round(), 1);

        engine.advance_manual_step().expect("fourth advance");
        assert_eq!(engine.round(), 2);
        assert_eq!(engine.phase(), Phase::PrePrepare);
    }

    #[test]
    fn stale_phase_timer_does_not_mutate_state() {
        let mut engine = ready_engine(4, 1, 7);
        engine.start_round(Mode::Automatic).expect("start");
        // No transition has fired yet, so nothing has been sent.
        assert_eq!(engine.message_count(), 0);

        engine.reset_network();
        assert_eq!(engine.phase(), Phase::Idle);

        // The old round's timers fire late; nothing may change.
        for target in [Phase::PrePrepare, Phase::Prepare, Phase::Commit, Phase::Idle] {
            let actions = engine.handle(Event::PhaseTimer { round: 1, target });
            assert!(actions.is_empty());
        }
        assert_eq!(engine.message_count(), 0);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn automatic_round_schedules_all_four_transitions() {
        let mut engine = ready_engine(4, 1, 7);
        let actions = engine.start_round(Mode::Automatic).expect("start");
        let timers: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                Action::SetTimer { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(timers.len(), 4);
        for target in [Phase::PrePrepare, Phase::Prepare, Phase::Commit, Phase::Idle] {
            assert!(timers.contains(&TimerId::Phase { round: 1, target }));
        }
    }

    #[test]
    fn leader_is_never_byzantine_and_proposes_zero() {
        for seed in 0..16 {
            let mut engine = ready_engine(7, 2, seed);
            engine.advance_manual_step().expect("advance");
            let leader: Vec<_> = engine.nodes().iter().filter(|n| n.is_leader()).collect();
            assert_eq!(leader.len(), 1);
            assert_eq!(leader[0].role, NodeRole::Leader);
            assert_eq!(leader[0].proposed_value, Some(Value::Zero));
        }
    }
}
