//! Engine configuration.

use byzsim_types::{Phase, ProtocolVariant};
use std::time::Duration;

/// Relative offsets, from round start, of the automatic-mode transitions.
///
/// The final offset both finalizes the round and returns the phase to idle.
#[derive(Debug, Clone)]
pub struct PhaseSchedule {
    pub pre_prepare: Duration,
    pub prepare: Duration,
    pub commit: Duration,
    pub idle: Duration,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self {
            pre_prepare: Duration::ZERO,
            prepare: Duration::from_secs(2),
            commit: Duration::from_millis(4_500),
            idle: Duration::from_secs(6),
        }
    }
}

impl PhaseSchedule {
    /// Offset of the transition into `phase`.
    pub fn offset(&self, phase: Phase) -> Duration {
        match phase {
            Phase::PrePrepare => self.pre_prepare,
            Phase::Prepare => self.prepare,
            Phase::Commit => self.commit,
            Phase::Idle => self.idle,
        }
    }
}

/// Cumulative probability boundaries for the three-way Byzantine draw.
///
/// A uniform draw below `flip` flips the honest reference; below
/// `flip + random` it sends a fresh random value; otherwise the node stays
/// silent. Defaults are the source calibration for the prepare phase.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorBuckets {
    pub flip: f64,
    pub random: f64,
}

impl Default for BehaviorBuckets {
    fn default() -> Self {
        Self {
            flip: 0.4,
            random: 0.3,
        }
    }
}

/// Full engine configuration. A seed accompanies it at construction so runs
/// are reproducible end to end.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Total node count; must be at least 1.
    pub node_count: u32,
    /// Requested Byzantine count, clamped to `⌊(n−1)/3⌋` at assignment.
    pub fault_count: u32,
    /// Which rendition to simulate (phase labels + Byzantine policy).
    pub variant: ProtocolVariant,
    /// Automatic-mode transition offsets.
    pub schedule: PhaseSchedule,
    /// Manual-mode inter-phase settling delay; advances arriving before it
    /// elapses are rejected.
    pub settle_delay: Duration,
    /// Simulated transit duration stamped on every ledger message.
    pub transit_duration: Duration,
    /// Three-way draw calibration (ignored under the deterministic policy).
    pub behavior: BehaviorBuckets,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_count: 7,
            fault_count: 2,
            variant: ProtocolVariant::Pbft,
            schedule: PhaseSchedule::default(),
            settle_delay: Duration::from_secs(2),
            transit_duration: Duration::from_secs(1),
            behavior: BehaviorBuckets::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_matches_contract_offsets() {
        let schedule = PhaseSchedule::default();
        assert_eq!(schedule.offset(Phase::PrePrepare), Duration::ZERO);
        assert_eq!(schedule.offset(Phase::Prepare), Duration::from_secs(2));
        assert_eq!(schedule.offset(Phase::Commit), Duration::from_millis(4_500));
        assert_eq!(schedule.offset(Phase::Idle), Duration::from_secs(6));
    }

    #[test]
    fn default_buckets_leave_room_for_silence() {
        let buckets = BehaviorBuckets::default();
        assert!(buckets.flip + buckets.random < 1.0);
    }
}
