//! Deterministic simulation runner.
//!
//! Owns the scheduled-event queue over simulated time and executes the
//! engine's actions: timers become queued events, cancellations remove them,
//! and emitted notifications are captured for subscribers. Given the same
//! configuration and seed, a run produces identical results every time.

use crate::event_queue::EventKey;
use byzsim_core::{Action, EngineError, Event, LogEvent, TimerId};
use byzsim_types::Mode;
use byzsim_engine::{EngineConfig, SimulationEngine};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, trace};

/// Statistics collected while running.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunnerStats {
    /// Scheduled events processed.
    pub events_processed: u64,
    /// Timers set by the engine.
    pub timers_set: u64,
    /// Timers cancelled before firing.
    pub timers_cancelled: u64,
    /// Notifications captured.
    pub notifications: u64,
}

/// Drives a [`SimulationEngine`] through simulated time.
pub struct SimulationRunner {
    engine: SimulationEngine,

    /// Scheduled events, ordered deterministically.
    queue: BTreeMap<EventKey, Event>,

    /// Timer registry for cancellation support.
    timers: HashMap<TimerId, EventKey>,

    /// Sequence counter for deterministic ordering.
    sequence: u64,

    /// Current simulated time.
    now: Duration,

    /// Captured notification stream, in emission order.
    log: Vec<LogEvent>,

    stats: RunnerStats,
}

impl SimulationRunner {
    /// Create a runner and initialize the engine's network from the config.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, EngineError> {
        let node_count = config.node_count;
        let fault_count = config.fault_count;
        let mut runner = Self {
            engine: SimulationEngine::new(config, seed),
            queue: BTreeMap::new(),
            timers: HashMap::new(),
            sequence: 0,
            now: Duration::ZERO,
            log: Vec::new(),
            stats: RunnerStats::default(),
        };
        runner.initialize_network(node_count, fault_count)?;
        Ok(runner)
    }

    // ─── Command surface (mirrors the engine 1:1) ───

    pub fn initialize_network(
        &mut self,
        node_count: u32,
        fault_count: u32,
    ) -> Result<(), EngineError> {
        self.engine.set_time(self.now);
        let result = self.engine.initialize_network(node_count, fault_count);
        self.finish_command(result)
    }

    pub fn reassign_roles(&mut self) -> Result<(), EngineError> {
        self.engine.set_time(self.now);
        let result = self.engine.reassign_roles();
        self.finish_command(result)
    }

    pub fn start_round(&mut self, mode: Mode) -> Result<(), EngineError> {
        self.engine.set_time(self.now);
        let result = self.engine.start_round(mode);
        self.finish_command(result)
    }

    pub fn advance_manual_step(&mut self) -> Result<(), EngineError> {
        self.engine.set_time(self.now);
        let result = self.engine.advance_manual_step();
        self.finish_command(result)
    }

    pub fn reset_network(&mut self) {
        self.engine.set_time(self.now);
        let actions = self.engine.reset_network();
        self.apply(actions);
    }

    // ─── Time ───

    /// Process queued events until `end_time` (inclusive), advancing the
    /// simulated clock to each event's scheduled instant.
    pub fn run_until(&mut self, end_time: Duration) {
        while let Some((&key, _)) = self.queue.first_key_value() {
            if key.time > end_time {
                break;
            }
            // Pop the next event
            let (key, event) = self.queue.pop_first().unwrap();
            self.now = key.time;
            self.timers.retain(|_, k| *k != key);

            trace!(time = ?self.now, ?event, "processing event");
            self.stats.events_processed += 1;

            self.engine.set_time(self.now);
            let actions = self.engine.handle(event);
            self.apply(actions);
        }
        if end_time > self.now {
            self.now = end_time;
        }
        self.engine.set_time(self.now);
    }

    /// Advance the clock by `duration`, processing everything due.
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.now + duration;
        self.run_until(end);
    }

    /// Run until no scheduled events remain.
    pub fn run_to_completion(&mut self) {
        while let Some((&key, _)) = self.queue.first_key_value() {
            self.run_until(key.time);
        }
    }

    // ─── Queries ───

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn stats(&self) -> &RunnerStats {
        &self.stats
    }

    /// The captured notification stream since the last drain.
    pub fn notifications(&self) -> &[LogEvent] {
        &self.log
    }

    /// Take the captured notifications, leaving the buffer empty.
    pub fn drain_notifications(&mut self) -> Vec<LogEvent> {
        std::mem::take(&mut self.log)
    }

    /// Number of events still scheduled.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Drop fully-transited ledger messages at the current time.
    pub fn expire_messages(&mut self) {
        self.engine.set_time(self.now);
        self.engine.expire_messages();
    }

    // ─── Internals ───

    fn finish_command(
        &mut self,
        result: Result<Vec<Action>, EngineError>,
    ) -> Result<(), EngineError> {
        match result {
            Ok(actions) => {
                self.apply(actions);
                Ok(())
            }
            Err(err) => {
                // Failures are reported typed to the caller and echoed onto
                // the notification stream.
                debug!(%err, "command rejected");
                self.push_notification(LogEvent::from(&err));
                Err(err)
            }
        }
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::SetTimer { id, delay } => {
                    self.sequence += 1;
                    let key = EventKey::new(self.now + delay, self.sequence);
                    // Re-arming a timer replaces its pending firing.
                    if let Some(old) = self.timers.insert(id, key) {
                        self.queue.remove(&old);
                    }
                    self.queue.insert(key, id.into_event());
                    self.stats.timers_set += 1;
                }
                Action::CancelTimer { id } => {
                    if let Some(key) = self.timers.remove(&id) {
                        self.queue.remove(&key);
                        self.stats.timers_cancelled += 1;
                    }
                }
                Action::Emit(event) => self.push_notification(event),
            }
        }
    }

    fn push_notification(&mut self, event: LogEvent) {
        trace!(?event, severity = ?event.severity(), "notification");
        self.stats.notifications += 1;
        self.log.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_runner_reports_initialization() {
        let config = EngineConfig {
            node_count: 4,
            fault_count: 1,
            ..EngineConfig::default()
        };
        let runner = SimulationRunner::new(config, 42).expect("runner");
        assert!(runner
            .notifications()
            .iter()
            .any(|e| matches!(e, LogEvent::NetworkInitialized { node_count: 4, .. })));
        assert_eq!(runner.pending_events(), 0);
    }

    #[test]
    fn rejected_commands_still_notify() {
        let config = EngineConfig {
            node_count: 4,
            fault_count: 1,
            ..EngineConfig::default()
        };
        let mut runner = SimulationRunner::new(config, 42).expect("runner");
        runner.advance_manual_step().expect("first advance");

        let err = runner.advance_manual_step().expect_err("busy");
        assert_eq!(err, EngineError::ReentrantAdvance);
        assert!(runner
            .notifications()
            .iter()
            .any(|e| matches!(e, LogEvent::AdvanceRejected)));
    }

    #[test]
    fn cancelling_removes_the_queued_event() {
        let config = EngineConfig {
            node_count: 4,
            fault_count: 1,
            ..EngineConfig::default()
        };
        let mut runner = SimulationRunner::new(config, 42).expect("runner");
        runner.start_round(Mode::Automatic).expect("start");
        assert!(runner.pending_events() > 0);

        runner.reset_network();
        assert_eq!(runner.pending_events(), 0);
        assert!(runner.stats().timers_cancelled > 0);
    }
}
