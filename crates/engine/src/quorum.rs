//! Quorum and finalization arithmetic.
//!
//! Pure functions over `(node_count, byzantine_count)`, kept free of engine
//! state so they can be tested in isolation. The `⌊(n+f)/2⌋+1` formula is the
//! authoritative contract of the simulated protocol and is reproduced as-is.

use byzsim_types::{NodeId, Value};

/// Maximum tolerable Byzantine count for `node_count` nodes: `⌊(n−1)/3⌋`.
pub fn max_faulty(node_count: u32) -> u32 {
    node_count.saturating_sub(1) / 3
}

/// Votes a node must see (matching the proposed value) to advance a phase:
/// `⌊(n+f)/2⌋ + 1`.
pub fn required_matching(node_count: u32, byzantine_count: u32) -> usize {
    ((node_count + byzantine_count) / 2 + 1) as usize
}

/// Count inbox entries matching `value`, plus `implicit_credits` for the
/// matching messages that were never sent to the counting node itself: the
/// leader's broadcast and the node's own.
pub fn matching_votes(inbox: &[(NodeId, Value)], value: Value, implicit_credits: usize) -> usize {
    let matching = inbox.iter().filter(|(_, v)| *v == value).count();
    matching + implicit_credits
}
