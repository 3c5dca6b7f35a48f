//! Network model: the node set and its role assignment.
//!
//! The model exclusively owns node identity and roles. Assignment outcomes
//! are returned as plain data; the engine turns them into notifications.

use crate::quorum;
use byzsim_types::{Node, NodeId, NodeRole, Value};
use rand::Rng;
use tracing::debug;

/// Result of a role (re)assignment, reported back to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Set when the requested fault count exceeded `⌊(n−1)/3⌋`.
    pub clamped: Option<ClampedFaults>,
    pub byzantine: Vec<NodeId>,
    /// `None` only when no honest node remained to take the role.
    pub leader: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedFaults {
    pub requested: u32,
    pub effective: u32,
    pub tolerance: u32,
}

/// The node set and its current assignment.
#[derive(Debug, Clone, Default)]
pub struct NetworkModel {
    nodes: Vec<Node>,
}

impl NetworkModel {
    /// Create `node_count` nodes with random initial values and assign roles.
    pub fn initialize<R: Rng + ?Sized>(
        node_count: u32,
        requested_faults: u32,
        rng: &mut R,
    ) -> (Self, RoleAssignment) {
        let nodes = (0..node_count)
            .map(|i| Node::new(NodeId(i), Value::random(rng)))
            .collect();
        let mut model = Self { nodes };
        let assignment = model.assign_roles(requested_faults, rng);
        (model, assignment)
    }

    /// Reset every node to honest with cleared round state, then repeat the
    /// Byzantine and leader selection. Initial values are re-randomized.
    pub fn reassign_roles<R: Rng + ?Sized>(
        &mut self,
        requested_faults: u32,
        rng: &mut R,
    ) -> RoleAssignment {
        for node in &mut self.nodes {
            node.role = NodeRole::Honest;
            node.initial_value = Value::random(rng);
            node.reset_round_state();
        }
        self.assign_roles(requested_faults, rng)
    }

    fn assign_roles<R: Rng + ?Sized>(
        &mut self,
        requested_faults: u32,
        rng: &mut R,
    ) -> RoleAssignment {
        let node_count = self.nodes.len() as u32;
        let tolerance = quorum::max_faulty(node_count);
        let effective = requested_faults.min(tolerance);
        let clamped = (effective != requested_faults).then_some(ClampedFaults {
            requested: requested_faults,
            effective,
            tolerance,
        });

        let byzantine: Vec<NodeId> =
            random_distinct_indices(node_count as usize, effective as usize, rng)
                .into_iter()
                .map(|i| {
                    self.nodes[i].role = NodeRole::Byzantine;
                    self.nodes[i].id
                })
                .collect();

        let honest: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.role == NodeRole::Honest)
            .map(|(i, _)| i)
            .collect();

        let leader = if honest.is_empty() {
            None
        } else {
            let pick = honest[rng.gen_range(0..honest.len())];
            let node = &mut self.nodes[pick];
            node.role = NodeRole::Leader;
            node.initial_value = Value::CANONICAL;
            Some(node.id)
        };

        debug!(
            node_count,
            effective_faults = effective,
            ?byzantine,
            ?leader,
            "assigned node roles"
        );

        RoleAssignment {
            clamped,
            byzantine,
            leader,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn byzantine_count(&self) -> u32 {
        self.nodes.iter().filter(|n| n.is_byzantine()).count() as u32
    }

    /// Count of honest nodes, leader included.
    pub fn loyal_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_byzantine()).count()
    }

    pub fn leader(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_leader())
    }

    pub fn leader_id(&self) -> Option<NodeId> {
        self.leader().map(|n| n.id)
    }

    /// Clear the per-round fields of every node.
    pub fn reset_round_state(&mut self) {
        for node in &mut self.nodes {
            node.reset_round_state();
        }
    }
}

/// Uniform sampling without replacement, returned in ascending order.
pub fn random_distinct_indices<R: Rng + ?Sized>(
    total: usize,
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    let mut available: Vec<usize> = (0..total).collect();
    let mut picked = Vec::with_capacity(count.min(total));
    for _ in 0..count.min(total) {
        let slot = rng.gen_range(0..available.len());
        picked.push(available.swap_remove(slot));
    }
    picked.sort_unstable();
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn distinct_indices_are_unique_and_ascending() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let picked = random_distinct_indices(10, 4, &mut rng);
            assert_eq!(picked.len(), 4);
            assert!(picked.windows(2).all(|w| w[0] < w[1]));
            assert!(picked.iter().all(|&i| i < 10));
        }
    }

    #[test]
    fn distinct_indices_saturate_at_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let picked = random_distinct_indices(3, 10, &mut rng);
        assert_eq!(picked, vec![0, 1, 2]);
    }

    #[test]
    fn fault_count_is_clamped_for_every_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for n in 1..=30u32 {
            let (model, assignment) = NetworkModel::initialize(n, n, &mut rng);
            let bound = quorum::max_faulty(n);
            assert!(model.byzantine_count() <= bound);
            if n.min(bound) != n {
                let clamp = assignment.clamped.expect("over-request must report clamp");
                assert_eq!(clamp.effective, bound);
                assert_eq!(clamp.requested, n);
            }
        }
    }

    #[test]
    fn exactly_one_leader_pinned_to_canonical_value() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let (model, assignment) = NetworkModel::initialize(7, 2, &mut rng);
            let leaders: Vec<_> = model.nodes().iter().filter(|n| n.is_leader()).collect();
            assert_eq!(leaders.len(), 1);
            assert_eq!(leaders[0].initial_value, Value::CANONICAL);
            assert_eq!(assignment.leader, Some(leaders[0].id));
            assert!(!assignment.byzantine.contains(&leaders[0].id));
        }
    }

    #[test]
    fn single_node_network_is_its_own_leader() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let (model, assignment) = NetworkModel::initialize(1, 5, &mut rng);
        assert_eq!(model.byzantine_count(), 0);
        assert_eq!(assignment.leader, Some(NodeId(0)));
    }

    #[test]
    fn reassign_clears_round_state_and_redraws_roles() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let (mut model, _) = NetworkModel::initialize(7, 2, &mut rng);
        model.nodes_mut()[0].committed_value = Some(Value::One);
        model.nodes_mut()[0].inbox.prepare.push((NodeId(1), Value::One));

        let assignment = model.reassign_roles(2, &mut rng);

        assert_eq!(model.byzantine_count(), 2);
        assert!(assignment.leader.is_some());
        for node in model.nodes() {
            assert!(node.committed_value.is_none());
            assert!(node.inbox.prepare.is_empty());
        }
    }

    #[test]
    fn same_seed_assigns_same_roles() {
        let mut a = ChaCha8Rng::seed_from_u64(33);
        let mut b = ChaCha8Rng::seed_from_u64(33);
        let (model_a, asg_a) = NetworkModel::initialize(10, 3, &mut a);
        let (model_b, asg_b) = NetworkModel::initialize(10, 3, &mut b);
        assert_eq!(asg_a, asg_b);
        for (x, y) in model_a.nodes().iter().zip(model_b.nodes()) {
            assert_eq!(x.role, y.role);
            assert_eq!(x.initial_value, y.initial_value);
        }
    }
}
