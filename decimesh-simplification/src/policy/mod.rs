//! Contraction cost policies
//!
//! A policy decides which pair of vertices to contract next and where the
//! surviving vertex goes. The scheduler drives it through four calls:
//! [`CostPolicy::prepare`] once, then [`CostPolicy::pick_next`] and
//! [`CostPolicy::refresh_around`] per contraction, and finally
//! [`CostPolicy::on_target_reached`].

pub mod angle_sum;
pub mod qem;
pub mod random;

pub use angle_sum::{AngleSumPolicy, JoinPosition};
pub use qem::{EdgeTarget, QemPayload, QemPolicy};
pub use random::RandomPolicy;

use crate::topology::{Payload, TopologyMesh, VertexId};
use decimesh_core::Point3d;
use std::cmp::Ordering;

/// A proposed contraction: `remove` is joined into `keep`, which moves to
/// `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub keep: VertexId,
    pub remove: VertexId,
    pub position: Point3d,
}

/// Strategy driving the contraction loop.
pub trait CostPolicy {
    /// Per-element data this policy stores on the mesh.
    type Payload: Payload;

    /// Short name used in progress stages and logs.
    fn name(&self) -> &'static str;

    /// Compute every cost and build the priority index.
    fn prepare(&mut self, mesh: &mut TopologyMesh<Self::Payload>);

    /// Recompute the costs a contraction into `keep` may have changed.
    fn refresh_around(&mut self, mesh: &mut TopologyMesh<Self::Payload>, keep: VertexId);

    /// Choose the next contraction, or `None` if nothing is left to contract.
    fn pick_next(&mut self, mesh: &TopologyMesh<Self::Payload>) -> Option<Candidate>;

    /// Release the priority index. Returns whether one was held.
    fn on_target_reached(&mut self) -> bool;
}

/// Priority of an entry in a cost queue.
///
/// Ordered so that the smallest cost ranks highest, with ties going to the
/// smallest id; `PriorityQueue` pops the highest priority first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueueKey<I> {
    pub cost: f64,
    pub id: I,
}

impl<I: Ord> PartialEq for QueueKey<I> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<I: Ord> Eq for QueueKey<I> {}

impl<I: Ord> PartialOrd for QueueKey<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: Ord> Ord for QueueKey<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first, then smallest id
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.id.cmp(&self.id))
    }
}
