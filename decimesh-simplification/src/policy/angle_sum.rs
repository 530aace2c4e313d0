//! Angle-sum policy
//!
//! The corner angles around a vertex of a flat region add up to a full turn.
//! A vertex whose angle sum stays close to `2π` sits on flat surface and can
//! be removed with little visible change, so the cost of a vertex is
//! `|Σ angles / 2π - 1|`.

use super::{Candidate, CostPolicy, QueueKey};
use crate::topology::{TopologyMesh, VertexId};
use decimesh_core::midpoint;
use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::debug;

/// Where the surviving vertex of a contraction is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinPosition {
    /// At the removed vertex.
    Source,
    /// At the kept neighbor.
    #[default]
    Target,
    /// Halfway between the two.
    Midpoint,
}

/// Removes the flattest vertex into its flattest neighbor.
#[derive(Debug, Default)]
pub struct AngleSumPolicy {
    join_position: JoinPosition,
    queue: PriorityQueue<VertexId, QueueKey<VertexId>>,
    prepared: bool,
}

impl AngleSumPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_join_position(join_position: JoinPosition) -> Self {
        Self {
            join_position,
            ..Self::default()
        }
    }

    pub fn join_position(&self) -> JoinPosition {
        self.join_position
    }

    /// Deviation of the angle sum at `id` from a full turn.
    ///
    /// A vertex without triangles has an angle sum of zero and so a cost of 1.
    pub fn vertex_cost(mesh: &TopologyMesh, id: VertexId) -> f64 {
        (mesh.angle_sum(id) / TAU - 1.0).abs()
    }

    fn update(&mut self, mesh: &mut TopologyMesh, id: VertexId) {
        if !mesh.is_vertex_live(id) {
            return;
        }
        let cost = Self::vertex_cost(mesh, id);
        if let Some(vertex) = mesh.vertex_mut(id) {
            vertex.cost = cost;
        }
        self.queue.push(id, QueueKey { cost, id });
    }
}

impl CostPolicy for AngleSumPolicy {
    type Payload = ();

    fn name(&self) -> &'static str {
        "angle-sum"
    }

    fn prepare(&mut self, mesh: &mut TopologyMesh) {
        self.queue.clear();
        let vertices: Vec<VertexId> = mesh.vertex_ids().collect();
        for id in vertices {
            self.update(mesh, id);
        }
        self.prepared = true;
        debug!(entries = self.queue.len(), "Prepared angle-sum queue");
    }

    fn refresh_around(&mut self, mesh: &mut TopologyMesh, keep: VertexId) {
        let Some(vertex) = mesh.vertex(keep) else {
            return;
        };
        let mut affected = vec![keep];
        affected.extend(vertex.neighbors().iter().copied());
        for id in affected {
            self.update(mesh, id);
        }
    }

    fn pick_next(&mut self, mesh: &TopologyMesh) -> Option<Candidate> {
        loop {
            let remove = self.queue.peek().map(|(&id, _)| id)?;
            let Some(vertex) = mesh.vertex(remove) else {
                self.queue.pop();
                continue;
            };
            // Ties go to the lowest id since neighbors iterate in ascending order
            let keep = vertex
                .neighbors()
                .iter()
                .filter_map(|&n| mesh.vertex(n).map(|v| (n, v.cost)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(n, _)| n);
            let Some(keep) = keep else {
                // Nothing to join with
                self.queue.pop();
                continue;
            };

            let source = vertex.position();
            let target = mesh.position(keep);
            let position = match self.join_position {
                JoinPosition::Source => source,
                JoinPosition::Target => target,
                JoinPosition::Midpoint => midpoint(&source, &target),
            };
            return Some(Candidate {
                keep,
                remove,
                position,
            });
        }
    }

    fn on_target_reached(&mut self) -> bool {
        self.queue.clear();
        std::mem::replace(&mut self.prepared, false)
    }
}
