//! Quadric error metric policy
//!
//! Every triangle carries the fundamental quadric of its original plane,
//! every vertex the sum of its incident triangle quadrics, and every edge the
//! sum of its endpoint quadrics together with the point minimizing it. A
//! triangle is ranked by its cheapest edge, and that edge is the one
//! contracted when the triangle reaches the front of the queue.

use super::{Candidate, CostPolicy, QueueKey};
use crate::quadric::Quadric;
use crate::topology::{Edge, Payload, TopologyMesh, TriangleId, VertexId};
use decimesh_core::{midpoint, Point3d};
use itertools::Itertools;
use priority_queue::PriorityQueue;
use std::collections::BTreeSet;
use tracing::debug;

/// Combined quadric of an edge and the point it contracts to.
#[derive(Debug, Clone, Copy)]
pub struct EdgeTarget {
    pub quadric: Quadric,
    pub position: Point3d,
}

impl Default for EdgeTarget {
    fn default() -> Self {
        Self {
            quadric: Quadric::zero(),
            position: Point3d::origin(),
        }
    }
}

/// Payload layout of the quadric policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct QemPayload;

impl Payload for QemPayload {
    type Vertex = Quadric;
    type Triangle = Quadric;
    type Edge = EdgeTarget;
}

/// Point an edge `(a, b)` contracts to under `quadric`, with its error.
///
/// Uses the quadric minimizer when it exists, otherwise the cheapest of `a`,
/// `b` and their midpoint, preferring earlier ones on ties.
pub fn contraction_target(quadric: &Quadric, a: &Point3d, b: &Point3d) -> (Point3d, f64) {
    if let Some(p) = quadric.optimal_point() {
        return (p, quadric.evaluate(&p));
    }
    let mut best = (*a, quadric.evaluate(a));
    for p in [*b, midpoint(a, b)] {
        let cost = quadric.evaluate(&p);
        if cost < best.1 {
            best = (p, cost);
        }
    }
    best
}

/// Contracts the cheapest edge of the cheapest triangle.
#[derive(Debug, Default)]
pub struct QemPolicy {
    queue: PriorityQueue<TriangleId, QueueKey<TriangleId>>,
    prepared: bool,
}

impl QemPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    fn update_vertex(mesh: &mut TopologyMesh<QemPayload>, id: VertexId) {
        let Some(vertex) = mesh.vertex(id) else {
            return;
        };
        let quadric: Quadric = vertex
            .triangles()
            .iter()
            .filter_map(|&t| mesh.triangle(t))
            .map(|t| t.payload)
            .sum();
        let cost = quadric.evaluate(&vertex.position());
        if let Some(vertex) = mesh.vertex_mut(id) {
            vertex.payload = quadric;
            vertex.cost = cost;
        }
    }

    /// Recompute the three edges of a triangle and return its cost.
    fn update_triangle(mesh: &mut TopologyMesh<QemPayload>, id: TriangleId) -> Option<f64> {
        let triangle = mesh.triangle(id)?;
        let edges: [Edge<EdgeTarget>; 3] = std::array::from_fn(|k| {
            let (a, b) = triangle.edge_vertices(k);
            let quadric = Self::vertex_quadric(mesh, a) + Self::vertex_quadric(mesh, b);
            let (position, cost) =
                contraction_target(&quadric, &mesh.position(a), &mesh.position(b));
            Edge {
                cost,
                payload: EdgeTarget { quadric, position },
            }
        });
        let cost = edges[cheapest_edge(&edges)].cost;

        let triangle = mesh.triangle_mut(id)?;
        triangle.edges = edges;
        triangle.cost = cost;
        Some(cost)
    }

    fn vertex_quadric(mesh: &TopologyMesh<QemPayload>, id: VertexId) -> Quadric {
        mesh.vertex(id).map(|v| v.payload).unwrap_or_default()
    }
}

/// Index of the first edge with the smallest cost.
fn cheapest_edge(edges: &[Edge<EdgeTarget>; 3]) -> usize {
    edges
        .iter()
        .position_min_by(|a, b| a.cost.total_cmp(&b.cost))
        .unwrap_or(0)
}

impl CostPolicy for QemPolicy {
    type Payload = QemPayload;

    fn name(&self) -> &'static str {
        "qem"
    }

    fn prepare(&mut self, mesh: &mut TopologyMesh<QemPayload>) {
        self.queue.clear();

        let triangles: Vec<TriangleId> = mesh.triangle_ids().collect();
        for &id in &triangles {
            if let Some(triangle) = mesh.triangle_mut(id) {
                triangle.payload = triangle
                    .plane()
                    .map(|(normal, offset)| Quadric::from_plane(&normal, offset))
                    .unwrap_or_default();
            }
        }

        let vertices: Vec<VertexId> = mesh.vertex_ids().collect();
        for id in vertices {
            Self::update_vertex(mesh, id);
        }

        for id in triangles {
            if let Some(cost) = Self::update_triangle(mesh, id) {
                self.queue.push(id, QueueKey { cost, id });
            }
        }

        self.prepared = true;
        debug!(entries = self.queue.len(), "Prepared quadric queue");
    }

    fn refresh_around(&mut self, mesh: &mut TopologyMesh<QemPayload>, keep: VertexId) {
        let Some(vertex) = mesh.vertex(keep) else {
            return;
        };
        let mut affected = vec![keep];
        affected.extend(vertex.neighbors().iter().copied());

        for &id in &affected {
            Self::update_vertex(mesh, id);
        }

        let triangles: BTreeSet<TriangleId> = affected
            .iter()
            .filter_map(|&id| mesh.vertex(id))
            .flat_map(|v| v.triangles().iter().copied())
            .collect();
        for id in triangles {
            if let Some(cost) = Self::update_triangle(mesh, id) {
                self.queue.push(id, QueueKey { cost, id });
            }
        }
    }

    fn pick_next(&mut self, mesh: &TopologyMesh<QemPayload>) -> Option<Candidate> {
        loop {
            let id = self.queue.peek().map(|(&id, _)| id)?;
            let Some(triangle) = mesh.triangle(id) else {
                // Deleted since it was queued
                self.queue.pop();
                continue;
            };
            let k = cheapest_edge(&triangle.edges);
            let (keep, remove) = triangle.edge_vertices(k);
            return Some(Candidate {
                keep,
                remove,
                position: triangle.edges[k].payload.position,
            });
        }
    }

    fn on_target_reached(&mut self) -> bool {
        self.queue.clear();
        std::mem::replace(&mut self.prepared, false)
    }
}
