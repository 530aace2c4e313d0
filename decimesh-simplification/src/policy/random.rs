//! Random edge policy
//!
//! Picks a uniformly random vertex that still has a neighbor and joins its
//! nearest neighbor into it at their midpoint. Runs are reproducible for a
//! given seed.

use super::{Candidate, CostPolicy};
use crate::topology::{TopologyMesh, VertexId};
use decimesh_core::midpoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Contracts random vertices into their nearest neighbor.
#[derive(Debug)]
pub struct RandomPolicy<R: Rng = StdRng> {
    rng: R,
    prepared: bool,
}

impl RandomPolicy<StdRng> {
    /// Seeded standard generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomPolicy<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            prepared: false,
        }
    }
}

impl<R: Rng> CostPolicy for RandomPolicy<R> {
    type Payload = ();

    fn name(&self) -> &'static str {
        "random"
    }

    fn prepare(&mut self, mesh: &mut TopologyMesh) {
        self.prepared = true;
        debug!(vertices = mesh.vertex_count(), "Prepared random policy");
    }

    fn refresh_around(&mut self, _mesh: &mut TopologyMesh, _keep: VertexId) {}

    fn pick_next(&mut self, mesh: &TopologyMesh) -> Option<Candidate> {
        let eligible: Vec<VertexId> = mesh
            .vertices()
            .filter(|(_, v)| !v.neighbors().is_empty())
            .map(|(id, _)| id)
            .collect();
        if eligible.is_empty() {
            return None;
        }
        let keep = eligible[self.rng.gen_range(0..eligible.len())];
        let origin = mesh.position(keep);

        // First strictly closer neighbor wins, scanning in ascending id order
        let mut nearest: Option<(VertexId, f64)> = None;
        for &n in mesh.vertex(keep)?.neighbors() {
            let distance = (mesh.position(n) - origin).norm_squared();
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((n, distance));
            }
        }
        let (remove, _) = nearest?;

        Some(Candidate {
            keep,
            remove,
            position: midpoint(&origin, &mesh.position(remove)),
        })
    }

    fn on_target_reached(&mut self) -> bool {
        std::mem::replace(&mut self.prepared, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decimesh_core::{Point3d, TriangleMesh};
    use rand::rngs::mock::StepRng;

    fn v(i: usize) -> VertexId {
        VertexId::new(i)
    }

    fn make_strip() -> TopologyMesh {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(3.0, 0.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
                Point3d::new(3.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        );
        TopologyMesh::load(&mesh).unwrap()
    }

    #[test]
    fn test_nearest_neighbor_at_midpoint() {
        let mut mesh = make_strip();
        let mut policy = RandomPolicy::with_rng(StepRng::new(0, 0));
        policy.prepare(&mut mesh);

        // The zero generator always picks the first eligible vertex
        let candidate = policy.pick_next(&mesh).unwrap();
        assert_eq!(candidate.keep, v(0));
        assert_eq!(candidate.remove, v(2));
        assert_eq!(candidate.position, Point3d::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mesh = make_strip();
        let mut a = RandomPolicy::with_seed(7);
        let mut b = RandomPolicy::with_seed(7);
        for _ in 0..16 {
            assert_eq!(a.pick_next(&mesh), b.pick_next(&mesh));
        }
    }

    #[test]
    fn test_candidates_are_adjacent() {
        let mesh = make_strip();
        let mut policy = RandomPolicy::with_seed(42);
        for _ in 0..32 {
            let c = policy.pick_next(&mesh).unwrap();
            assert!(mesh.vertex(c.keep).unwrap().neighbors().contains(&c.remove));
        }
    }

    #[test]
    fn test_no_candidate_without_edges() {
        let mut mesh = make_strip();
        mesh.join_vertices(v(0), v(1), Point3d::origin());
        mesh.join_vertices(v(0), v(2), Point3d::origin());
        mesh.join_vertices(v(0), v(3), Point3d::origin());
        assert_eq!(mesh.vertex_count(), 1);

        let mut policy = RandomPolicy::with_seed(1);
        assert!(policy.pick_next(&mesh).is_none());
        assert!(!policy.on_target_reached());
    }
}
