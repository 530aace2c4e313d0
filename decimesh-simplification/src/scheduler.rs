//! Contraction loop
//!
//! Drives a [`CostPolicy`] against a [`TopologyMesh`] until the live triangle
//! count drops to the target, reporting progress as the fraction of the
//! required triangle removals done so far.

use crate::policy::CostPolicy;
use crate::topology::TopologyMesh;
use decimesh_core::{Error, ProgressListener, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Meshes at or below this many triangles are not decimated.
pub const MIN_TRIANGLES: usize = 10;

/// Lifecycle of a [`ContractionScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub original_triangles: usize,
    pub final_triangles: usize,
    pub original_vertices: usize,
    pub final_vertices: usize,
    /// Number of vertex joins performed.
    pub contractions: usize,
}

impl RunReport {
    pub fn removed_triangles(&self) -> usize {
        self.original_triangles - self.final_triangles
    }
}

/// Runs the contraction loop.
#[derive(Debug, Default)]
pub struct ContractionScheduler {
    state: SchedulerState,
    cancel: Option<Arc<AtomicBool>>,
}

impl ContractionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `flag` before every contraction and stop with
    /// [`Error::Cancelled`] once it is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Contract `mesh` down to `target` triangles.
    ///
    /// Requires a mesh of more than [`MIN_TRIANGLES`] triangles and
    /// `0 < target < triangle count`; otherwise fails with
    /// [`Error::InvalidTarget`] before touching the mesh. The run stops the
    /// first time the count is at or below `target`, which may overshoot by
    /// the number of triangles the last join removed.
    pub fn run<C, L>(
        &mut self,
        mesh: &mut TopologyMesh<C::Payload>,
        target: usize,
        policy: &mut C,
        mut progress: L,
    ) -> Result<RunReport>
    where
        C: CostPolicy,
        L: ProgressListener,
    {
        let original_triangles = mesh.triangle_count();
        if original_triangles <= MIN_TRIANGLES {
            return Err(Error::invalid_target(
                target,
                original_triangles,
                format!("mesh must have more than {} triangles", MIN_TRIANGLES),
            ));
        }
        if target == 0 || target >= original_triangles {
            return Err(Error::invalid_target(
                target,
                original_triangles,
                "target must be positive and below the triangle count",
            ));
        }

        self.state = SchedulerState::Running;
        let stage = format!("Decimating ({})", policy.name());
        progress.on_start(&stage);
        info!(
            policy = policy.name(),
            original = original_triangles,
            target,
            "Starting mesh decimation"
        );

        let outcome = self.contract(mesh, target, policy, &mut progress);

        match &outcome {
            Ok(report) => {
                if !policy.on_target_reached() {
                    warn!("Policy finished without a prepared index");
                }
                self.state = SchedulerState::Completed;
                info!(
                    final_triangles = report.final_triangles,
                    final_vertices = report.final_vertices,
                    contractions = report.contractions,
                    "Mesh decimation complete"
                );
            }
            Err(err) => {
                self.state = SchedulerState::Failed;
                warn!(error = %err, triangles = mesh.triangle_count(), "Mesh decimation failed");
            }
        }
        progress.on_complete(&stage);
        outcome
    }

    fn contract<C, L>(
        &self,
        mesh: &mut TopologyMesh<C::Payload>,
        target: usize,
        policy: &mut C,
        progress: &mut L,
    ) -> Result<RunReport>
    where
        C: CostPolicy,
        L: ProgressListener,
    {
        let original_triangles = mesh.triangle_count();
        let original_vertices = mesh.vertex_count();
        let to_remove = original_triangles - target;

        policy.prepare(mesh);
        debug!(to_remove, "Policy prepared");

        let mut contractions = 0;
        while mesh.triangle_count() > target {
            if self.is_cancelled() {
                return Err(Error::Cancelled {
                    triangles: mesh.triangle_count(),
                });
            }

            let Some(candidate) = policy.pick_next(mesh) else {
                return Err(Error::NoCandidate {
                    triangles: mesh.triangle_count(),
                    target,
                });
            };
            trace!(
                keep = %candidate.keep,
                remove = %candidate.remove,
                "Contracting"
            );
            if !mesh.join_vertices(candidate.keep, candidate.remove, candidate.position) {
                return Err(Error::NoCandidate {
                    triangles: mesh.triangle_count(),
                    target,
                });
            }
            policy.refresh_around(mesh, candidate.keep);
            contractions += 1;

            let removed = original_triangles - mesh.triangle_count();
            progress.on_step(removed.min(to_remove), to_remove);
        }
        progress.on_step(to_remove, to_remove);

        Ok(RunReport {
            original_triangles,
            final_triangles: mesh.triangle_count(),
            original_vertices,
            final_vertices: mesh.vertex_count(),
            contractions,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AngleSumPolicy, Candidate, QemPolicy, RandomPolicy};
    use crate::topology::VertexId;
    use decimesh_core::{Point3d, ProgressLog, TriangleMesh};

    /// Gently curved `size` x `size` grid of `2 (size - 1)^2` triangles.
    fn make_grid<P: crate::topology::Payload>(size: usize) -> TopologyMesh<P> {
        let mut vertices = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let (fx, fy) = (x as f64, y as f64);
                vertices.push(Point3d::new(fx, fy, 0.05 * (fx * fx + fy * fy)));
            }
        }
        let mut faces = Vec::new();
        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let tl = y * size + x;
                let tr = tl + 1;
                let bl = tl + size;
                let br = bl + 1;
                faces.push([tl, bl, tr]);
                faces.push([tr, bl, br]);
            }
        }
        TopologyMesh::load(&TriangleMesh::from_vertices_and_faces(vertices, faces)).unwrap()
    }

    #[test]
    fn test_rejects_small_mesh() {
        // 3x3 grid: 8 triangles
        let mut mesh = make_grid(3);
        let mut scheduler = ContractionScheduler::new();
        let result =
            scheduler.run(&mut mesh, 4, &mut RandomPolicy::with_seed(0), ProgressLog::new());
        assert!(matches!(result, Err(Error::InvalidTarget { .. })));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(mesh.triangle_count(), 8);
    }

    #[test]
    fn test_rejects_out_of_range_target() {
        let mut mesh = make_grid(5);
        let count = mesh.triangle_count();
        let mut scheduler = ContractionScheduler::new();
        for target in [0, count, count + 1] {
            let mut log = ProgressLog::new();
            let result = scheduler.run(&mut mesh, target, &mut QemPolicy::new(), &mut log);
            assert!(matches!(result, Err(Error::InvalidTarget { .. })));
            assert!(log.events.is_empty());
        }
        assert_eq!(mesh.triangle_count(), count);
    }

    #[test]
    fn test_run_reaches_target() {
        let mut mesh = make_grid(6);
        let mut scheduler = ContractionScheduler::new();
        let mut log = ProgressLog::new();
        let report = scheduler
            .run(&mut mesh, 20, &mut AngleSumPolicy::new(), &mut log)
            .unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Completed);
        assert_eq!(report.original_triangles, 50);
        assert!(report.final_triangles <= 20);
        assert!(report.final_triangles > 0);
        assert_eq!(report.final_triangles, mesh.triangle_count());
        assert!(report.contractions > 0);
        assert!(mesh.check_adjacency().is_ok());

        assert!(log.check_contract().is_ok());
        let steps = log.steps();
        assert_eq!(steps.last(), Some(&(30, 30)));
        assert!(steps.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    /// Policy that never has a contraction to offer.
    struct Exhausted {
        prepared: bool,
    }

    impl CostPolicy for Exhausted {
        type Payload = ();

        fn name(&self) -> &'static str {
            "exhausted"
        }

        fn prepare(&mut self, _mesh: &mut TopologyMesh) {
            self.prepared = true;
        }

        fn refresh_around(&mut self, _mesh: &mut TopologyMesh, _keep: VertexId) {}

        fn pick_next(&mut self, _mesh: &TopologyMesh) -> Option<Candidate> {
            None
        }

        fn on_target_reached(&mut self) -> bool {
            false
        }
    }

    #[test]
    fn test_no_candidate_fails_run() {
        let mut mesh = make_grid(6);
        let mut scheduler = ContractionScheduler::new();
        let mut log = ProgressLog::new();
        let mut policy = Exhausted { prepared: false };

        let result = scheduler.run(&mut mesh, 20, &mut policy, &mut log);
        assert!(matches!(
            result,
            Err(Error::NoCandidate {
                triangles: 50,
                target: 20
            })
        ));
        assert!(policy.prepared);
        assert_eq!(scheduler.state(), SchedulerState::Failed);
        assert!(log.check_contract().is_ok());
        assert!(log.steps().is_empty());
        assert_eq!(mesh.triangle_count(), 50);
        assert_eq!(mesh.vertex_count(), 36);
        assert!(mesh.check_invariants().is_ok());
    }

    #[test]
    fn test_cancellation() {
        let mut mesh = make_grid(6);
        let flag = Arc::new(AtomicBool::new(true));
        let mut scheduler = ContractionScheduler::new().with_cancel_flag(flag.clone());
        let mut log = ProgressLog::new();

        let result = scheduler.run(&mut mesh, 20, &mut QemPolicy::new(), &mut log);
        assert!(matches!(result, Err(Error::Cancelled { triangles: 50 })));
        assert_eq!(scheduler.state(), SchedulerState::Failed);
        assert!(log.check_contract().is_ok());

        flag.store(false, Ordering::Relaxed);
        let mut policy = QemPolicy::new();
        assert!(scheduler.run(&mut mesh, 20, &mut policy, &mut log).is_ok());
        assert_eq!(scheduler.state(), SchedulerState::Completed);
    }
}
