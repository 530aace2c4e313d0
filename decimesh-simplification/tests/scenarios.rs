//! End-to-end decimation scenarios with hand-checked outcomes.

use decimesh_core::{Point3d, ProgressLog, TriangleMesh};
use decimesh_simplification::{
    ContractionScheduler, CostPolicy, QemPolicy, RandomPolicy, SchedulerState, TopologyMesh,
    TriangleId, VertexId,
};
use rand::rngs::mock::StepRng;

fn v(i: usize) -> VertexId {
    VertexId::new(i)
}

/// Unit cube, 8 vertices and 12 outward-facing triangles.
fn make_cube() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
            Point3d::new(0.0, 0.0, 1.0),
            Point3d::new(1.0, 0.0, 1.0),
            Point3d::new(1.0, 1.0, 1.0),
            Point3d::new(0.0, 1.0, 1.0),
        ],
        vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ],
    )
}

fn make_quad() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
}

#[test]
fn cube_to_six_triangles_with_random_policy() {
    let mut mesh = TopologyMesh::<()>::load(&make_cube()).unwrap();
    // A zero generator always picks the lowest eligible vertex, so vertex 0
    // absorbs its nearest neighbor three times: 1, then 2, then 3.
    let mut policy = RandomPolicy::with_rng(StepRng::new(0, 0));
    let mut scheduler = ContractionScheduler::new();
    let mut log = ProgressLog::new();

    let report = scheduler.run(&mut mesh, 6, &mut policy, &mut log).unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Completed);
    assert_eq!(report.contractions, 3);
    assert_eq!(mesh.triangle_count(), 6);
    assert_eq!(mesh.vertex_count(), 5);
    for dead in [1, 2, 3] {
        assert!(!mesh.is_vertex_live(v(dead)));
    }
    assert_eq!(mesh.position(v(0)), Point3d::new(0.375, 0.75, 0.0));

    assert!(mesh.check_invariants().is_ok());
    for (_, triangle) in mesh.triangles() {
        assert!(triangle.area() > 0.0);
    }

    assert!(log.check_contract().is_ok());
    assert_eq!(log.steps(), vec![(2, 6), (4, 6), (6, 6), (6, 6)]);

    let saved = mesh.save();
    assert_eq!(saved.vertices.len(), 5);
    assert_eq!(saved.faces.len(), 6);
    assert!(saved.validate().is_ok());
}

#[test]
fn quad_collapses_to_one_triangle_with_qem() {
    let mut mesh = TopologyMesh::load(&make_quad()).unwrap();
    let mut policy = QemPolicy::new();
    policy.prepare(&mut mesh);

    let candidate = policy.pick_next(&mesh).unwrap();
    assert_eq!((candidate.keep, candidate.remove), (v(0), v(1)));
    assert!(mesh.join_vertices(candidate.keep, candidate.remove, candidate.position));
    policy.refresh_around(&mut mesh, candidate.keep);

    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.vertex_count(), 3);
    assert!(mesh.is_triangle_live(TriangleId::new(1)));
    assert!(mesh.check_invariants().is_ok());
    assert!(policy.on_target_reached());
}
