//! Decimation entry point tests on closed meshes and open height fields.

use decimesh_core::{Error, NoProgress, Point3d, ProgressEvent, ProgressLog, TriangleMesh};
use decimesh_simplification::{
    decimate, DecimateOptions, Decimator, JoinPosition, MeshSimplifier, Method,
};
use std::f64::consts::{PI, TAU};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Closed UV sphere with `rings` latitude bands and `segments` longitude
/// slices: `2 * segments * (rings - 1)` triangles.
fn make_uv_sphere(rings: usize, segments: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let north = mesh.add_vertex(Point3d::new(0.0, 0.0, 1.0));
    for r in 1..rings {
        let phi = PI * r as f64 / rings as f64;
        for s in 0..segments {
            let theta = TAU * s as f64 / segments as f64;
            mesh.add_vertex(Point3d::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            ));
        }
    }
    let south = mesh.add_vertex(Point3d::new(0.0, 0.0, -1.0));

    let ring = |r: usize, s: usize| 1 + (r - 1) * segments + s % segments;
    for s in 0..segments {
        mesh.add_face([north, ring(1, s), ring(1, s + 1)]);
    }
    for r in 1..rings - 1 {
        for s in 0..segments {
            let (a, b) = (ring(r, s), ring(r, s + 1));
            let (c, d) = (ring(r + 1, s), ring(r + 1, s + 1));
            mesh.add_face([a, c, d]);
            mesh.add_face([a, d, b]);
        }
    }
    for s in 0..segments {
        mesh.add_face([south, ring(rings - 1, s + 1), ring(rings - 1, s)]);
    }
    mesh
}

/// Open `size` x `size` grid with a bumpy height.
fn make_height_field(size: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for y in 0..size {
        for x in 0..size {
            let (fx, fy) = (x as f64, y as f64);
            let z = 0.4 * (1.3 * fx).sin() * (0.9 * fy).cos() + 0.1 * ((x * 5 + y * 3) % 4) as f64;
            mesh.add_vertex(Point3d::new(fx, fy, z));
        }
    }
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let tl = y * size + x;
            let (tr, bl) = (tl + 1, tl + size);
            mesh.add_face([tl, bl, tr]);
            mesh.add_face([tr, bl, bl + 1]);
        }
    }
    mesh
}

fn unreferenced_vertices(mesh: &TriangleMesh) -> usize {
    let mut used = vec![false; mesh.vertex_count()];
    for &i in mesh.faces.iter().flatten() {
        used[i] = true;
    }
    used.into_iter().filter(|u| !u).count()
}

#[test]
fn test_sphere_fixture() {
    let sphere = make_uv_sphere(8, 12);
    assert_eq!(sphere.face_count(), 2 * 12 * 7);
    assert_eq!(sphere.vertex_count(), 2 + 7 * 12);
    assert!(sphere.validate().is_ok());
}

#[test]
fn test_every_method_reaches_target() {
    let sphere = make_uv_sphere(8, 12);
    for method in [Method::Qem, Method::AngleSum, Method::Random] {
        let options = DecimateOptions::with_target_triangles(60).method(method).seed(3);
        let result = decimate(&sphere, &options, NoProgress).unwrap();

        assert!(result.mesh.face_count() <= 60, "{method} left {}", result.mesh.face_count());
        assert!(result.mesh.face_count() > 0);
        assert!(result.mesh.validate().is_ok());
        assert_eq!(result.report.original_triangles, 168);
        assert_eq!(result.mesh.normals.as_ref().map(Vec::len), Some(result.mesh.vertex_count()));
    }
}

#[test]
fn test_qem_keeps_shape_close() {
    let sphere = make_uv_sphere(10, 16);
    let result = decimate(&sphere, &DecimateOptions::with_target_ratio(0.5), NoProgress).unwrap();
    for p in &result.mesh.vertices {
        let radius = p.coords.norm();
        assert!((0.7..=1.3).contains(&radius), "vertex drifted to radius {radius}");
    }
}

#[test]
fn test_random_is_reproducible() {
    let sphere = make_uv_sphere(6, 10);
    let options = DecimateOptions::with_target_ratio(0.5).method(Method::Random).seed(11);
    let a = decimate(&sphere, &options, NoProgress).unwrap();
    let b = decimate(&sphere, &options, NoProgress).unwrap();
    assert_eq!(a.mesh, b.mesh);
}

#[test]
fn test_angle_sum_join_positions_differ() {
    let sphere = make_uv_sphere(6, 10);
    let base = DecimateOptions::with_target_ratio(0.3).method(Method::AngleSum);
    let at_target = decimate(&sphere, &base, NoProgress).unwrap();
    let at_midpoint = decimate(
        &sphere,
        &base.clone().join_position(JoinPosition::Midpoint),
        NoProgress,
    )
    .unwrap();
    assert_ne!(at_target.mesh.vertices, at_midpoint.mesh.vertices);
}

#[test]
fn test_progress_contract() {
    let sphere = make_uv_sphere(8, 12);
    let mut log = ProgressLog::new();
    decimate(&sphere, &DecimateOptions::with_target_triangles(84), &mut log).unwrap();

    assert!(log.check_contract().is_ok());
    assert!(matches!(log.events.first(), Some(ProgressEvent::Start(_))));
    assert!(matches!(log.events.last(), Some(ProgressEvent::Complete(_))));
    let steps = log.steps();
    assert_eq!(steps.last(), Some(&(84, 84)));
    assert!(steps.iter().all(|&(current, total)| current <= total && total == 84));
}

#[test]
fn test_invalid_targets() {
    let sphere = make_uv_sphere(8, 12);
    for options in [
        DecimateOptions::with_target_triangles(0),
        DecimateOptions::with_target_triangles(168),
        DecimateOptions::with_target_ratio(0.0),
        DecimateOptions::with_target_ratio(1.5),
    ] {
        let mut log = ProgressLog::new();
        let result = decimate(&sphere, &options, &mut log);
        assert!(matches!(result, Err(Error::InvalidTarget { .. })), "{options:?}");
        assert!(log.events.is_empty());
    }
}

#[test]
fn test_too_small_mesh_is_rejected() {
    let small = make_uv_sphere(3, 3);
    assert_eq!(small.face_count(), 12);
    let open_cap = TriangleMesh::from_vertices_and_faces(
        small.vertices.clone(),
        small.faces[..10].to_vec(),
    );
    let result = decimate(&open_cap, &DecimateOptions::with_target_triangles(5), NoProgress);
    assert!(matches!(result, Err(Error::InvalidTarget { triangles: 10, .. })));
}

#[test]
fn test_cancel_flag() {
    let sphere = make_uv_sphere(8, 12);
    let decimator = Decimator::new(DecimateOptions::with_target_ratio(0.5))
        .with_cancel_flag(Arc::new(AtomicBool::new(true)));
    let result = decimator.run(&sphere, NoProgress);
    assert!(matches!(result, Err(Error::Cancelled { triangles: 168 })));
}

#[test]
fn test_degenerate_cleanup_pass() {
    let sphere = make_uv_sphere(8, 12);
    let options = DecimateOptions::with_target_ratio(0.6)
        .method(Method::Random)
        .seed(5)
        .with_degenerate_cleanup();
    let result = decimate(&sphere, &options, NoProgress).unwrap();
    assert!(result.mesh.validate().is_ok());
    assert_eq!(
        result.report.final_triangles - result.degenerate_removed,
        result.mesh.face_count()
    );
    assert_eq!(result.stats.triangles, result.mesh.face_count());
    assert_eq!(unreferenced_vertices(&result.mesh), 0);
}

#[test]
fn test_open_surface_output_has_no_loose_vertices() {
    let field = make_height_field(12);
    assert_eq!(field.face_count(), 242);
    assert_eq!(unreferenced_vertices(&field), 0);

    for method in [Method::Qem, Method::AngleSum, Method::Random] {
        for seed in 0..8 {
            for ratio in [0.8, 0.9, 0.95] {
                let options = DecimateOptions::with_target_ratio(ratio).method(method).seed(seed);
                let result = decimate(&field, &options, NoProgress).unwrap();
                assert!(result.mesh.validate().is_ok());
                assert_eq!(
                    unreferenced_vertices(&result.mesh),
                    0,
                    "{method} seed {seed} ratio {ratio}"
                );
                assert_eq!(
                    result.mesh.vertex_count(),
                    result.stats.vertices - result.stats.isolated_vertices
                );
                assert_eq!(
                    result.mesh.normals.as_ref().map(Vec::len),
                    Some(result.mesh.vertex_count())
                );
            }
        }
    }
}

#[test]
fn test_mesh_simplifier_trait() {
    let sphere = make_uv_sphere(8, 12);
    let simplifier = Decimator::default();
    let result = simplifier.simplify(&sphere, 0.5).unwrap();
    assert!(result.face_count() <= 84);
    assert!(simplifier.simplify(&sphere, 0.0).is_err());
}
