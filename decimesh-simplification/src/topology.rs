//! Arena-backed triangle mesh with explicit adjacency
//!
//! Vertices and triangles live in two arenas addressed by [`VertexId`] and
//! [`TriangleId`]. Each vertex keeps the set of triangles it belongs to and
//! the set of vertices it shares an edge with; both sets are ordered so that
//! every traversal, and therefore every decimation run, is deterministic.
//!
//! Slots are never reused: deleting a vertex or triangle leaves an empty slot
//! behind, so ids stay valid (and dead) for the lifetime of the store.
//!
//! Each element carries a policy-defined payload selected at compile time
//! through the [`Payload`] trait; `()` is the empty payload.

use decimesh_core::{
    centroid, triangle_area, triangle_normal, triangle_perimeter, Point3d, Result, TriangleMesh,
    Vector3d,
};
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Area at or below which a triangle counts as degenerate.
pub const DEFAULT_DEGENERATE_EPSILON: f64 = 1e-5;

const INVALID: usize = usize::MAX;

// ============================================================
// Identifiers and payloads
// ============================================================

/// Stable identifier of a vertex slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(usize);

impl VertexId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Stable identifier of a triangle slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriangleId(usize);

impl TriangleId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TriangleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Per-element data attached by a cost policy.
pub trait Payload: fmt::Debug + Clone {
    type Vertex: fmt::Debug + Clone + Default;
    type Triangle: fmt::Debug + Clone + Default;
    type Edge: fmt::Debug + Clone + Default;
}

impl Payload for () {
    type Vertex = ();
    type Triangle = ();
    type Edge = ();
}

// ============================================================
// Elements
// ============================================================

/// A mesh vertex.
#[derive(Debug, Clone)]
pub struct Vertex<P: Payload> {
    position: Point3d,
    normal: Vector3d,
    index: Option<usize>,
    triangles: BTreeSet<TriangleId>,
    neighbors: BTreeSet<VertexId>,
    /// Policy-defined cost.
    pub cost: f64,
    pub payload: P::Vertex,
}

impl<P: Payload> Vertex<P> {
    fn new(position: Point3d) -> Self {
        Self {
            position,
            normal: Vector3d::zeros(),
            index: None,
            triangles: BTreeSet::new(),
            neighbors: BTreeSet::new(),
            cost: 0.0,
            payload: P::Vertex::default(),
        }
    }

    pub fn position(&self) -> Point3d {
        self.position
    }

    /// Normalized sum of the incident triangle normals.
    pub fn normal(&self) -> Vector3d {
        self.normal
    }

    /// Output index assigned by the last [`TopologyMesh::save`].
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn triangles(&self) -> &BTreeSet<TriangleId> {
        &self.triangles
    }

    pub fn neighbors(&self) -> &BTreeSet<VertexId> {
        &self.neighbors
    }
}

/// One of the three edges of a triangle.
#[derive(Debug, Clone, Default)]
pub struct Edge<E> {
    pub cost: f64,
    pub payload: E,
}

/// A mesh triangle.
///
/// Edge `k` joins corner `k` to corner `(k + 1) % 3`.
#[derive(Debug, Clone)]
pub struct Triangle<P: Payload> {
    vertices: [VertexId; 3],
    normal: Option<Vector3d>,
    centroid: Point3d,
    area: f64,
    perimeter: f64,
    /// Policy-defined cost.
    pub cost: f64,
    pub payload: P::Triangle,
    pub edges: [Edge<P::Edge>; 3],
}

impl<P: Payload> Triangle<P> {
    fn new(vertices: [VertexId; 3]) -> Self {
        Self {
            vertices,
            normal: None,
            centroid: Point3d::origin(),
            area: 0.0,
            perimeter: 0.0,
            cost: 0.0,
            payload: P::Triangle::default(),
            edges: Default::default(),
        }
    }

    pub fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Corner slot holding `vertex`.
    pub fn corner_of(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    /// Endpoints of edge `k`.
    pub fn edge_vertices(&self, k: usize) -> (VertexId, VertexId) {
        (self.vertices[k % 3], self.vertices[(k + 1) % 3])
    }

    /// Unit normal, `None` for a degenerate triangle.
    pub fn normal(&self) -> Option<Vector3d> {
        self.normal
    }

    pub fn centroid(&self) -> Point3d {
        self.centroid
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    /// Supporting plane as `(n, d)` with `n·p + d = 0`.
    pub fn plane(&self) -> Option<(Vector3d, f64)> {
        self.normal.map(|n| (n, -n.dot(&self.centroid.coords)))
    }
}

// ============================================================
// Diagnostics
// ============================================================

/// Broken topology found by [`TopologyMesh::check_invariants`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyViolation {
    #[error("{vertex} lists itself as a neighbor")]
    SelfNeighbor { vertex: VertexId },

    #[error("{vertex} lists dead neighbor {neighbor}")]
    DeadNeighbor { vertex: VertexId, neighbor: VertexId },

    #[error("{a} lists {b} as a neighbor but not the other way around")]
    AsymmetricNeighbors { a: VertexId, b: VertexId },

    #[error("{vertex} lists {triangle}, which is dead or does not contain it")]
    StaleIncidence { vertex: VertexId, triangle: TriangleId },

    #[error("{triangle} repeats a corner")]
    DuplicateCorner { triangle: TriangleId },

    #[error("{triangle} references dead {vertex}")]
    DeadCorner { triangle: TriangleId, vertex: VertexId },

    #[error("{vertex} does not list its {triangle}")]
    MissingIncidence { triangle: TriangleId, vertex: VertexId },

    #[error("{a} and {b} share {triangle} but are not neighbors")]
    MissingNeighbor { triangle: TriangleId, a: VertexId, b: VertexId },

    #[error("live counts are out of sync: {counted} counted, {recorded} recorded")]
    CountMismatch { counted: usize, recorded: usize },

    #[error("{vertex} is live but belongs to no triangle")]
    IsolatedVertex { vertex: VertexId },
}

/// Minimum, mean and maximum of a per-vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DegreeStats {
    pub min: usize,
    pub mean: f64,
    pub max: usize,
}

impl DegreeStats {
    fn from_counts(counts: impl Iterator<Item = usize>) -> Self {
        let (mut min, mut max, mut sum, mut n) = (usize::MAX, 0, 0, 0);
        for c in counts {
            min = min.min(c);
            max = max.max(c);
            sum += c;
            n += 1;
        }
        if n == 0 {
            return Self::default();
        }
        Self {
            min,
            mean: sum as f64 / n as f64,
            max,
        }
    }
}

impl fmt::Display for DegreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "min = {}, avg = {:.2}, max = {}", self.min, self.mean, self.max)
    }
}

/// Summary of a mesh store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStats {
    pub vertices: usize,
    pub triangles: usize,
    /// Live vertices without any incident triangle.
    pub isolated_vertices: usize,
    /// Triangles with area at or below [`DEFAULT_DEGENERATE_EPSILON`].
    pub degenerate_triangles: usize,
    pub surface_area: f64,
    pub vertex_triangles: DegreeStats,
    pub vertex_neighbors: DegreeStats,
}

impl fmt::Display for MeshStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} triangles, area {:.6}",
            self.vertices, self.triangles, self.surface_area
        )?;
        if self.isolated_vertices > 0 {
            write!(f, ", {} isolated vertices", self.isolated_vertices)?;
        }
        if self.degenerate_triangles > 0 {
            write!(f, ", {} degenerate triangles", self.degenerate_triangles)?;
        }
        Ok(())
    }
}

impl MeshStats {
    /// Multi-line report including the per-vertex degree ranges.
    pub fn dump(&self) -> String {
        format!(
            "{}\n - vertex triangles [{}]\n - vertex neighbors [{}]",
            self, self.vertex_triangles, self.vertex_neighbors
        )
    }
}

// ============================================================
// Mesh store
// ============================================================

/// Mutable triangle mesh supporting vertex-pair contraction.
#[derive(Debug, Clone)]
pub struct TopologyMesh<P: Payload = ()> {
    vertices: Vec<Option<Vertex<P>>>,
    triangles: Vec<Option<Triangle<P>>>,
    live_vertices: usize,
    live_triangles: usize,
}

impl<P: Payload> Default for TopologyMesh<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> TopologyMesh<P> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            live_vertices: 0,
            live_triangles: 0,
        }
    }

    /// Build the store from a flat mesh.
    ///
    /// Vertex and triangle ids equal the positions in the input arrays.
    /// Input vertices not referenced by any triangle are left dead.
    pub fn load(mesh: &TriangleMesh) -> Result<Self> {
        mesh.validate()?;

        let mut store = Self::new();
        store.vertices = mesh
            .vertices
            .iter()
            .map(|&p| Some(Vertex::new(p)))
            .collect();
        store.live_vertices = store.vertices.len();
        store.triangles.reserve(mesh.faces.len());

        for face in &mesh.faces {
            store.add_triangle(face.map(VertexId));
        }

        let mut unreferenced = 0;
        for slot in store.vertices.iter_mut() {
            if slot.as_ref().is_some_and(|v| v.triangles.is_empty()) {
                *slot = None;
                unreferenced += 1;
            }
        }
        store.live_vertices -= unreferenced;
        if unreferenced > 0 {
            debug!(unreferenced, "Dropped vertices not referenced by any triangle");
        }

        let ids: Vec<VertexId> = store.vertex_ids().collect();
        for id in ids {
            store.refresh_vertex_normal(id);
        }

        debug!(
            vertices = store.live_vertices,
            triangles = store.live_triangles,
            "Loaded mesh topology"
        );
        Ok(store)
    }

    /// Export live elements as a flat mesh with vertex normals.
    ///
    /// Vertices that belong to at least one triangle receive consecutive
    /// 0-based indices in ascending id order; the assigned index is also
    /// recorded on each vertex. Isolated vertices are left out and their
    /// index is cleared.
    pub fn save(&mut self) -> TriangleMesh {
        let mut remap = vec![INVALID; self.vertices.len()];
        let mut positions = Vec::with_capacity(self.live_vertices);
        let mut normals = Vec::with_capacity(self.live_vertices);

        for (slot, vertex) in self.vertices.iter_mut().enumerate() {
            if let Some(vertex) = vertex {
                if vertex.triangles.is_empty() {
                    vertex.index = None;
                    continue;
                }
                let index = positions.len();
                vertex.index = Some(index);
                remap[slot] = index;
                positions.push(vertex.position);
                normals.push(vertex.normal);
            }
        }

        let faces: Vec<[usize; 3]> = self
            .triangles
            .iter()
            .flatten()
            .map(|t| t.vertices.map(|v| remap[v.0]))
            .collect();
        debug_assert!(faces.iter().flatten().all(|&i| i != INVALID));

        let mut mesh = TriangleMesh::from_vertices_and_faces(positions, faces);
        mesh.set_normals(normals);
        mesh
    }

    // ---- Accessors ----

    pub fn vertex_count(&self) -> usize {
        self.live_vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.live_triangles
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex<P>> {
        self.vertices.get(id.0).and_then(Option::as_ref)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex<P>> {
        self.vertices.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle<P>> {
        self.triangles.get(id.0).and_then(Option::as_ref)
    }

    pub fn triangle_mut(&mut self, id: TriangleId) -> Option<&mut Triangle<P>> {
        self.triangles.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn is_vertex_live(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }

    pub fn is_triangle_live(&self, id: TriangleId) -> bool {
        self.triangle(id).is_some()
    }

    /// Live vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex<P>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (VertexId(i), v)))
    }

    /// Live triangles in ascending id order.
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle<P>)> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (TriangleId(i), t)))
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices().map(|(id, _)| id)
    }

    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.triangles().map(|(id, _)| id)
    }

    /// Position of a live vertex.
    ///
    /// # Panics
    /// If the vertex is dead.
    pub fn position(&self, id: VertexId) -> Point3d {
        self.live_vertex(id).position
    }

    /// Interior angle of triangle `triangle` at its corner `vertex`, in radians.
    ///
    /// Returns 0 when the vertex is not a corner or an adjacent edge has zero
    /// length.
    pub fn corner_angle(&self, triangle: TriangleId, vertex: VertexId) -> f64 {
        let Some(t) = self.triangle(triangle) else {
            return 0.0;
        };
        let Some(k) = t.corner_of(vertex) else {
            return 0.0;
        };
        let p = self.position(t.vertices[k]);
        let e1 = self.position(t.vertices[(k + 1) % 3]) - p;
        let e2 = self.position(t.vertices[(k + 2) % 3]) - p;
        let denom = e1.norm() * e2.norm();
        if denom == 0.0 {
            return 0.0;
        }
        (e1.dot(&e2) / denom).clamp(-1.0, 1.0).acos()
    }

    /// Sum of the corner angles at `vertex` over its incident triangles.
    pub fn angle_sum(&self, vertex: VertexId) -> f64 {
        self.live_vertex(vertex)
            .triangles
            .iter()
            .map(|&t| self.corner_angle(t, vertex))
            .sum()
    }

    // ---- Contraction ----

    /// Number of triangles that `join_vertices(keep, remove, _)` would delete.
    pub fn removal_count(&self, keep: VertexId, remove: VertexId) -> usize {
        let Some(r) = self.vertex(remove) else {
            return 0;
        };
        match r.neighbors.len() {
            0 | 1 => 0,
            2 => r.triangles.len(),
            _ => r
                .triangles
                .iter()
                .filter(|&&t| self.triangle(t).is_some_and(|t| t.contains(keep)))
                .count(),
        }
    }

    /// Contract `remove` into `keep` and move `keep` to `position`.
    ///
    /// Returns `false` without changing anything when `remove` has no
    /// neighbors.
    ///
    /// # Panics
    /// If `keep == remove` or either vertex is dead.
    pub fn join_vertices(&mut self, keep: VertexId, remove: VertexId, position: Point3d) -> bool {
        assert_ne!(keep, remove, "cannot join {} with itself", keep);
        assert!(self.is_vertex_live(keep), "join target {} is not live", keep);
        assert!(self.is_vertex_live(remove), "joined vertex {} is not live", remove);

        let neighbors: Vec<VertexId> =
            self.live_vertex(remove).neighbors.iter().copied().collect();
        let before = self.live_triangles;

        match neighbors.as_slice() {
            [] => return false,
            [only] => {
                self.unlink(*only, remove);
            }
            [first, second] => {
                let doomed: Vec<TriangleId> =
                    self.live_vertex(remove).triangles.iter().copied().collect();
                for t in doomed {
                    self.delete_triangle(t);
                }
                self.unlink(*first, remove);
                self.unlink(*second, remove);
                self.link(*first, *second);
            }
            _ => {
                let incident: Vec<TriangleId> =
                    self.live_vertex(remove).triangles.iter().copied().collect();
                for t in incident {
                    let triangle = self.live_triangle_mut(t);
                    match triangle.corner_of(keep) {
                        Some(_) => self.delete_triangle(t),
                        None => {
                            if let Some(k) = triangle.corner_of(remove) {
                                triangle.vertices[k] = keep;
                            }
                            self.live_vertex_mut(keep).triangles.insert(t);
                        }
                    }
                }
                for &n in &neighbors {
                    self.unlink(n, remove);
                    self.link(n, keep);
                }
            }
        }

        self.kill_vertex(remove);
        self.live_vertex_mut(keep).position = position;

        let moved: Vec<TriangleId> = self.live_vertex(keep).triangles.iter().copied().collect();
        for t in moved {
            self.refresh_triangle(t);
        }
        let mut touched: BTreeSet<VertexId> = self.live_vertex(keep).neighbors.clone();
        touched.insert(keep);
        touched.extend(neighbors.into_iter().filter(|&n| self.is_vertex_live(n)));
        for v in touched {
            self.refresh_vertex_normal(v);
        }

        trace!(
            %keep,
            %remove,
            deleted = before - self.live_triangles,
            "Joined vertices"
        );
        true
    }

    /// Collapse every triangle whose area is at most `epsilon`.
    ///
    /// Each such triangle `(a, b, c)` has `b` and then `c` joined into `a` at
    /// its centroid. Triangles are visited in ascending id order, skipping
    /// those already deleted. Returns the number of triangles deleted, which
    /// includes neighbors of the slivers that the joins took with them.
    pub fn remove_degenerate(&mut self, epsilon: f64) -> usize {
        let candidates: Vec<TriangleId> = self.triangle_ids().collect();
        let before = self.live_triangles;
        let mut collapsed = 0;

        for t in candidates {
            let Some(triangle) = self.triangle(t) else {
                continue;
            };
            if triangle.area > epsilon {
                continue;
            }
            let [a, b, c] = triangle.vertices;
            let center = triangle.centroid;

            self.join_vertices(a, b, center);
            if a != c && self.is_vertex_live(a) && self.is_vertex_live(c) {
                self.join_vertices(a, c, center);
            }
            collapsed += 1;
        }

        let removed = before - self.live_triangles;
        debug!(collapsed, removed, epsilon, "Removed degenerate triangles");
        removed
    }

    // ---- Diagnostics ----

    pub fn stats(&self) -> MeshStats {
        let (surface_area, degenerate_triangles) =
            self.triangles().fold((0.0, 0), |(area, degenerate), (_, t)| {
                let flag = usize::from(t.area <= DEFAULT_DEGENERATE_EPSILON);
                (area + t.area, degenerate + flag)
            });
        MeshStats {
            vertices: self.live_vertices,
            triangles: self.live_triangles,
            isolated_vertices: self.vertices().filter(|(_, v)| v.triangles.is_empty()).count(),
            degenerate_triangles,
            surface_area,
            vertex_triangles: DegreeStats::from_counts(
                self.vertices().map(|(_, v)| v.triangles.len()),
            ),
            vertex_neighbors: DegreeStats::from_counts(
                self.vertices().map(|(_, v)| v.neighbors.len()),
            ),
        }
    }

    /// Verify the adjacency sets and that every live vertex belongs to a
    /// triangle.
    ///
    /// Joins may leave a vertex without triangles while it still has a
    /// neighbor; such a store passes [`Self::check_adjacency`] but not this.
    pub fn check_invariants(&self) -> std::result::Result<(), TopologyViolation> {
        self.check_adjacency()?;
        match self.vertices().find(|(_, v)| v.triangles.is_empty()) {
            Some((vertex, _)) => Err(TopologyViolation::IsolatedVertex { vertex }),
            None => Ok(()),
        }
    }

    /// Verify that the adjacency sets are mutually consistent.
    pub fn check_adjacency(&self) -> std::result::Result<(), TopologyViolation> {
        let mut counted_vertices = 0;
        for (id, vertex) in self.vertices() {
            counted_vertices += 1;
            for &n in &vertex.neighbors {
                if n == id {
                    return Err(TopologyViolation::SelfNeighbor { vertex: id });
                }
                match self.vertex(n) {
                    None => {
                        return Err(TopologyViolation::DeadNeighbor {
                            vertex: id,
                            neighbor: n,
                        })
                    }
                    Some(other) if !other.neighbors.contains(&id) => {
                        return Err(TopologyViolation::AsymmetricNeighbors { a: id, b: n })
                    }
                    Some(_) => {}
                }
            }
            for &t in &vertex.triangles {
                if !self.triangle(t).is_some_and(|t| t.contains(id)) {
                    return Err(TopologyViolation::StaleIncidence {
                        vertex: id,
                        triangle: t,
                    });
                }
            }
        }
        if counted_vertices != self.live_vertices {
            return Err(TopologyViolation::CountMismatch {
                counted: counted_vertices,
                recorded: self.live_vertices,
            });
        }

        let mut counted_triangles = 0;
        for (id, triangle) in self.triangles() {
            counted_triangles += 1;
            let [a, b, c] = triangle.vertices;
            if a == b || b == c || c == a {
                return Err(TopologyViolation::DuplicateCorner { triangle: id });
            }
            for v in triangle.vertices {
                match self.vertex(v) {
                    None => return Err(TopologyViolation::DeadCorner { triangle: id, vertex: v }),
                    Some(vertex) if !vertex.triangles.contains(&id) => {
                        return Err(TopologyViolation::MissingIncidence { triangle: id, vertex: v })
                    }
                    Some(_) => {}
                }
            }
            for (&a, &b) in triangle.vertices.iter().tuple_combinations() {
                if !self.live_vertex(a).neighbors.contains(&b) {
                    return Err(TopologyViolation::MissingNeighbor { triangle: id, a, b });
                }
            }
        }
        if counted_triangles != self.live_triangles {
            return Err(TopologyViolation::CountMismatch {
                counted: counted_triangles,
                recorded: self.live_triangles,
            });
        }
        Ok(())
    }

    // ---- Internals ----

    fn live_vertex(&self, id: VertexId) -> &Vertex<P> {
        match self.vertex(id) {
            Some(v) => v,
            None => panic!("vertex {} is not live", id),
        }
    }

    fn live_vertex_mut(&mut self, id: VertexId) -> &mut Vertex<P> {
        match self.vertex_mut(id) {
            Some(v) => v,
            None => panic!("vertex {} is not live", id),
        }
    }

    fn live_triangle_mut(&mut self, id: TriangleId) -> &mut Triangle<P> {
        match self.triangle_mut(id) {
            Some(t) => t,
            None => panic!("triangle {} is not live", id),
        }
    }

    fn add_triangle(&mut self, corners: [VertexId; 3]) -> TriangleId {
        let id = TriangleId(self.triangles.len());
        self.triangles.push(Some(Triangle::new(corners)));
        self.live_triangles += 1;

        for v in corners {
            self.live_vertex_mut(v).triangles.insert(id);
        }
        for (a, b) in corners.into_iter().tuple_combinations() {
            self.link(a, b);
        }
        self.refresh_triangle(id);
        id
    }

    fn delete_triangle(&mut self, id: TriangleId) {
        if let Some(triangle) = self.triangles[id.0].take() {
            for v in triangle.vertices {
                if let Some(vertex) = self.vertex_mut(v) {
                    vertex.triangles.remove(&id);
                }
            }
            self.live_triangles -= 1;
        }
    }

    fn kill_vertex(&mut self, id: VertexId) {
        if let Some(vertex) = self.vertices[id.0].take() {
            debug_assert!(vertex.neighbors.is_empty(), "{} still has neighbors", id);
            self.live_vertices -= 1;
        }
    }

    fn link(&mut self, a: VertexId, b: VertexId) {
        if a == b {
            return;
        }
        self.live_vertex_mut(a).neighbors.insert(b);
        self.live_vertex_mut(b).neighbors.insert(a);
    }

    fn unlink(&mut self, a: VertexId, b: VertexId) {
        if let Some(v) = self.vertex_mut(a) {
            v.neighbors.remove(&b);
        }
        if let Some(v) = self.vertex_mut(b) {
            v.neighbors.remove(&a);
        }
    }

    fn refresh_triangle(&mut self, id: TriangleId) {
        let [a, b, c] = match self.triangle(id) {
            Some(t) => t.vertices.map(|v| self.position(v)),
            None => return,
        };
        let triangle = self.live_triangle_mut(id);
        triangle.normal = triangle_normal(&a, &b, &c);
        triangle.centroid = centroid(&a, &b, &c);
        triangle.area = triangle_area(&a, &b, &c);
        triangle.perimeter = triangle_perimeter(&a, &b, &c);
    }

    fn refresh_vertex_normal(&mut self, id: VertexId) {
        let sum: Vector3d = self
            .live_vertex(id)
            .triangles
            .iter()
            .filter_map(|&t| self.triangle(t).and_then(Triangle::normal))
            .sum();
        self.live_vertex_mut(id).normal =
            sum.try_normalize(f64::EPSILON).unwrap_or_else(Vector3d::zeros);
    }
}
