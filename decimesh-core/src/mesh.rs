//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};

/// A triangle mesh stored as flat vertex and index arrays.
///
/// This is the exchange form between the wire reader/writer and the
/// decimation engine; it carries no adjacency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3d>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3d>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3d) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3d>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Check that every face references three distinct, existing vertices.
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for (fi, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&i| i >= count) {
                return Err(Error::InvalidData(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    fi, bad, count
                )));
            }
            if face[0] == face[1] || face[1] == face[2] || face[2] == face[0] {
                return Err(Error::InvalidData(format!(
                    "face {} repeats a vertex: {:?}",
                    fi, face
                )));
            }
        }
        Ok(())
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
