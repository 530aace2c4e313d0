//! OBJ format support
//!
//! Only the triangle subset is understood: `v x y z` positions and `f` lines
//! with three vertex references, either bare (`f 1 2 3`) or carrying normal
//! references (`f 1//1 2//2 3//3`) which are discarded. Indices are 1-based
//! on the wire and 0-based in [`TriangleMesh`].

use crate::{MeshReader, MeshWriter};
use decimesh_core::{Error, Point3d, ProgressListener, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Stage name reported while reading.
pub const READ_STAGE: &str = "Reading mesh";
/// Stage name reported while writing.
pub const WRITE_STAGE: &str = "Writing mesh";

/// Split on single spaces and on `//`, so `f 1//1 2//2 3//3` has 7 tokens.
fn tokenize(line: &str) -> Vec<&str> {
    line.trim()
        .split(' ')
        .flat_map(|token| token.split("//"))
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_vertex(tokens: &[&str], line: usize) -> Result<Point3d> {
    if tokens.len() < 4 {
        return Err(Error::malformed(
            line,
            format!("vertex line has {} coordinates, expected 3", tokens.len() - 1),
        ));
    }
    let mut coords = [0.0; 3];
    for (coord, token) in coords.iter_mut().zip(&tokens[1..4]) {
        *coord = token
            .parse::<f64>()
            .map_err(|_| Error::malformed(line, format!("invalid coordinate '{token}'")))?;
    }
    Ok(Point3d::new(coords[0], coords[1], coords[2]))
}

/// Raw 1-based indices of a face line.
fn parse_face(tokens: &[&str], line: usize) -> Result<[usize; 3]> {
    let slots: [usize; 3] = match tokens.len() {
        4 => [1, 2, 3],
        7 => [1, 3, 5],
        n => {
            return Err(Error::malformed(
                line,
                format!("face line has {n} tokens, expected 4 or 7"),
            ))
        }
    };
    let mut face = [0; 3];
    for (index, slot) in face.iter_mut().zip(slots) {
        let token = tokens[slot];
        *index = token
            .parse::<usize>()
            .map_err(|_| Error::malformed(line, format!("invalid face index '{token}'")))?;
    }
    Ok(face)
}

/// OBJ mesh reader
pub struct ObjReader;

impl ObjReader {
    /// Read a mesh from any buffered source.
    ///
    /// Progress is reported once per input line. Face indices are checked
    /// after the whole input is read, since faces may precede their vertices.
    pub fn read_from<R: BufRead, L: ProgressListener>(
        reader: R,
        mut progress: L,
    ) -> Result<TriangleMesh> {
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;

        progress.on_start(READ_STAGE);
        let result = Self::parse_lines(&lines, &mut progress);
        progress.on_complete(READ_STAGE);
        result
    }

    /// Read a mesh from a file.
    pub fn read_path<P: AsRef<Path>, L: ProgressListener>(
        path: P,
        progress: L,
    ) -> Result<TriangleMesh> {
        let file = File::open(path.as_ref())?;
        Self::read_from(BufReader::new(file), progress)
    }

    fn parse_lines<L: ProgressListener>(
        lines: &[String],
        progress: &mut L,
    ) -> Result<TriangleMesh> {
        let total = lines.len();
        let mut mesh = TriangleMesh::new();
        let mut faces: Vec<(usize, [usize; 3])> = Vec::new();
        let mut skipped = 0usize;

        for (i, text) in lines.iter().enumerate() {
            let line = i + 1;
            let tokens = tokenize(text);
            match tokens.first().copied() {
                None | Some("vn") => {}
                Some(comment) if comment.starts_with('#') => {}
                Some("v") => {
                    mesh.add_vertex(parse_vertex(&tokens, line)?);
                }
                Some("f") => faces.push((line, parse_face(&tokens, line)?)),
                Some(other) => {
                    warn!(line, token = other, "Skipping unsupported line");
                    skipped += 1;
                }
            }
            progress.on_step(line, total);
        }

        let count = mesh.vertex_count();
        for (line, raw) in faces {
            let mut face = [0; 3];
            for (index, &r) in face.iter_mut().zip(&raw) {
                if r == 0 || r > count {
                    return Err(Error::malformed(
                        line,
                        format!("face index {r} is outside 1..={count}"),
                    ));
                }
                *index = r - 1;
            }
            mesh.add_face(face);
        }

        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            skipped,
            "Read OBJ mesh"
        );
        Ok(mesh)
    }
}

impl MeshReader for ObjReader {
    fn read_mesh(&self, path: &Path, progress: &mut dyn ProgressListener) -> Result<TriangleMesh> {
        Self::read_path(path, progress)
    }

    fn format_name(&self) -> &'static str {
        "obj"
    }
}

/// OBJ mesh writer
pub struct ObjWriter;

impl ObjWriter {
    /// Write a mesh with 6-digit coordinates and 1-based face indices.
    ///
    /// Progress is reported once per vertex and once per face.
    pub fn write_to<W: Write, L: ProgressListener>(
        writer: W,
        mesh: &TriangleMesh,
        mut progress: L,
    ) -> Result<()> {
        progress.on_start(WRITE_STAGE);
        let result = Self::write_elements(writer, mesh, &mut progress);
        progress.on_complete(WRITE_STAGE);
        result
    }

    /// Write a mesh to a file, replacing any existing content.
    pub fn write_path<P: AsRef<Path>, L: ProgressListener>(
        mesh: &TriangleMesh,
        path: P,
        progress: L,
    ) -> Result<()> {
        let file = File::create(path.as_ref())?;
        Self::write_to(BufWriter::new(file), mesh, progress)
    }

    fn write_elements<W: Write, L: ProgressListener>(
        mut writer: W,
        mesh: &TriangleMesh,
        progress: &mut L,
    ) -> Result<()> {
        let total = mesh.vertex_count() + mesh.face_count();
        let mut current = 0;

        for v in &mesh.vertices {
            writeln!(writer, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
            current += 1;
            progress.on_step(current, total);
        }
        for face in &mesh.faces {
            writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
            current += 1;
            progress.on_step(current, total);
        }
        writer.flush()?;

        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Wrote OBJ mesh"
        );
        Ok(())
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh(
        &self,
        mesh: &TriangleMesh,
        path: &Path,
        progress: &mut dyn ProgressListener,
    ) -> Result<()> {
        Self::write_path(mesh, path, progress)
    }

    fn format_name(&self) -> &'static str {
        "obj"
    }
}
