//! Triangle mesh loading and primitive geometric measurement.
//!
//! Meshes are stored indexed: deduplicated vertices plus faces referencing
//! them, which is what `stl_io::read_stl` produces. Vertex and face counts
//! are therefore topology counts, not `3 * faces`.

mod analysis;

pub use analysis::{
    MeshAnalysis, OverhangSummary, SupportAnalysis, BED_CONTACT_TOLERANCE_MM,
    CRITICAL_OVERHANG_DEG, SUPPORT_AREA_THRESHOLD_MM2, SUPPORT_HEIGHT_MM,
};

use crate::error::{OrientError, Result};
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Files smaller than this cannot hold a binary STL header plus count.
const MIN_BINARY_STL_BYTES: u64 = 84;

/// Text placeholders are only recognized below this size.
const PLACEHOLDER_MAX_BYTES: u64 = 1000;

/// Indexed triangle mesh.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Builds a mesh from indexed vertices and faces.
    ///
    /// # Errors
    ///
    /// Returns `GeometryExtraction` if there are no faces or a face refers to
    /// a vertex that does not exist.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self> {
        if faces.is_empty() {
            return Err(geometry("mesh has no faces"));
        }
        if let Some(face) = faces
            .iter()
            .find(|face| face.iter().any(|&i| i >= vertices.len()))
        {
            return Err(geometry(format!(
                "face {face:?} references a vertex outside 0..{}",
                vertices.len()
            )));
        }
        Ok(Self { vertices, faces })
    }

    /// Builds a mesh from a triangle soup, merging bit-identical vertices.
    ///
    /// # Errors
    ///
    /// Returns `GeometryExtraction` for an empty soup.
    ///
    /// # Examples
    ///
    /// ```
    /// use print_orient::mesh::Mesh;
    ///
    /// let mesh = Mesh::from_triangles(&[
    ///     [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    ///     [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    /// ]).unwrap();
    /// assert_eq!(mesh.num_vertices(), 4);
    /// assert_eq!(mesh.num_faces(), 2);
    /// assert!((mesh.surface_area() - 1.0).abs() < 1e-12);
    /// ```
    pub fn from_triangles(triangles: &[[[f64; 3]; 3]]) -> Result<Self> {
        let mut lookup: HashMap<[u64; 3], usize> = HashMap::new();
        let mut vertices = Vec::new();
        let mut faces = Vec::with_capacity(triangles.len());

        for triangle in triangles {
            let mut face = [0usize; 3];
            for (slot, corner) in face.iter_mut().zip(triangle) {
                let key = corner.map(f64::to_bits);
                *slot = *lookup.entry(key).or_insert_with(|| {
                    vertices.push(Point3::new(corner[0], corner[1], corner[2]));
                    vertices.len() - 1
                });
            }
            faces.push(face);
        }

        Self::new(vertices, faces)
    }

    /// Loads a binary or ASCII STL file.
    ///
    /// # Errors
    ///
    /// Returns `MissingArtifact` if the file does not exist and
    /// `GeometryExtraction` if it cannot be parsed or holds no faces.
    pub fn from_stl<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OrientError::missing(path, "STL file"));
        }

        let mut file = std::fs::File::open(path)?;
        let stl = stl_io::read_stl(&mut file)
            .map_err(|e| geometry(format!("{}: {e}", path.display())))?;

        let vertices = stl
            .vertices
            .iter()
            .map(|v| Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])))
            .collect();
        let faces = stl.faces.iter().map(|f| f.vertices).collect();

        let mesh = Self::new(vertices, faces)?;
        log::debug!(
            "loaded {}: {} vertices, {} faces",
            path.display(),
            mesh.num_vertices(),
            mesh.num_faces()
        );
        Ok(mesh)
    }

    /// Number of distinct vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.faces
            .iter()
            .map(|f| [self.vertices[f[0]], self.vertices[f[1]], self.vertices[f[2]]])
    }

    /// Axis-aligned bounds over the vertices referenced by faces.
    #[must_use]
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

        for vertex in self.faces.iter().flatten().map(|&i| self.vertices[i]) {
            min = min.inf(&vertex);
            max = max.sup(&vertex);
        }

        (min, max)
    }

    /// Bounding-box extents (width, depth, height).
    #[must_use]
    pub fn dimensions(&self) -> Vector3<f64> {
        let (min, max) = self.bounds();
        max - min
    }

    /// Enclosed volume by the divergence theorem (absolute value, so winding
    /// direction does not matter as long as it is consistent).
    #[must_use]
    pub fn volume(&self) -> f64 {
        let signed: f64 = self
            .triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum();
        signed.abs()
    }

    /// Total triangle area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| triangle_area(&t)).sum()
    }

    /// Area-weighted centroid of the surface.
    ///
    /// Degenerate meshes with zero total area fall back to the bounding-box
    /// center.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        let mut weighted = Vector3::zeros();
        let mut total_area = 0.0;

        for triangle in self.triangles() {
            let area = triangle_area(&triangle);
            let center = (triangle[0].coords + triangle[1].coords + triangle[2].coords) / 3.0;
            weighted += center * area;
            total_area += area;
        }

        if total_area > 0.0 {
            Point3::from(weighted / total_area)
        } else {
            let (min, max) = self.bounds();
            nalgebra::center(&min, &max)
        }
    }
}

fn triangle_area([a, b, c]: &[Point3<f64>; 3]) -> f64 {
    (b - a).cross(&(c - a)).norm() / 2.0
}

fn geometry(message: impl Into<String>) -> OrientError {
    OrientError::GeometryExtraction {
        message: message.into(),
    }
}

/// Returns true for files that cannot be real meshes: shorter than a binary
/// STL header, or small text files whose first line starts with `#` or `;`.
///
/// Unreadable or missing files are not placeholders; loading them reports the
/// real error.
#[must_use]
pub fn is_placeholder_stl<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    let size = metadata.len();
    if size < MIN_BINARY_STL_BYTES {
        return true;
    }
    if size >= PLACEHOLDER_MAX_BYTES {
        return false;
    }

    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };
    let mut first_line = Vec::new();
    if BufReader::new(file)
        .read_until(b'\n', &mut first_line)
        .is_err()
    {
        return false;
    }
    matches!(
        first_line.iter().find(|b| !b.is_ascii_whitespace()),
        Some(b'#' | b';')
    )
}
