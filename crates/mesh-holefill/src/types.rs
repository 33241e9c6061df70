//! Core data types: vertices, the read-only input mesh, and the growing patch.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

/// A vertex in a mesh or patch.
///
/// Two vertices are the same entity only by index; coordinate equality is
/// used solely for geometric comparisons (merging, face-lookup checks).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a new vertex at the given position.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A triangle mesh with indexed vertices and faces.
///
/// During hole filling this is the read-only collaborator supplying faces
/// for the optional global intersection test.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is [v0, v1, v2] with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterate over triangles, yielding Triangle structs with actual vertex data.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }
}

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from the front.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }
}

/// The growing triangulated patch: hole-loop vertices plus every vertex
/// created during filling, and the committed triangular faces.
#[derive(Debug, Clone, Default)]
pub struct Filling {
    /// Patch vertices. The first `n` entries are the original hole loop.
    pub vertices: Vec<Vertex>,

    /// Committed patch faces as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl Filling {
    /// Create a filling seeded with the hole-loop vertices.
    pub fn from_loop(points: &[Point3<f64>]) -> Self {
        Self {
            vertices: points.iter().map(|&p| Vertex::new(p)).collect(),
            faces: Vec::new(),
        }
    }

    /// Number of patch vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of committed patch faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Position of a vertex, if the index is in range.
    #[inline]
    pub fn position(&self, index: u32) -> Option<Point3<f64>> {
        self.vertices.get(index as usize).map(|v| v.position)
    }

    /// Append a new vertex, returning its index.
    pub fn push_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(Vertex::new(position));
        (self.vertices.len() - 1) as u32
    }

    /// Commit a face. The three indices must be mutually distinct.
    pub fn push_face(&mut self, face: [u32; 3]) {
        debug_assert!(
            face[0] != face[1] && face[1] != face[2] && face[0] != face[2],
            "face references a vertex twice: {:?}",
            face
        );
        self.faces.push(face);
    }

    /// Remove a vertex, redirecting every face reference to `survivor` and
    /// reindexing the remaining faces. Faces that degenerate (reference the
    /// same vertex twice) are dropped.
    ///
    /// Returns the survivor's index after reindexing.
    pub fn merge_vertex(&mut self, removed: u32, survivor: u32) -> u32 {
        debug_assert_ne!(removed, survivor);

        self.vertices.remove(removed as usize);

        for face in &mut self.faces {
            for ix in face.iter_mut() {
                if *ix == removed {
                    *ix = survivor;
                }
            }
            // Removing a vertex shifts all higher indices down by one.
            for ix in face.iter_mut() {
                if *ix > removed {
                    *ix -= 1;
                }
            }
        }

        self.faces
            .retain(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2]);

        if survivor > removed {
            survivor - 1
        } else {
            survivor
        }
    }

    /// Undirected edges belonging to exactly one face.
    ///
    /// For a finished patch these are exactly the original hole-loop edges:
    /// stitched to the hole boundary, the patch introduces no new boundary.
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let mut counts: HashMap<(u32, u32), u32> = HashMap::new();

        for &[a, b, c] in &self.faces {
            for &(p, q) in &[(a, b), (b, c), (c, a)] {
                let key = if p < q { (p, q) } else { (q, p) };
                *counts.entry(key).or_default() += 1;
            }
        }

        counts
            .into_iter()
            .filter(|&(_, n)| n == 1)
            .map(|(edge, _)| edge)
            .collect()
    }
}
