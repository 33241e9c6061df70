//! The advancing front: the shrinking polygonal boundary of the hole.

use crate::error::{FillError, FillResult};

/// Ordered, circular sequence of filling-vertex indices describing the
/// current hole boundary. No vertex appears twice; length stays >= 3
/// except at the terminal step.
#[derive(Debug, Clone, Default)]
pub struct Front {
    vertices: Vec<u32>,
}

impl Front {
    /// Front over the first `n` filling vertices (the hole loop).
    pub fn from_loop(n: usize) -> Self {
        Self {
            vertices: (0..n as u32).collect(),
        }
    }

    /// Number of boundary vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the front has collapsed completely.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The boundary vertices in circular order.
    #[inline]
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    /// Position of a vertex in the cycle, if present.
    pub fn position(&self, vertex: u32) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    fn require(&self, vertex: u32) -> FillResult<usize> {
        self.position(vertex).ok_or(FillError::VertexNotFound {
            index: vertex,
            context: "front",
        })
    }

    /// The circular neighbors (before, after) of a vertex.
    pub fn neighbors(&self, vertex: u32) -> FillResult<(u32, u32)> {
        let pos = self.require(vertex)?;
        let len = self.vertices.len();
        let before = self.vertices[(pos + len - 1) % len];
        let after = self.vertices[(pos + 1) % len];
        Ok((before, after))
    }

    /// Remove a vertex from the boundary.
    pub fn remove(&mut self, vertex: u32) -> FillResult<()> {
        let pos = self.require(vertex)?;
        self.vertices.remove(pos);
        Ok(())
    }

    /// Replace a boundary vertex in place.
    pub fn replace(&mut self, old: u32, new: u32) -> FillResult<()> {
        let pos = self.require(old)?;
        self.vertices[pos] = new;
        Ok(())
    }

    /// Insert a vertex immediately after an existing one.
    pub fn insert_after(&mut self, anchor: u32, new: u32) -> FillResult<()> {
        let pos = self.require(anchor)?;
        self.vertices.insert(pos + 1, new);
        Ok(())
    }

    /// Reindex after a filling vertex was removed: every entry greater
    /// than `removed` shifts down by one.
    pub fn shift_indices_above(&mut self, removed: u32) {
        for v in &mut self.vertices {
            if *v > removed {
                *v -= 1;
            }
        }
    }

    /// Drop all boundary vertices (terminal closure).
    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}
