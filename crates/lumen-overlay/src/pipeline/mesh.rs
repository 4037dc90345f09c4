use super::{OverlayError, UiVertex};

/// Indexed triangle list produced by the host for one overlay draw.
///
/// Triangles are painted in index order; later triangles land on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiMesh {
    pub vertices: Vec<UiVertex>,
    pub indices: Vec<u32>,
}

impl UiMesh {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears geometry but keeps allocated capacity for the next frame.
    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends a vertex and returns its index.
    #[inline]
    pub fn push_vertex(&mut self, v: UiVertex) -> u32 {
        let idx = self.vertices.len() as u32;
        self.vertices.push(v);
        idx
    }

    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Appends a quad given its four corners in clockwise order from top-left.
    pub fn push_quad(&mut self, corners: [UiVertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Checks that every index references an existing vertex.
    pub fn validate(&self) -> Result<(), OverlayError> {
        let vertex_count = self.vertices.len();
        match self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertex_count)
        {
            Some((position, &index)) => Err(OverlayError::IndexOutOfBounds {
                position,
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}
