use bytemuck::{Pod, Zeroable};

/// One overlay vertex as produced by the host UI layer.
///
/// Layout (16 bytes):
///
///  offset  0  pos    [f32; 2]  loc 0  UI pixels, top-left origin, +Y down
///  offset  8  color  [u8; 4]   loc 1  RGBA, normalized to [0, 1] on fetch
///  offset 12  tc     [u16; 2]  loc 2  texel coordinates into the coverage texture
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct UiVertex {
    pub pos: [f32; 2],
    pub color: [u8; 4],
    pub tc: [u16; 2],
}

impl UiVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Unorm8x4,  // color
        2 => Uint16x2   // tc
    ];

    #[inline]
    pub const fn new(pos: [f32; 2], color: [u8; 4], tc: [u16; 2]) -> Self {
        Self { pos, color, tc }
    }

    /// Color as the vertex fetch sees it: each channel divided by 255.
    #[inline]
    pub fn color_f32(&self) -> [f32; 4] {
        self.color.map(|c| c as f32 / 255.0)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<UiVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<UiVertex>(), 16);
        assert_eq!(UiVertex::layout().array_stride, 16);
    }

    #[test]
    fn attribute_offsets_match_struct() {
        let offsets: Vec<_> = UiVertex::ATTRS.iter().map(|a| (a.shader_location, a.offset)).collect();
        assert_eq!(offsets, vec![(0, 0), (1, 8), (2, 12)]);
        assert_eq!(UiVertex::ATTRS[1].format, wgpu::VertexFormat::Unorm8x4);
        assert_eq!(UiVertex::ATTRS[2].format, wgpu::VertexFormat::Uint16x2);
    }

    #[test]
    fn color_normalizes_bytes() {
        let v = UiVertex::new([0.0; 2], [255, 0, 51, 255], [0, 0]);
        assert_eq!(v.color_f32(), [1.0, 0.0, 0.2, 1.0]);
    }

    #[test]
    fn casts_to_bytes() {
        let verts = [UiVertex::new([1.0, 2.0], [1, 2, 3, 4], [5, 6]); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[8..12], &[1, 2, 3, 4]);
    }
}
