use crate::coords::Vec2;
use crate::pipeline::{
    AddressMode, CoverageImage, DrawUniforms, DrawUniformsGpu, OverlayError, UiMesh, UiVertex,
    OVERLAY_WGSL,
};
use crate::render::{RenderCtx, RenderTarget};

use super::blend::{alpha_over_blend, primitive_state};

const MIN_VERTEX_CAPACITY: usize = 256;
const MIN_INDEX_CAPACITY: usize = 384;

/// Filtering applied when sampling the coverage texture.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CoverageFilter {
    Nearest,
    #[default]
    Linear,
}

impl CoverageFilter {
    fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            CoverageFilter::Nearest => wgpu::FilterMode::Nearest,
            CoverageFilter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Overlay renderer configuration.
#[derive(Debug, Clone, Default)]
pub struct OverlayConfig {
    pub filter: CoverageFilter,
}

struct CoverageTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// Draws a [`UiMesh`] over the current target contents.
///
/// One pipeline, one bind group: `screen_size`/`tex_size` uniforms, the
/// `R8Unorm` coverage texture and its sampler. Every resource is created on
/// first use; the bind group is rebuilt only when the texture or sampler is
/// replaced.
pub struct OverlayRenderer {
    config: OverlayConfig,

    // pipeline
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    // bindings
    uniform_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,
    sampler_mode: Option<AddressMode>,
    coverage: Option<CoverageTexture>,
    resource_generation: u64,
    bind_group: Option<wgpu::BindGroup>,
    bind_group_generation: u64,

    // geometry
    vertex_vbo: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    index_ibo: Option<wgpu::Buffer>,
    index_capacity: usize,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl OverlayRenderer {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            uniform_ubo: None,
            sampler: None,
            sampler_mode: None,
            coverage: None,
            resource_generation: 0,
            bind_group: None,
            bind_group_generation: u64::MAX,
            vertex_vbo: None,
            vertex_capacity: 0,
            index_ibo: None,
            index_capacity: 0,
        }
    }

    /// Size of the bound coverage texture in texels, if any.
    pub fn coverage_size(&self) -> Option<(u32, u32)> {
        self.coverage.as_ref().map(|c| (c.width, c.height))
    }

    /// Uploads `image` as the coverage texture.
    ///
    /// The texture is recreated only when the size changes; otherwise the
    /// existing one is overwritten in place. Must not be called between
    /// `render` recording and queue submission of the same frame.
    pub fn set_coverage(
        &mut self,
        ctx: &RenderCtx<'_>,
        image: &CoverageImage,
    ) -> Result<(), OverlayError> {
        let (width, height) = (image.width(), image.height());
        let max = ctx.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(OverlayError::TextureTooLarge { width, height, max });
        }

        let needs_texture = self
            .coverage
            .as_ref()
            .is_none_or(|c| c.width != width || c.height != height);

        if needs_texture {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("lumen overlay coverage"),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            log::debug!("overlay coverage texture created ({width}x{height})");
            self.coverage = Some(CoverageTexture { texture, view, width, height });
            self.resource_generation += 1;
        }

        self.ensure_sampler(ctx, image.address_mode());

        let Some(coverage) = self.coverage.as_ref() else { return Ok(()); };
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &coverage.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        Ok(())
    }

    /// Records one overlay draw of `mesh` into `target`.
    ///
    /// `screen_size` is the context viewport and `tex_size` the coverage
    /// texture size. Invalid input is reported before anything is recorded.
    ///
    /// One overlay draw per submitted frame: uniforms, vertices and indices
    /// are written at offset 0 of buffers owned by this renderer, and queue
    /// writes land before the submitted commands run. A second `render` on
    /// the same renderer before submission makes both passes draw the second
    /// mesh. Batch everything into one [`UiMesh`], or use one renderer per draw.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mesh: &UiMesh,
    ) -> Result<(), OverlayError> {
        if mesh.is_empty() {
            return Ok(());
        }
        mesh.validate()?;

        let Some((tex_w, tex_h)) = self.coverage_size() else {
            log::warn!("overlay: no coverage texture bound, skipping draw");
            return Ok(());
        };
        let uniforms =
            DrawUniforms::new(ctx.viewport.size(), Vec2::new(tex_w as f32, tex_h as f32))?;

        self.ensure_pipeline(ctx);
        self.ensure_uniform_buffer(ctx);
        self.ensure_bindings(ctx);
        self.ensure_geometry_capacity(ctx, mesh.vertices.len(), mesh.indices.len());

        // ── uploads ────────────────────────────────────────────────────────
        let Some(ubo) = self.uniform_ubo.as_ref() else { return Ok(()); };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniforms.to_gpu()));

        let Some(vbo) = self.vertex_vbo.as_ref() else { return Ok(()); };
        let Some(ibo) = self.index_ibo.as_ref()  else { return Ok(()); };
        ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&mesh.vertices));
        ctx.queue.write_buffer(ibo, 0, bytemuck::cast_slice(&mesh.indices));

        // ── draw ───────────────────────────────────────────────────────────
        let Some(pipeline)   = self.pipeline.as_ref()   else { return Ok(()); };
        let Some(bind_group) = self.bind_group.as_ref() else { return Ok(()); };

        let vbo_bytes = (mesh.vertices.len() * std::mem::size_of::<UiVertex>()) as u64;
        let ibo_bytes = (mesh.indices.len() * std::mem::size_of::<u32>()) as u64;

        let mut rpass = target.load_pass("lumen overlay pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..vbo_bytes));
        rpass.set_index_buffer(ibo.slice(..ibo_bytes), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.indices.len() as u32, 0, 0..1);

        Ok(())
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen overlay shader"),
            source: wgpu::ShaderSource::Wgsl(OVERLAY_WGSL.into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen overlay bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(DrawUniformsGpu::min_binding_size()),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen overlay pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen overlay pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[UiVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(alpha_over_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(wgpu::PrimitiveTopology::TriangleList),
            // Overlap order is draw order; no depth attachment.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("overlay pipeline built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
        self.bind_group_generation = u64::MAX;
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>, mode: AddressMode) {
        if self.sampler.is_some() && self.sampler_mode == Some(mode) {
            return;
        }
        let filter = self.config.filter.to_wgpu();
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen overlay sampler"),
            address_mode_u: mode.to_wgpu(),
            address_mode_v: mode.to_wgpu(),
            address_mode_w: mode.to_wgpu(),
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
        self.sampler_mode = Some(mode);
        self.resource_generation += 1;
    }

    fn ensure_uniform_buffer(&mut self, ctx: &RenderCtx<'_>) {
        if self.uniform_ubo.is_some() {
            return;
        }
        self.uniform_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen overlay uniforms"),
            size: std::mem::size_of::<DrawUniformsGpu>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.resource_generation += 1;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group_generation == self.resource_generation && self.bind_group.is_some() {
            return;
        }

        let Some(bgl)      = self.bind_group_layout.as_ref() else { return; };
        let Some(ubo)      = self.uniform_ubo.as_ref()       else { return; };
        let Some(coverage) = self.coverage.as_ref()          else { return; };
        let Some(sampler)  = self.sampler.as_ref()           else { return; };

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen overlay bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&coverage.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
        self.bind_group_generation = self.resource_generation;
    }

    fn ensure_geometry_capacity(&mut self, ctx: &RenderCtx<'_>, vertices: usize, indices: usize) {
        if vertices > self.vertex_capacity || self.vertex_vbo.is_none() {
            let cap = grown_capacity(vertices, MIN_VERTEX_CAPACITY);
            self.vertex_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("lumen overlay vbo"),
                size: (cap * std::mem::size_of::<UiVertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = cap;
        }
        if indices > self.index_capacity || self.index_ibo.is_none() {
            let cap = grown_capacity(indices, MIN_INDEX_CAPACITY);
            self.index_ibo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("lumen overlay ibo"),
                size: (cap * std::mem::size_of::<u32>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.index_capacity = cap;
        }
    }
}

/// Next power of two at or above `required`, never below `min`.
fn grown_capacity(required: usize, min: usize) -> usize {
    required.next_power_of_two().max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_grows_to_power_of_two() {
        assert_eq!(grown_capacity(0, 256), 256);
        assert_eq!(grown_capacity(257, 256), 512);
        assert_eq!(grown_capacity(1024, 256), 1024);
    }

    #[test]
    fn renderer_starts_without_coverage() {
        let r = OverlayRenderer::default();
        assert_eq!(r.coverage_size(), None);
        assert_eq!(r.config.filter, CoverageFilter::Linear);
    }

    #[test]
    fn filter_maps_to_wgpu() {
        assert_eq!(CoverageFilter::Nearest.to_wgpu(), wgpu::FilterMode::Nearest);
        assert_eq!(CoverageFilter::Linear.to_wgpu(), wgpu::FilterMode::Linear);
    }
}
