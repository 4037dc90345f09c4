use crate::pipeline::OverlayError;
use crate::render::{RenderCtx, RenderTarget};

use super::blend::primitive_state;

const BACKDROP_WGSL: &str = include_str!("shaders/backdrop.wgsl");

/// Backdrop renderer configuration.
#[derive(Debug, Clone)]
pub struct BackdropConfig {
    /// The backdrop is produced at `physical_size / subsampling` and stretched
    /// with nearest filtering, giving chunky pixels for cheap previews.
    pub subsampling: u32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self { subsampling: 1 }
    }
}

/// Image size a host should produce for a target of `width × height`
/// physical pixels. Each axis is at least one pixel.
pub fn backdrop_extent(width: u32, height: u32, subsampling: u32) -> (u32, u32) {
    let s = subsampling.max(1);
    ((width / s).max(1), (height / s).max(1))
}

/// Straight RGBA8 image shown underneath the overlay (sRGB encoded).
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Backdrop {
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, OverlayError> {
        if width == 0 || height == 0 {
            return Err(OverlayError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(OverlayError::BackdropSizeMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self { width, height, rgba })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self, OverlayError>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&f(x, y));
            }
        }
        Self::from_rgba8(width, height, rgba)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Stretches a [`Backdrop`] over the whole target.
#[derive(Default)]
pub struct BackdropRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,
    texture: Option<(wgpu::Texture, u32, u32)>,
    bind_group: Option<wgpu::BindGroup>,
}

impl BackdropRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads a new backdrop image, reallocating the texture on size change.
    pub fn set_image(&mut self, ctx: &RenderCtx<'_>, image: &Backdrop) -> Result<(), OverlayError> {
        let (width, height) = image.size();
        let max = ctx.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(OverlayError::TextureTooLarge { width, height, max });
        }

        let reuse = matches!(&self.texture, Some((_, w, h)) if *w == width && *h == height);
        if !reuse {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("lumen backdrop texture"),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            log::debug!("backdrop texture created ({width}x{height})");
            self.texture = Some((texture, width, height));
            self.bind_group = None;
        }

        let Some((texture, _, _)) = self.texture.as_ref() else { return Ok(()); };
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.rgba(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        Ok(())
    }

    /// Records the backdrop blit. Does nothing until an image was set.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.texture.is_none() {
            return;
        }
        self.ensure_pipeline(ctx);
        self.ensure_bind_group(ctx);

        let Some(pipeline)   = self.pipeline.as_ref()   else { return; };
        let Some(bind_group) = self.bind_group.as_ref() else { return; };

        let mut rpass = target.load_pass("lumen backdrop pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..4, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen backdrop shader"),
            source: wgpu::ShaderSource::Wgsl(BACKDROP_WGSL.into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen backdrop bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen backdrop pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen backdrop pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(wgpu::PrimitiveTopology::TriangleStrip),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_bind_group(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let sampler = self.sampler.get_or_insert_with(|| {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("lumen backdrop sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Nearest,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        });

        let Some(bgl)            = self.bind_group_layout.as_ref() else { return; };
        let Some((texture, ..))  = self.texture.as_ref()           else { return; };
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen backdrop bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
    }
}
