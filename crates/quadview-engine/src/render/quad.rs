use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Rect;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

/// Rasterizer mode for the quad's triangles.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PolygonMode {
    #[default]
    Fill,
    Wireframe,
}

impl PolygonMode {
    /// Returns the other mode.
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            PolygonMode::Fill => PolygonMode::Wireframe,
            PolygonMode::Wireframe => PolygonMode::Fill,
        }
    }
}

/// Single-quad renderer.
///
/// Geometry is provided as a logical-pixel rect, converted to NDC in the vertex
/// shader using the viewport. Color is linear premultiplied RGBA (`paint::Color`).
///
/// Holds one shader module's worth of pipelines: a fill pipeline and a wireframe
/// pipeline differing only in `wgpu::PolygonMode`. The wireframe pipeline means
/// the device must be created with `Features::POLYGON_MODE_LINE`.
#[derive(Default)]
pub struct QuadRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    fill_pipeline: Option<wgpu::RenderPipeline>,
    wire_pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    quad_ubo: Option<wgpu::Buffer>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
}

impl QuadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders one quad into `target`.
    ///
    /// Degenerate rects (zero or negative area after normalization) are skipped.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        rect: Rect,
        color: Color,
        mode: PolygonMode,
    ) {
        let rect = rect.normalized();
        if rect.is_empty() || !rect.is_finite() {
            return;
        }

        self.ensure_pipelines(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx);

        let uniform = QuadUniform::new(ctx.viewport.width, ctx.viewport.height, rect, color);
        let Some(ubo) = self.quad_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniform));

        let pipeline = match mode {
            PolygonMode::Fill => self.fill_pipeline.as_ref(),
            PolygonMode::Wireframe => self.wire_pipeline.as_ref(),
        };
        let Some(pipeline) = pipeline else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quadview quad pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format)
            && self.fill_pipeline.is_some()
            && self.wire_pipeline.is_some()
        {
            return;
        }

        let shader_src = include_str!("shaders/quad.wgsl");
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quadview quad shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("quadview quad bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(quad_ubo_min_binding_size()),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("quadview quad pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    // Newer wgpu uses immediate constants; keep disabled for now.
                    immediate_size: 0,
                });

        let build = |polygon_mode: wgpu::PolygonMode, label: &str| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[QuadVertex::layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(premul_alpha_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),

                multiview_mask: None,
                cache: None,
            })
        };

        self.fill_pipeline = Some(build(wgpu::PolygonMode::Fill, "quadview quad fill pipeline"));
        self.wire_pipeline = Some(build(wgpu::PolygonMode::Line, "quadview quad wire pipeline"));
        self.pipeline_format = Some(ctx.surface_format);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.quad_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.quad_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let quad_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadview quad ubo"),
            size: std::mem::size_of::<QuadUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quadview quad bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: quad_ubo.as_entire_binding(),
            }],
        });

        self.quad_ubo = Some(quad_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quadview quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quadview quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

// ── blend ─────────────────────────────────────────────────────────────────

fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── quad uniform ──────────────────────────────────────────────────────────

/// CPU mirror of the WGSL `QuadUniform` struct.
///
/// `_pad` keeps `color` at a 16-byte offset as WGSL alignment rules require.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct QuadUniform {
    viewport: [f32; 2],
    origin: [f32; 2],
    size: [f32; 2],
    _pad: [f32; 2],
    color: [f32; 4],
}

impl QuadUniform {
    fn new(viewport_w: f32, viewport_h: f32, rect: Rect, color: Color) -> Self {
        Self {
            viewport: [viewport_w.max(1.0), viewport_h.max(1.0)],
            origin: [rect.origin.x, rect.origin.y],
            size: [rect.size.x, rect.size.y],
            _pad: [0.0; 2],
            color: [color.r, color.g, color.b, color.a],
        }
    }
}

/// Returns the `wgpu` minimum binding size for the quad uniform buffer.
///
/// `QuadUniform` is 48 bytes so its size is always non-zero. Centralising this
/// avoids `.unwrap()` at the pipeline-creation site.
fn quad_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<QuadUniform>() as u64)
        .expect("QuadUniform has non-zero size by construction")
}

// ── quad geometry ─────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[cfg(test)]
mod tests {
    use super::*;

    // ── polygon mode ──────────────────────────────────────────────────────

    #[test]
    fn mode_starts_at_fill() {
        assert_eq!(PolygonMode::default(), PolygonMode::Fill);
    }

    #[test]
    fn toggle_alternates_strictly() {
        let mut mode = PolygonMode::default();
        for i in 0..7 {
            mode = mode.toggled();
            let expected = if i % 2 == 0 {
                PolygonMode::Wireframe
            } else {
                PolygonMode::Fill
            };
            assert_eq!(mode, expected, "after {} toggles", i + 1);
        }
    }

    // ── uniform layout ────────────────────────────────────────────────────

    #[test]
    fn uniform_matches_wgsl_size() {
        // viewport + origin + size + pad (4 × vec2) + color (vec4) = 48 bytes.
        assert_eq!(std::mem::size_of::<QuadUniform>(), 48);
    }

    #[test]
    fn uniform_carries_rect_and_color() {
        let u = QuadUniform::new(
            800.0,
            600.0,
            Rect::new(200.0, 150.0, 400.0, 300.0),
            Color::from_straight(1.0, 0.5, 0.2, 1.0),
        );
        assert_eq!(u.viewport, [800.0, 600.0]);
        assert_eq!(u.origin, [200.0, 150.0]);
        assert_eq!(u.size, [400.0, 300.0]);
        assert_eq!(u.color, [1.0, 0.5, 0.2, 1.0]);
    }

    #[test]
    fn uniform_clamps_degenerate_viewport() {
        let u = QuadUniform::new(0.0, 0.0, Rect::new(0.0, 0.0, 1.0, 1.0), Color::transparent());
        assert_eq!(u.viewport, [1.0, 1.0]);
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn index_buffer_covers_two_triangles() {
        assert_eq!(QUAD_INDICES.len(), 6);
        for &i in &QUAD_INDICES {
            assert!((i as usize) < QUAD_VERTICES.len());
        }
    }
}
