use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::animation::AnimationState;
use crate::geometry::Mesh;

use super::context::GpuContext;
use super::pipeline::{ScenePipeline, DEPTH_FORMAT};
use super::uniforms::{model_matrix, projection_matrix, SceneUniforms};

/// Ignore pathological frame gaps (debugger pauses, suspend) so the animation
/// never teleports.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Aggregates every GPU resource needed to present a frame, plus the
/// animation state that drives them.
///
/// ```text
///   Surface ─▶ Device ─▶ Queue
///                │
///                ├─▶ ScenePipeline (shaders, may be absent)
///                ├─▶ Mesh (pyramid vertex/index buffers)
///                ├─▶ SceneUniforms buffer + bind group
///                └─▶ DepthTarget
/// ```
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: ScenePipeline,
    mesh: Mesh,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: SceneUniforms,
    depth: DepthTarget,
    animation: AnimationState,
    last_frame_time: Instant,
    last_log_time: Instant,
}

impl GpuState {
    pub(crate) fn new<T>(target: &T, initial_size: PhysicalSize<u32>, vsync: bool) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        use wgpu::util::DeviceExt;

        let context = GpuContext::new(target, initial_size, vsync)?;
        let pipeline = ScenePipeline::new(&context.device, context.surface_format);
        let mesh = Mesh::upload(&context.device);
        let depth = DepthTarget::new(&context.device, context.size);

        let uniforms = SceneUniforms::new(context.size.width, context.size.height);
        let uniform_buffer =
            context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("scene uniform buffer"),
                    contents: bytemuck::bytes_of(&uniforms),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
        let uniform_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene uniform bind group"),
            layout: &pipeline.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            context,
            pipeline,
            mesh,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            depth,
            animation: AnimationState::new(),
            last_frame_time: Instant::now(),
            last_log_time: Instant::now(),
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Reacts to a framebuffer size change: swapchain, depth buffer, and the
    /// projection transform all follow the new size.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.depth = DepthTarget::new(&self.context.device, self.context.size);
        self.uniforms.set_projection(projection_matrix(
            self.context.size.width,
            self.context.size.height,
        ));
    }

    /// Advances the animation by the measured frame delta and mirrors the
    /// fresh transforms into the uniform buffer.
    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame_time).min(MAX_FRAME_DELTA);
        self.last_frame_time = now;

        self.animation.advance(dt);
        self.uniforms
            .set_model(model_matrix(self.animation.angle, self.animation.offset));
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        if now.duration_since(self.last_log_time) >= Duration::from_secs(1) {
            tracing::debug!(
                angle = self.animation.angle,
                offset = self.animation.offset,
                rising = self.animation.rising,
                "animation state"
            );
            self.last_log_time = now;
        }
    }

    /// Records and submits one frame: clear to the cycling background color,
    /// draw the pyramid if the pipeline is healthy, present.
    pub(crate) fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.update();

        let [r, g, b] = self.animation.background_color();
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline.pipeline.as_ref() {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        tracing::trace!(
            width = self.context.size.width,
            height = self.context.size.height,
            "presented frame"
        );
        Ok(())
    }
}

/// Depth attachment sized to the swapchain, recreated on resize.
struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, size: PhysicalSize<u32>) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
