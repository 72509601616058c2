use crate::compile::{
    compile_stage, create_stage_module, resolve_scene_uniforms, ShaderError, FRAGMENT_SHADER_GLSL,
    VERTEX_SHADER_GLSL,
};
use crate::geometry::Vertex;

use wgpu::naga::ShaderStage;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The pyramid render pipeline and the uniform plumbing it binds.
///
/// A shader failure leaves `pipeline` unset: the renderer keeps clearing and
/// presenting, nothing draws, and the process stays alive. The uniform layout
/// is always created so buffers and bind groups do not depend on shader
/// health.
pub(crate) struct ScenePipeline {
    pub pipeline: Option<wgpu::RenderPipeline>,
    pub uniform_layout: wgpu::BindGroupLayout,
}

impl ScenePipeline {
    pub(crate) fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline = match build_render_pipeline(device, &uniform_layout, surface_format) {
            Ok(pipeline) => Some(pipeline),
            Err(err) => {
                tracing::warn!(error = %err, "shader pipeline unavailable; frames will clear only");
                None
            }
        };

        Self {
            pipeline,
            uniform_layout,
        }
    }
}

fn build_render_pipeline(
    device: &wgpu::Device,
    uniform_layout: &wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    // CPU-side compile and interface check first; the device module creation
    // below only runs for sources that already passed.
    let vertex_ir = compile_stage(VERTEX_SHADER_GLSL, ShaderStage::Vertex)?;
    resolve_scene_uniforms(&vertex_ir)?;
    compile_stage(FRAGMENT_SHADER_GLSL, ShaderStage::Fragment)?;

    let vertex_module =
        create_stage_module(device, VERTEX_SHADER_GLSL, ShaderStage::Vertex, "pyramid vertex");
    let fragment_module = create_stage_module(
        device,
        FRAGMENT_SHADER_GLSL,
        ShaderStage::Fragment,
        "pyramid fragment",
    );

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene pipeline layout"),
        bind_group_layouts: &[uniform_layout],
        push_constant_ranges: &[],
    });

    Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some("main"),
            buffers: &[Vertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The pyramid's index winding is mixed; depth testing sorts the faces.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    }))
}
