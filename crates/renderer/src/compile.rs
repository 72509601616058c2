//! Shader stage compilation and interface checks.
//!
//! The vertex and fragment sources are fixed GLSL constants. Before a module
//! is handed to the device we run it through naga's GLSL frontend and
//! validator on the CPU, which yields real diagnostics for broken sources and
//! lets the interface checks run in plain unit tests. Compilation failures are
//! deliberately non-fatal for the renderer: the caller logs the diagnostic and
//! keeps presenting clear-only frames instead of crashing.

use std::borrow::Cow;

use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::{AddressSpace, Module, ShaderStage, TypeInner};

/// Upper bound on the diagnostic text carried by a [`ShaderError`].
const MAX_LOG_BYTES: usize = 1024;

/// Diagnostics produced while compiling or checking a shader stage.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to compile {stage:?} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader module failed validation: {log}")]
    Validate { log: String },
    #[error("shader declares no scene uniform block")]
    MissingUniformBlock,
    #[error("scene uniform block has no '{name}' member")]
    MissingUniform { name: &'static str },
}

/// Pyramid vertex stage: perspective projection plus position-derived color.
pub const VERTEX_SHADER_GLSL: &str = r"#version 450

layout(location = 0) in vec3 pos;
layout(location = 0) out vec4 v_color;

layout(std140, set = 0, binding = 0) uniform Scene {
    mat4 model;
    mat4 projection;
} scene;

void main() {
    gl_Position = scene.projection * scene.model * vec4(pos, 1.0);
    v_color = vec4(clamp(pos, 0.0, 1.0), 1.0);
}
";

/// Pyramid fragment stage: pass the interpolated vertex color through.
pub const FRAGMENT_SHADER_GLSL: &str = r"#version 450

layout(location = 0) in vec4 v_color;
layout(location = 0) out vec4 out_color;

void main() {
    out_color = v_color;
}
";

/// Parses and validates one GLSL shader stage.
///
/// Returns the naga module so callers can inspect the shader interface. The
/// diagnostic on failure is human-readable and capped at [`MAX_LOG_BYTES`].
pub fn compile_stage(source: &str, stage: ShaderStage) -> Result<Module, ShaderError> {
    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage), source)
        .map_err(|errors| ShaderError::Compile {
            stage,
            log: truncate_log(errors.emit_to_string(source)),
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| ShaderError::Validate {
            log: truncate_log(err.into_inner().to_string()),
        })?;

    Ok(module)
}

/// Checks that the module exposes the scene uniform block with `model` and
/// `projection` members.
///
/// Uploading to an unresolved uniform would be a silent no-op on the GPU, so
/// a missing member is surfaced as an explicit error instead.
pub fn resolve_scene_uniforms(module: &Module) -> Result<(), ShaderError> {
    let members = module
        .global_variables
        .iter()
        .filter(|(_, variable)| variable.space == AddressSpace::Uniform)
        .find_map(
            |(_, variable)| match &module.types[variable.ty].inner {
                TypeInner::Struct { members, .. } => Some(members),
                _ => None,
            },
        )
        .ok_or(ShaderError::MissingUniformBlock)?;

    for name in ["model", "projection"] {
        if !members
            .iter()
            .any(|member| member.name.as_deref() == Some(name))
        {
            return Err(ShaderError::MissingUniform { name });
        }
    }

    Ok(())
}

/// Builds the device-side module for a stage that already compiled cleanly.
pub(crate) fn create_stage_module(
    device: &wgpu::Device,
    source: &'static str,
    stage: ShaderStage,
    label: &str,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

fn truncate_log(mut log: String) -> String {
    if log.len() > MAX_LOG_BYTES {
        let mut end = MAX_LOG_BYTES;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_stages_compile() {
        compile_stage(VERTEX_SHADER_GLSL, ShaderStage::Vertex).unwrap();
        compile_stage(FRAGMENT_SHADER_GLSL, ShaderStage::Fragment).unwrap();
    }

    #[test]
    fn invalid_fragment_source_reports_diagnostic() {
        let err = compile_stage("this is not glsl", ShaderStage::Fragment).unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
                assert!(log.len() <= 1024);
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn scene_uniforms_resolve_in_vertex_stage() {
        let module = compile_stage(VERTEX_SHADER_GLSL, ShaderStage::Vertex).unwrap();
        resolve_scene_uniforms(&module).unwrap();
    }

    #[test]
    fn stage_without_uniform_block_is_rejected() {
        let module = compile_stage(FRAGMENT_SHADER_GLSL, ShaderStage::Fragment).unwrap();
        let err = resolve_scene_uniforms(&module).unwrap_err();
        assert!(matches!(err, ShaderError::MissingUniformBlock));
    }

    #[test]
    fn missing_member_is_named() {
        let source = r"#version 450
layout(location = 0) in vec3 pos;
layout(std140, set = 0, binding = 0) uniform Scene {
    mat4 model;
} scene;
void main() {
    gl_Position = scene.model * vec4(pos, 1.0);
}
";
        let module = compile_stage(source, ShaderStage::Vertex).unwrap();
        let err = resolve_scene_uniforms(&module).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingUniform { name: "projection" }
        ));
    }

    #[test]
    fn long_diagnostics_are_truncated() {
        let log = truncate_log("x".repeat(4096));
        assert_eq!(log.len(), 1024);
    }
}
