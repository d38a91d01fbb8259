/// Shader compilation and program linking
///
/// Shader objects never outlive `build_program`: they are detached and
/// deleted once the link step has run, whatever its outcome. A failed link
/// deletes the program too, so a caller's resource set only ever receives a
/// fully linked program or nothing.

use crate::device::{GlDevice, ProgramId, ShaderId, ShaderStage, UniformLocation};
use crate::engine_bail;
use crate::error::Result;
use crate::shader::rewriter::ShaderRewriter;

/// Everything needed to link one program
#[derive(Debug, Clone, Copy)]
pub struct ProgramDesc<'a> {
    /// Used in diagnostics ("gl41-mrt", "gl41-pipeline vertex", ...)
    pub label: &'a str,
    /// Stage sources, compiled in order
    pub stages: &'a [(ShaderStage, &'a str)],
    /// Set `GL_PROGRAM_SEPARABLE` before linking
    pub separable: bool,
    /// Fragment outputs bound to colour locations 0..n before linking
    pub frag_data: &'a [&'a str],
}

impl<'a> ProgramDesc<'a> {
    /// Plain vertex + fragment program
    pub fn new(label: &'a str, stages: &'a [(ShaderStage, &'a str)]) -> Self {
        Self {
            label,
            stages,
            separable: false,
            frag_data: &[],
        }
    }
}

/// Compile one stage, deleting the shader object on failure
pub fn compile_shader(
    device: &dyn GlDevice,
    rewriter: &dyn ShaderRewriter,
    stage: ShaderStage,
    text: &str,
    label: &str,
    source: &str,
) -> Result<ShaderId> {
    let shader = device.create_shader(stage);
    if !shader.is_allocated() {
        engine_bail!(source, ResourceAllocationFailure, "{} {} shader: glCreateShader failed", label, stage.name());
    }

    let text = rewriter.rewrite(text, stage);
    device.shader_source(shader, &text);
    device.compile_shader(shader);

    if !device.shader_compile_status(shader) {
        let mut info = device.shader_info_log(shader);
        if info.trim().is_empty() {
            info = "shader compile failed".to_string();
        }
        device.delete_shader(shader);
        engine_bail!(source, CompileOrLinkFailure, "{} {} shader: {}", label, stage.name(), info.trim_end());
    }

    Ok(shader)
}

/// Compile, link and clean up
pub fn build_program(
    device: &dyn GlDevice,
    rewriter: &dyn ShaderRewriter,
    desc: &ProgramDesc<'_>,
    source: &str,
) -> Result<ProgramId> {
    let mut shaders: Vec<ShaderId> = Vec::with_capacity(desc.stages.len());
    for (stage, text) in desc.stages {
        match compile_shader(device, rewriter, *stage, text, desc.label, source) {
            Ok(shader) => shaders.push(shader),
            Err(err) => {
                for shader in shaders {
                    device.delete_shader(shader);
                }
                return Err(err);
            }
        }
    }

    let program = device.create_program();
    if !program.is_allocated() {
        for shader in shaders {
            device.delete_shader(shader);
        }
        engine_bail!(source, ResourceAllocationFailure, "{}: glCreateProgram failed", desc.label);
    }

    for shader in &shaders {
        device.attach_shader(program, *shader);
    }
    if desc.separable {
        device.set_program_separable(program, true);
    }
    for (location, name) in desc.frag_data.iter().enumerate() {
        device.bind_frag_data_location(program, location as u32, name);
    }

    device.link_program(program);

    for shader in shaders {
        device.detach_shader(program, shader);
        device.delete_shader(shader);
    }

    if !device.program_link_status(program) {
        let mut info = device.program_info_log(program);
        if info.trim().is_empty() {
            info = "program link failed".to_string();
        }
        device.delete_program(program);
        engine_bail!(source, CompileOrLinkFailure, "{} link: {}", desc.label, info.trim_end());
    }

    Ok(program)
}

/// Attribute location that must exist in a linked program
pub fn require_attrib(device: &dyn GlDevice, program: ProgramId, name: &str, source: &str) -> Result<u32> {
    match device.get_attrib_location(program, name) {
        Some(location) => Ok(location),
        None => engine_bail!(source, MissingBinding, "vertex attribute '{}' not found", name),
    }
}

/// Uniform location that must exist in a linked program
pub fn require_uniform(
    device: &dyn GlDevice,
    program: ProgramId,
    name: &str,
    source: &str,
) -> Result<UniformLocation> {
    match device.get_uniform_location(program, name) {
        Some(location) => Ok(location),
        None => engine_bail!(source, MissingBinding, "uniform '{}' not found", name),
    }
}

/// Uniform block index that must exist in a linked program
pub fn require_uniform_block(device: &dyn GlDevice, program: ProgramId, name: &str, source: &str) -> Result<u32> {
    match device.get_uniform_block_index(program, name) {
        Some(index) => Ok(index),
        None => engine_bail!(source, MissingBinding, "uniform block '{}' not found", name),
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
