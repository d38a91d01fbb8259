/// gl41-pipeline: separable programs joined in a program pipeline
///
/// A grid of lit cubes. The vertex and fragment stages are linked as two
/// separable programs and combined with `glUseProgramStages`; both read the
/// `SceneBlock` uniform block, the vertex stage also reads per-instance
/// position/scale from `ModelBlock`.

use glam::Vec3;

use crate::capability::Feature;
use crate::device::{
    BufferId, BufferTarget, BufferUsage, ClearMask, DepthFunc, EnableCap, GlDevice, PipelineId,
    PrimitiveMode, ProgramId, ProgramStages, ShaderStage, VertexArrayId,
};
use crate::error::Result;
use crate::params::SceneOptions;
use crate::resource::{self, ResourceSet};
use crate::scene::scene::{orbit_view_projection, probe_features, FrameInfo, Scene, SceneContext};
use crate::shader::{build_program, require_attrib, require_uniform_block, sources, ProgramDesc};
use crate::state::{StateGuard, StateMask};

const SOURCE: &str = "gl41mark::scene::pipeline";

pub const DEFAULT_GRID: u32 = 10;
pub const MAX_GRID: u32 = 16;

const SCENE_BINDING: u32 = 0;
const MODEL_BINDING: u32 = 1;

/// mat4 view-projection, vec4 light direction, vec4 time
const SCENE_BLOCK_FLOATS: usize = 24;
/// 256 x vec4 position/scale
const MODEL_BLOCK_BYTES: usize = 256 * 16;

const CUBE_SPACING: f32 = 1.6;
const CUBE_SCALE: f32 = 0.7;
const LIGHT_DIR: [f32; 4] = [0.4, 0.8, 0.2, 0.0];
const CLEAR_COLOR: [f32; 4] = [0.06, 0.06, 0.08, 1.0];

/// 36 vertices of a unit cube, interleaved position + normal
fn cube_vertices() -> Vec<[f32; 6]> {
    // (normal, u, v) with u x v == normal so every face winds CCW
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut vertices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        for (a, b) in corners {
            let p = (normal + u * a + v * b) * 0.5;
            vertices.push([p.x, p.y, p.z, normal.x, normal.y, normal.z]);
        }
    }
    vertices
}

/// Per-instance (x, y, z, scale) for a `grid x grid` layout centered on the origin
pub fn model_entries(grid: u32) -> Vec<[f32; 4]> {
    let half = (grid as f32 - 1.0) * CUBE_SPACING * 0.5;
    (0..grid * grid)
        .map(|i| {
            let x = (i % grid) as f32;
            let y = (i / grid) as f32;
            [-half + x * CUBE_SPACING, -half + y * CUBE_SPACING, 0.0, CUBE_SCALE]
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct PipelineResources {
    pub vertex_program: ProgramId,
    pub fragment_program: ProgramId,
    pub pipeline: PipelineId,
    pub vertex_array: VertexArrayId,
    pub vertex_buffer: BufferId,
    pub scene_buffer: BufferId,
    pub model_buffer: BufferId,
}

impl ResourceSet for PipelineResources {
    fn release(&mut self, device: &dyn GlDevice) {
        if self.scene_buffer.is_allocated() || self.model_buffer.is_allocated() {
            device.bind_buffer_base(BufferTarget::Uniform, SCENE_BINDING, BufferId::NONE);
            device.bind_buffer_base(BufferTarget::Uniform, MODEL_BINDING, BufferId::NONE);
        }
        resource::destroy_buffer(device, &mut self.model_buffer);
        resource::destroy_buffer(device, &mut self.scene_buffer);
        resource::destroy_buffer(device, &mut self.vertex_buffer);
        resource::destroy_vertex_array(device, &mut self.vertex_array);
        resource::destroy_program_pipeline(device, &mut self.pipeline);
        resource::destroy_program(device, &mut self.fragment_program);
        resource::destroy_program(device, &mut self.vertex_program);
    }

    fn is_released(&self) -> bool {
        !self.vertex_program.is_allocated()
            && !self.fragment_program.is_allocated()
            && !self.pipeline.is_allocated()
            && !self.vertex_array.is_allocated()
            && !self.vertex_buffer.is_allocated()
            && !self.scene_buffer.is_allocated()
            && !self.model_buffer.is_allocated()
    }
}

pub struct PipelineScene {
    options: SceneOptions,
    resources: PipelineResources,
    grid: u32,
}

impl PipelineScene {
    pub const NAME: &'static str = "gl41-pipeline";

    pub fn new() -> Self {
        Self {
            options: SceneOptions::new().declare("grid", "10", "Cubes per grid side"),
            resources: PipelineResources::default(),
            grid: 0,
        }
    }

    pub fn resources(&self) -> &PipelineResources {
        &self.resources
    }

    pub fn grid(&self) -> u32 {
        self.grid
    }

    fn separable(
        ctx: &SceneContext<'_>,
        label: &str,
        stage: ShaderStage,
        text: &str,
    ) -> Result<ProgramId> {
        let stages = [(stage, text)];
        let desc = ProgramDesc {
            separable: true,
            ..ProgramDesc::new(label, &stages)
        };
        build_program(ctx.device, ctx.rewriter, &desc, SOURCE)
    }
}

impl Default for PipelineScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for PipelineScene {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &SceneOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut SceneOptions {
        &mut self.options
    }

    fn supported(&self, ctx: &SceneContext<'_>) -> bool {
        probe_features(ctx, SOURCE, &[Feature::ProgramPipelines], ctx.config.show_errors).is_ok()
    }

    fn load(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let device = ctx.device;
        probe_features(ctx, SOURCE, &[Feature::ProgramPipelines], false)?;

        let res = &mut self.resources;
        res.vertex_program = Self::separable(ctx, "gl41-pipeline vertex", ShaderStage::Vertex, sources::PIPELINE_VS)?;
        res.fragment_program =
            Self::separable(ctx, "gl41-pipeline fragment", ShaderStage::Fragment, sources::PIPELINE_FS)?;

        let position = require_attrib(device, res.vertex_program, "position", SOURCE)?;
        let normal = require_attrib(device, res.vertex_program, "normal", SOURCE)?;

        let vs_scene = require_uniform_block(device, res.vertex_program, "SceneBlock", SOURCE)?;
        let vs_model = require_uniform_block(device, res.vertex_program, "ModelBlock", SOURCE)?;
        let fs_scene = require_uniform_block(device, res.fragment_program, "SceneBlock", SOURCE)?;
        device.uniform_block_binding(res.vertex_program, vs_scene, SCENE_BINDING);
        device.uniform_block_binding(res.vertex_program, vs_model, MODEL_BINDING);
        device.uniform_block_binding(res.fragment_program, fs_scene, SCENE_BINDING);

        resource::create_program_pipeline(device, &mut res.pipeline, "gl41-pipeline")?;
        device.use_program_stages(res.pipeline, ProgramStages::VERTEX, res.vertex_program);
        device.use_program_stages(res.pipeline, ProgramStages::FRAGMENT, res.fragment_program);

        resource::create_vertex_array(device, &mut res.vertex_array, "cube vao")?;
        device.bind_vertex_array(res.vertex_array);
        resource::create_buffer(device, &mut res.vertex_buffer, "cube vertices")?;
        device.bind_buffer(BufferTarget::Array, res.vertex_buffer);
        let cube = cube_vertices();
        device.buffer_data(BufferTarget::Array, bytemuck::cast_slice(cube.as_slice()), BufferUsage::StaticDraw);

        let stride = std::mem::size_of::<[f32; 6]>() as i32;
        device.enable_vertex_attrib_array(position);
        device.vertex_attrib_pointer_f32(position, 3, stride, 0);
        device.enable_vertex_attrib_array(normal);
        device.vertex_attrib_pointer_f32(normal, 3, stride, 12);
        device.bind_vertex_array(VertexArrayId::NONE);
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);

        resource::create_buffer(device, &mut res.scene_buffer, "SceneBlock")?;
        device.bind_buffer(BufferTarget::Uniform, res.scene_buffer);
        device.buffer_data_size(
            BufferTarget::Uniform,
            SCENE_BLOCK_FLOATS * std::mem::size_of::<f32>(),
            BufferUsage::DynamicDraw,
        );
        resource::create_buffer(device, &mut res.model_buffer, "ModelBlock")?;
        device.bind_buffer(BufferTarget::Uniform, res.model_buffer);
        device.buffer_data_size(BufferTarget::Uniform, MODEL_BLOCK_BYTES, BufferUsage::StaticDraw);

        device.bind_buffer_base(BufferTarget::Uniform, SCENE_BINDING, res.scene_buffer);
        device.bind_buffer_base(BufferTarget::Uniform, MODEL_BINDING, res.model_buffer);
        device.bind_buffer(BufferTarget::Uniform, BufferId::NONE);
        Ok(())
    }

    fn setup(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let device = ctx.device;
        self.grid = self.options.u32_in("grid", DEFAULT_GRID, 1, MAX_GRID);

        let entries = model_entries(self.grid);
        device.bind_buffer(BufferTarget::Uniform, self.resources.model_buffer);
        device.buffer_sub_data(BufferTarget::Uniform, 0, bytemuck::cast_slice(entries.as_slice()));
        device.bind_buffer(BufferTarget::Uniform, BufferId::NONE);
        Ok(())
    }

    fn draw(&mut self, ctx: &SceneContext<'_>, frame: &FrameInfo) {
        let device = ctx.device;
        let res = &self.resources;
        let _guard = StateGuard::new(
            device,
            StateMask::ENABLES
                | StateMask::DEPTH_FUNC
                | StateMask::CLEAR_COLOR
                | StateMask::PROGRAM
                | StateMask::VERTEX_ARRAY
                | StateMask::UNIFORM_BUFFER,
        );

        let t = frame.elapsed;
        let vp = orbit_view_projection(ctx.canvas.aspect(), 60.0, 100.0, 18.0, t * 15.0, t * 10.0);
        let mut block = [0.0f32; SCENE_BLOCK_FLOATS];
        block[..16].copy_from_slice(&vp.to_cols_array());
        block[16..20].copy_from_slice(&LIGHT_DIR);
        block[20] = t;

        device.bind_buffer(BufferTarget::Uniform, res.scene_buffer);
        device.buffer_sub_data(BufferTarget::Uniform, 0, bytemuck::cast_slice(block.as_slice()));

        device.enable(EnableCap::DepthTest);
        device.depth_func(DepthFunc::Less);
        device.clear_color(CLEAR_COLOR);
        device.clear(ClearMask::COLOR | ClearMask::DEPTH);

        // Pipeline stages only apply while no program is current
        device.use_program(ProgramId::NONE);
        device.bind_program_pipeline(res.pipeline);
        device.bind_vertex_array(res.vertex_array);
        device.draw_arrays_instanced(PrimitiveMode::Triangles, 0, 36, (self.grid * self.grid) as i32);
        device.bind_program_pipeline(PipelineId::NONE);
    }

    fn unload(&mut self, device: &dyn GlDevice) {
        self.resources.release(device);
        self.grid = 0;
    }

    fn is_released(&self) -> bool {
        self.resources.is_released()
    }
}
