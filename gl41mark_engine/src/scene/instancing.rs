/// gl41-instancing: one instanced draw of a small quad on a grid

use crate::device::{
    BufferId, BufferTarget, BufferUsage, GlDevice, PrimitiveMode, ProgramId, ShaderStage, VertexArrayId,
};
use crate::error::Result;
use crate::params::SceneOptions;
use crate::resource::{self, ResourceSet};
use crate::scene::scene::{centered_grid, probe_features, spin_matrix, FrameInfo, Scene, SceneContext};
use crate::shader::{build_program, require_attrib, require_uniform_block, sources, ProgramDesc};
use crate::state::{StateGuard, StateMask};

const SOURCE: &str = "gl41mark::scene::instancing";

pub const DEFAULT_INSTANCES: u32 = 4096;
pub const MAX_INSTANCES: u32 = 16384;

const QUAD_HALF: f32 = 0.01;
const MATRICES_BINDING: u32 = 0;

/// Driver objects owned by the instancing scene
#[derive(Debug, Default)]
pub struct InstancingResources {
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub quad_buffer: BufferId,
    pub offset_buffer: BufferId,
    pub uniform_buffer: BufferId,
}

impl ResourceSet for InstancingResources {
    fn release(&mut self, device: &dyn GlDevice) {
        resource::destroy_buffer(device, &mut self.uniform_buffer);
        resource::destroy_buffer(device, &mut self.offset_buffer);
        resource::destroy_buffer(device, &mut self.quad_buffer);
        resource::destroy_vertex_array(device, &mut self.vertex_array);
        resource::destroy_program(device, &mut self.program);
    }

    fn is_released(&self) -> bool {
        !self.program.is_allocated()
            && !self.vertex_array.is_allocated()
            && !self.quad_buffer.is_allocated()
            && !self.offset_buffer.is_allocated()
            && !self.uniform_buffer.is_allocated()
    }
}

pub struct InstancingScene {
    options: SceneOptions,
    resources: InstancingResources,
    instances: u32,
}

impl InstancingScene {
    pub const NAME: &'static str = "gl41-instancing";

    pub fn new() -> Self {
        Self {
            options: SceneOptions::new().declare("instances", "4096", "Number of instances to draw"),
            resources: InstancingResources::default(),
            instances: 0,
        }
    }

    pub fn resources(&self) -> &InstancingResources {
        &self.resources
    }

    /// Realized instance count after the last setup
    pub fn instances(&self) -> u32 {
        self.instances
    }
}

impl Default for InstancingScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for InstancingScene {
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
        probe_features(ctx, SOURCE, &[], ctx.config.show_errors).is_ok()
    }

    fn load(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let device = ctx.device;
        probe_features(ctx, SOURCE, &[], false)?;

        let stages = [
            (ShaderStage::Vertex, sources::INSTANCING_VS),
            (ShaderStage::Fragment, sources::INSTANCING_FS),
        ];
        let res = &mut self.resources;
        res.program = build_program(device, ctx.rewriter, &ProgramDesc::new(Self::NAME, &stages), SOURCE)?;

        let position = require_attrib(device, res.program, "position", SOURCE)?;
        let offset = require_attrib(device, res.program, "instanceOffset", SOURCE)?;
        let block = require_uniform_block(device, res.program, "Matrices", SOURCE)?;
        device.uniform_block_binding(res.program, block, MATRICES_BINDING);

        resource::create_vertex_array(device, &mut res.vertex_array, "instancing vao")?;
        device.bind_vertex_array(res.vertex_array);

        let s = QUAD_HALF;
        let quad: [[f32; 2]; 6] = [[-s, -s], [s, -s], [s, s], [-s, -s], [s, s], [-s, s]];
        resource::create_buffer(device, &mut res.quad_buffer, "instancing quad")?;
        device.bind_buffer(BufferTarget::Array, res.quad_buffer);
        device.buffer_data(BufferTarget::Array, bytemuck::cast_slice(quad.as_slice()), BufferUsage::StaticDraw);
        device.enable_vertex_attrib_array(position);
        device.vertex_attrib_pointer_f32(position, 2, 0, 0);

        resource::create_buffer(device, &mut res.offset_buffer, "instancing offsets")?;
        device.bind_buffer(BufferTarget::Array, res.offset_buffer);
        device.enable_vertex_attrib_array(offset);
        device.vertex_attrib_pointer_f32(offset, 2, 0, 0);
        device.vertex_attrib_divisor(offset, 1);

        device.bind_vertex_array(VertexArrayId::NONE);
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);

        resource::create_buffer(device, &mut res.uniform_buffer, "instancing matrices")?;
        device.bind_buffer(BufferTarget::Uniform, res.uniform_buffer);
        device.buffer_data_size(BufferTarget::Uniform, std::mem::size_of::<[f32; 16]>(), BufferUsage::DynamicDraw);
        device.bind_buffer_base(BufferTarget::Uniform, MATRICES_BINDING, res.uniform_buffer);
        device.bind_buffer(BufferTarget::Uniform, BufferId::NONE);
        Ok(())
    }

    fn setup(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let device = ctx.device;
        self.instances = self.options.u32_in("instances", DEFAULT_INSTANCES, 1, MAX_INSTANCES);

        let offsets = centered_grid(self.instances);
        device.bind_buffer(BufferTarget::Array, self.resources.offset_buffer);
        device.buffer_data(BufferTarget::Array, bytemuck::cast_slice(offsets.as_slice()), BufferUsage::StaticDraw);
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);
        Ok(())
    }

    fn draw(&mut self, ctx: &SceneContext<'_>, frame: &FrameInfo) {
        let device = ctx.device;
        let res = &self.resources;
        let _guard = StateGuard::new(
            device,
            StateMask::PROGRAM | StateMask::VERTEX_ARRAY | StateMask::UNIFORM_BUFFER,
        );

        let mvp = spin_matrix(frame.frame);
        device.bind_buffer(BufferTarget::Uniform, res.uniform_buffer);
        device.buffer_sub_data(BufferTarget::Uniform, 0, bytemuck::cast_slice(mvp.as_slice()));
        device.bind_buffer_base(BufferTarget::Uniform, MATRICES_BINDING, res.uniform_buffer);

        device.use_program(res.program);
        device.bind_vertex_array(res.vertex_array);
        device.draw_arrays_instanced(PrimitiveMode::Triangles, 0, 6, self.instances as i32);
    }

    fn unload(&mut self, device: &dyn GlDevice) {
        self.resources.release(device);
        self.instances = 0;
    }

    fn is_released(&self) -> bool {
        self.resources.is_released()
    }
}
