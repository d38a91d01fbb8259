/// gl41-geometry: a point grid expanded to quads by a geometry shader

use crate::device::{
    BufferId, BufferTarget, BufferUsage, GlDevice, PrimitiveMode, ProgramId, ShaderStage, UniformLocation,
    VertexArrayId,
};
use crate::error::Result;
use crate::params::SceneOptions;
use crate::resource::{self, ResourceSet};
use crate::scene::scene::{probe_features, FrameInfo, Scene, SceneContext};
use crate::shader::{build_program, require_attrib, require_uniform, sources, ProgramDesc};
use crate::state::{StateGuard, StateMask};

const SOURCE: &str = "gl41mark::scene::geometry";

pub const DEFAULT_POINTS: u32 = 65536;
pub const DEFAULT_POINT_SIZE: f32 = 0.012;

/// `count` points on a square grid spanning -1..1
pub fn point_grid(count: u32) -> Vec<[f32; 2]> {
    let side = (count as f64).sqrt().ceil() as u32;
    let span = |cell: u32| if side > 1 { -1.0 + 2.0 * cell as f32 / (side - 1) as f32 } else { 0.0 };
    (0..count).map(|i| [span(i % side), span(i / side)]).collect()
}

#[derive(Debug, Default)]
pub struct GeometryResources {
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub vertex_buffer: BufferId,
}

impl ResourceSet for GeometryResources {
    fn release(&mut self, device: &dyn GlDevice) {
        resource::destroy_buffer(device, &mut self.vertex_buffer);
        resource::destroy_vertex_array(device, &mut self.vertex_array);
        resource::destroy_program(device, &mut self.program);
    }

    fn is_released(&self) -> bool {
        !self.program.is_allocated() && !self.vertex_array.is_allocated() && !self.vertex_buffer.is_allocated()
    }
}

pub struct GeometryScene {
    options: SceneOptions,
    resources: GeometryResources,
    size_location: UniformLocation,
    time_location: UniformLocation,
    points: u32,
    point_size: f32,
}

impl GeometryScene {
    pub const NAME: &'static str = "gl41-geometry";

    pub fn new() -> Self {
        Self {
            options: SceneOptions::new()
                .declare("points", "65536", "Number of points expanded by the geometry shader")
                .declare("size", "0.012", "Quad half-size in clip space (0.001..0.05)"),
            resources: GeometryResources::default(),
            size_location: UniformLocation::default(),
            time_location: UniformLocation::default(),
            points: 0,
            point_size: DEFAULT_POINT_SIZE,
        }
    }

    pub fn resources(&self) -> &GeometryResources {
        &self.resources
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }
}

impl Default for GeometryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for GeometryScene {
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
            (ShaderStage::Vertex, sources::GEOMETRY_VS),
            (ShaderStage::Geometry, sources::GEOMETRY_GS),
            (ShaderStage::Fragment, sources::GEOMETRY_FS),
        ];
        let res = &mut self.resources;
        res.program = build_program(device, ctx.rewriter, &ProgramDesc::new(Self::NAME, &stages), SOURCE)?;
        let position = require_attrib(device, res.program, "position", SOURCE)?;
        self.size_location = require_uniform(device, res.program, "uSize", SOURCE)?;
        self.time_location = require_uniform(device, res.program, "uTime", SOURCE)?;

        resource::create_vertex_array(device, &mut res.vertex_array, "geometry vao")?;
        device.bind_vertex_array(res.vertex_array);
        resource::create_buffer(device, &mut res.vertex_buffer, "geometry points")?;
        device.bind_buffer(BufferTarget::Array, res.vertex_buffer);
        device.enable_vertex_attrib_array(position);
        device.vertex_attrib_pointer_f32(position, 2, 0, 0);
        device.bind_vertex_array(VertexArrayId::NONE);
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);
        Ok(())
    }

    fn setup(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let device = ctx.device;
        self.points = self.options.u32_in("points", DEFAULT_POINTS, 1024, 262144);
        self.point_size = self.options.f32_in("size", DEFAULT_POINT_SIZE, 0.001, 0.05);

        let grid = point_grid(self.points);
        device.bind_buffer(BufferTarget::Array, self.resources.vertex_buffer);
        device.buffer_data(BufferTarget::Array, bytemuck::cast_slice(grid.as_slice()), BufferUsage::StaticDraw);
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);

        let _guard = StateGuard::new(device, StateMask::PROGRAM);
        device.use_program(self.resources.program);
        device.uniform_2_f32(self.size_location, self.point_size, self.point_size);
        Ok(())
    }

    fn draw(&mut self, ctx: &SceneContext<'_>, frame: &FrameInfo) {
        let device = ctx.device;
        let res = &self.resources;
        let _guard = StateGuard::new(device, StateMask::PROGRAM | StateMask::VERTEX_ARRAY);

        device.use_program(res.program);
        device.uniform_1_f32(self.time_location, frame.elapsed);
        device.bind_vertex_array(res.vertex_array);
        device.draw_arrays(PrimitiveMode::Points, 0, self.points as i32);
    }

    fn unload(&mut self, device: &dyn GlDevice) {
        self.resources.release(device);
        self.points = 0;
    }

    fn is_released(&self) -> bool {
        self.resources.is_released()
    }
}
