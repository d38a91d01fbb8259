/// gl41-streaming-sync: per-frame vertex streaming through a fenced ring

use crate::capability::Feature;
use crate::device::{
    ClearMask, EnableCap, FramebufferId, FramebufferTarget, GlDevice, PrimitiveMode, ProgramId, Rect,
    ShaderStage, UniformLocation, VertexArrayId,
};
use crate::error::Result;
use crate::params::SceneOptions;
use crate::resource::{self, ResourceSet};
use crate::scene::scene::{orbit_view_projection, probe_features, FrameInfo, Scene, SceneContext};
use crate::shader::{build_program, require_attrib, require_uniform, sources, ProgramDesc};
use crate::state::{StateGuard, StateMask};
use crate::streaming::{StreamingRing, DEFAULT_STREAM_BYTES, MAX_STREAM_BYTES, MIN_STREAM_BYTES};

const SOURCE: &str = "gl41mark::scene::streaming-sync";

const EXTRA_FEATURES: [Feature; 2] = [Feature::MapBufferRange, Feature::SyncObjects];
const CLEAR_COLOR: [f32; 4] = [0.02, 0.02, 0.03, 1.0];

#[derive(Debug)]
pub struct StreamingSyncResources {
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub ring: StreamingRing,
}

impl Default for StreamingSyncResources {
    fn default() -> Self {
        Self {
            program: ProgramId::NONE,
            vertex_array: VertexArrayId::NONE,
            ring: StreamingRing::new(SOURCE),
        }
    }
}

impl ResourceSet for StreamingSyncResources {
    fn release(&mut self, device: &dyn GlDevice) {
        self.ring.release(device);
        resource::destroy_vertex_array(device, &mut self.vertex_array);
        resource::destroy_program(device, &mut self.program);
    }

    fn is_released(&self) -> bool {
        self.ring.is_released() && !self.program.is_allocated() && !self.vertex_array.is_allocated()
    }
}

pub struct StreamingSyncScene {
    options: SceneOptions,
    resources: StreamingSyncResources,
    mvp_location: UniformLocation,
    position: u32,
}

impl StreamingSyncScene {
    pub const NAME: &'static str = "gl41-streaming-sync";

    pub fn new() -> Self {
        Self {
            options: SceneOptions::new().declare(
                "bytes",
                "4194304",
                "Streaming buffer size in bytes (262144..67108864, aligned to 256)",
            ),
            resources: StreamingSyncResources::default(),
            mvp_location: UniformLocation::default(),
            position: 0,
        }
    }

    pub fn resources(&self) -> &StreamingSyncResources {
        &self.resources
    }

    pub fn ring(&self) -> &StreamingRing {
        &self.resources.ring
    }
}

impl Default for StreamingSyncScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for StreamingSyncScene {
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
        probe_features(ctx, SOURCE, &EXTRA_FEATURES, ctx.config.show_errors).is_ok()
    }

    fn load(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let device = ctx.device;
        probe_features(ctx, SOURCE, &EXTRA_FEATURES, false)?;

        let stages = [
            (ShaderStage::Vertex, sources::STREAMING_VS),
            (ShaderStage::Fragment, sources::STREAMING_FS),
        ];
        let res = &mut self.resources;
        res.program = build_program(device, ctx.rewriter, &ProgramDesc::new(Self::NAME, &stages), SOURCE)?;
        self.mvp_location = require_uniform(device, res.program, "uMVP", SOURCE)?;
        self.position = require_attrib(device, res.program, "position", SOURCE)?;

        resource::create_vertex_array(device, &mut res.vertex_array, "streaming vao")?;
        device.bind_vertex_array(res.vertex_array);
        device.enable_vertex_attrib_array(self.position);
        device.bind_vertex_array(VertexArrayId::NONE);

        res.ring.configure(device, DEFAULT_STREAM_BYTES)?;
        Ok(())
    }

    fn setup(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let bytes = self.options.u64_in("bytes", DEFAULT_STREAM_BYTES, MIN_STREAM_BYTES, MAX_STREAM_BYTES);
        self.resources.ring.configure(ctx.device, bytes)?;
        Ok(())
    }

    fn draw(&mut self, ctx: &SceneContext<'_>, frame: &FrameInfo) {
        let device = ctx.device;
        let _guard = StateGuard::new(
            device,
            StateMask::FRAMEBUFFERS
                | StateMask::VIEWPORT
                | StateMask::ENABLES
                | StateMask::COLOR_MASK
                | StateMask::CLEAR_COLOR
                | StateMask::PROGRAM
                | StateMask::VERTEX_ARRAY
                | StateMask::ARRAY_BUFFER,
        );
        let res = &mut self.resources;
        let t = frame.elapsed;

        let slot = res.ring.acquire(device, &ctx.config.fence_wait);
        device.bind_vertex_array(res.vertex_array);
        res.ring.write(device, slot, t);
        device.vertex_attrib_pointer_f32(self.position, 3, 0, 0);

        device.bind_framebuffer(FramebufferTarget::Framebuffer, FramebufferId::NONE);
        device.viewport(Rect::sized(ctx.canvas.width(), ctx.canvas.height()));
        for cap in [EnableCap::CullFace, EnableCap::Blend, EnableCap::ScissorTest, EnableCap::StencilTest] {
            device.disable(cap);
        }
        device.enable(EnableCap::DepthTest);
        device.color_mask([true; 4]);

        let mvp = orbit_view_projection(ctx.canvas.aspect(), 60.0, 10.0, 3.2, t * 20.0, t * 13.0);
        device.use_program(res.program);
        device.uniform_matrix_4_f32(self.mvp_location, &mvp.to_cols_array());

        device.clear_color(CLEAR_COLOR);
        device.clear(ClearMask::COLOR | ClearMask::DEPTH);
        device.draw_arrays(PrimitiveMode::Triangles, 0, res.ring.vertex_count() as i32);

        res.ring.retire(device, slot);
    }

    fn unload(&mut self, device: &dyn GlDevice) {
        self.resources.release(device);
    }

    fn is_released(&self) -> bool {
        self.resources.is_released()
    }
}
