/// gl41-mrt: blended draw into up to four colour targets, then blit
///
/// The colour textures, the depth renderbuffer and the framebuffer form one
/// attachment set sized by (`targets`, `size`). Changing either rebuilds the
/// whole set: everything old is destroyed before anything new is created.

use crate::capability::{CapabilitySet, Feature};
use crate::device::{
    BlendEquation, BlendFactor, BufferId, BufferTarget, BufferUsage, ClearMask, DepthFunc, EnableCap,
    FramebufferId, FramebufferStatus, FramebufferTarget, GlDevice, PrimitiveMode, ProgramId, ReadBuffer,
    Rect, RenderbufferId, ShaderStage, TextureFilter, TextureId, TextureTarget, TextureWrap,
    UniformLocation, VertexArrayId,
};
use crate::engine_bail;
use crate::error::Result;
use crate::params::SceneOptions;
use crate::resource::{self, ResourceSet};
use crate::scene::scene::{probe_features, FrameInfo, Scene, SceneContext};
use crate::shader::{build_program, require_attrib, require_uniform, sources, ProgramDesc};
use crate::state::{StateGuard, StateMask};

const SOURCE: &str = "gl41mark::scene::mrt";

/// Colour attachments the fragment shader writes
pub const MAX_TARGETS: usize = 4;

pub const DEFAULT_SIZE: u32 = 1024;
pub const MIN_SIZE: u32 = 64;
pub const MAX_SIZE: u32 = 4096;

const EXTRA_FEATURES: [Feature; 3] = [Feature::FragDataLocation, Feature::IndexedBlend, Feature::Blit];
const CLEAR_COLOR: [f32; 4] = [0.02, 0.02, 0.03, 1.0];

/// Blend function for colour target `index`
fn target_blend(index: usize) -> (BlendFactor, BlendFactor) {
    match index % 4 {
        0 => (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
        1 => (BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
        2 => (BlendFactor::SrcAlpha, BlendFactor::One),
        _ => (BlendFactor::One, BlendFactor::One),
    }
}

#[derive(Debug, Default)]
pub struct MrtResources {
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub vertex_buffer: BufferId,
    pub framebuffer: FramebufferId,
    pub depth: RenderbufferId,
    pub color: [TextureId; MAX_TARGETS],
}

impl MrtResources {
    /// Destroy the attachment set only
    fn release_targets(&mut self, device: &dyn GlDevice) {
        resource::destroy_framebuffer(device, &mut self.framebuffer);
        resource::destroy_renderbuffer(device, &mut self.depth);
        resource::destroy_textures(device, &mut self.color);
    }
}

impl ResourceSet for MrtResources {
    fn release(&mut self, device: &dyn GlDevice) {
        self.release_targets(device);
        resource::destroy_buffer(device, &mut self.vertex_buffer);
        resource::destroy_vertex_array(device, &mut self.vertex_array);
        resource::destroy_program(device, &mut self.program);
    }

    fn is_released(&self) -> bool {
        !self.program.is_allocated()
            && !self.vertex_array.is_allocated()
            && !self.vertex_buffer.is_allocated()
            && !self.framebuffer.is_allocated()
            && !self.depth.is_allocated()
            && self.color.iter().all(|t| !t.is_allocated())
    }
}

pub struct MrtScene {
    options: SceneOptions,
    resources: MrtResources,
    caps: CapabilitySet,
    time_location: UniformLocation,
    /// Realized (targets, size); (0, 0) when no attachment set exists
    targets: u32,
    size: u32,
    rebuilds: u32,
}

impl MrtScene {
    pub const NAME: &'static str = "gl41-mrt";

    pub fn new() -> Self {
        Self {
            options: SceneOptions::new()
                .declare("targets", "4", "Number of colour attachments (1-4)")
                .declare("size", "1024", "Offscreen target size in pixels"),
            resources: MrtResources::default(),
            caps: CapabilitySet::default(),
            time_location: UniformLocation::default(),
            targets: 0,
            size: 0,
            rebuilds: 0,
        }
    }

    pub fn resources(&self) -> &MrtResources {
        &self.resources
    }

    pub fn targets(&self) -> u32 {
        self.targets
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Attachment sets built since construction
    pub fn rebuilds(&self) -> u32 {
        self.rebuilds
    }

    /// Full destroy pass, then a fresh attachment set
    fn rebuild_targets(&mut self, device: &dyn GlDevice, targets: u32, size: u32) -> Result<()> {
        let res = &mut self.resources;
        res.release_targets(device);
        self.targets = 0;
        self.size = 0;
        self.rebuilds += 1;

        let extent = size as i32;
        for (index, texture) in res.color.iter_mut().take(targets as usize).enumerate() {
            resource::create_texture(device, texture, &format!("mrt colour {}", index))?;
            device.bind_texture(TextureTarget::Texture2D, *texture);
            device.texture_filter(TextureTarget::Texture2D, TextureFilter::Linear, TextureFilter::Linear);
            device.texture_wrap(TextureTarget::Texture2D, TextureWrap::ClampToEdge);
            device.tex_image_2d_rgba8(TextureTarget::Texture2D, extent, extent, None);
        }
        device.bind_texture(TextureTarget::Texture2D, TextureId::NONE);

        resource::create_renderbuffer(device, &mut res.depth, "mrt depth")?;
        device.bind_renderbuffer(res.depth);
        device.renderbuffer_storage_depth24(extent, extent);
        device.bind_renderbuffer(RenderbufferId::NONE);

        resource::create_framebuffer(device, &mut res.framebuffer, "mrt")?;
        device.bind_framebuffer(FramebufferTarget::Framebuffer, res.framebuffer);
        for (index, texture) in res.color.iter().take(targets as usize).enumerate() {
            device.framebuffer_color_texture(FramebufferTarget::Framebuffer, index as u32, *texture);
        }
        device.framebuffer_depth_renderbuffer(FramebufferTarget::Framebuffer, res.depth);
        device.draw_buffers(targets);

        let status = device.check_framebuffer_status(FramebufferTarget::Framebuffer);
        device.bind_framebuffer(FramebufferTarget::Framebuffer, FramebufferId::NONE);
        if let FramebufferStatus::Incomplete(code) = status {
            engine_bail!(SOURCE, ResourceAllocationFailure, "FBO incomplete (0x{:x})", code);
        }

        self.targets = targets;
        self.size = size;
        Ok(())
    }
}

impl Default for MrtScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for MrtScene {
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
        self.caps = probe_features(ctx, SOURCE, &EXTRA_FEATURES, false)?;

        let stages = [
            (ShaderStage::Vertex, sources::MRT_VS),
            (ShaderStage::Fragment, sources::MRT_FS),
        ];
        let desc = ProgramDesc {
            frag_data: &sources::MRT_OUTPUTS,
            ..ProgramDesc::new(Self::NAME, &stages)
        };
        let res = &mut self.resources;
        res.program = build_program(device, ctx.rewriter, &desc, SOURCE)?;
        let position = require_attrib(device, res.program, "position", SOURCE)?;
        self.time_location = require_uniform(device, res.program, "uTime", SOURCE)?;

        // Fullscreen triangle
        let triangle: [[f32; 2]; 3] = [[-1.0, -1.0], [3.0, -1.0], [-1.0, 3.0]];
        resource::create_vertex_array(device, &mut res.vertex_array, "mrt vao")?;
        device.bind_vertex_array(res.vertex_array);
        resource::create_buffer(device, &mut res.vertex_buffer, "mrt triangle")?;
        device.bind_buffer(BufferTarget::Array, res.vertex_buffer);
        device.buffer_data(BufferTarget::Array, bytemuck::cast_slice(triangle.as_slice()), BufferUsage::StaticDraw);
        device.enable_vertex_attrib_array(position);
        device.vertex_attrib_pointer_f32(position, 2, 0, 0);
        device.bind_vertex_array(VertexArrayId::NONE);
        device.bind_buffer(BufferTarget::Array, BufferId::NONE);

        self.rebuild_targets(device, MAX_TARGETS as u32, DEFAULT_SIZE)
    }

    fn setup(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        let targets = self.options.u32_in("targets", MAX_TARGETS as u32, 1, MAX_TARGETS as u32);
        let size = self.options.u32_in("size", DEFAULT_SIZE, MIN_SIZE, MAX_SIZE);
        if targets != self.targets || size != self.size {
            self.rebuild_targets(ctx.device, targets, size)?;
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &SceneContext<'_>, frame: &FrameInfo) {
        if !self.caps.has(Feature::IndexedBlend) || !self.caps.has(Feature::Blit) {
            return;
        }
        let device = ctx.device;
        let res = &self.resources;
        let _guard = StateGuard::new(
            device,
            StateMask::FRAMEBUFFERS
                | StateMask::VIEWPORT
                | StateMask::ENABLES
                | StateMask::DEPTH_FUNC
                | StateMask::CLEAR_COLOR
                | StateMask::PROGRAM
                | StateMask::VERTEX_ARRAY
                | StateMask::READ_BUFFER,
        );

        let extent = self.size as i32;
        device.enable(EnableCap::DepthTest);
        device.depth_func(DepthFunc::Less);
        device.bind_framebuffer(FramebufferTarget::Framebuffer, res.framebuffer);
        device.viewport(Rect::new(0, 0, extent, extent));
        device.clear_color(CLEAR_COLOR);
        device.clear(ClearMask::COLOR | ClearMask::DEPTH);

        for index in 0..self.targets {
            let (src, dst) = target_blend(index as usize);
            device.enable_indexed(EnableCap::Blend, index);
            device.blend_equation_indexed(index, BlendEquation::FuncAdd);
            device.blend_func_indexed(index, src, dst);
        }

        device.use_program(res.program);
        device.uniform_1_f32(self.time_location, frame.elapsed);
        device.bind_vertex_array(res.vertex_array);
        device.draw_arrays(PrimitiveMode::Triangles, 0, 3);

        for index in 0..self.targets {
            device.disable_indexed(EnableCap::Blend, index);
        }

        device.bind_framebuffer(FramebufferTarget::Read, res.framebuffer);
        device.read_buffer(ReadBuffer::ColorAttachment(0));
        device.bind_framebuffer(FramebufferTarget::Draw, FramebufferId::NONE);
        device.blit_framebuffer(
            Rect::new(0, 0, extent, extent),
            Rect::sized(ctx.canvas.width(), ctx.canvas.height()),
            ClearMask::COLOR,
            true,
        );
    }

    fn unload(&mut self, device: &dyn GlDevice) {
        self.resources.release(device);
        self.targets = 0;
        self.size = 0;
    }

    fn is_released(&self) -> bool {
        self.resources.is_released()
    }
}
