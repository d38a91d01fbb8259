/// GlDevice trait - the only path from the core to the driver
///
/// Methods take `&self`: command submission is single-threaded and GL keeps
/// its own server-side state, so backends wrap a context handle and use
/// interior mutability for any bookkeeping of their own.
///
/// Creation methods return the `NONE` sentinel on failure instead of an
/// error; callers go through `crate::resource` which turns that into
/// `Error::ResourceAllocationFailure`.

use crate::device::handles::{
    BufferId, FramebufferId, PipelineId, ProgramId, RenderbufferId, ShaderId, SyncId,
    TextureId, VertexArrayId,
};
use crate::device::types::{
    BlendEquation, BlendFactor, BufferTarget, BufferUsage, ClearMask, DepthFunc, EnableCap,
    FramebufferStatus, FramebufferTarget, IntegerQuery, MapAccess, MapOutcome, PrimitiveMode,
    ProcAddress, ProgramStages, ReadBuffer, Rect, ShaderStage, StringQuery, TextureFilter,
    TextureTarget, TextureWrap, UniformLocation, WaitResult,
};

pub trait GlDevice {
    // ===== CONTEXT / CAPABILITY QUERIES =====

    /// Resolve an entry point by name (`None` when the driver lacks it)
    fn get_proc_address(&self, name: &str) -> Option<ProcAddress>;

    /// glGetString; `None` when the driver returns null
    fn get_string(&self, query: StringQuery) -> Option<String>;

    /// glGetStringi; `None` when the driver returns null
    fn get_string_indexed(&self, query: StringQuery, index: u32) -> Option<String>;

    /// glGetIntegerv; `None` when the query raised a GL error
    fn get_integer(&self, query: IntegerQuery) -> Option<i32>;

    // ===== SHADERS AND PROGRAMS =====

    fn create_shader(&self, stage: ShaderStage) -> ShaderId;
    fn shader_source(&self, shader: ShaderId, source: &str);
    fn compile_shader(&self, shader: ShaderId);
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> ProgramId;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    /// glProgramParameteri(GL_PROGRAM_SEPARABLE)
    fn set_program_separable(&self, program: ProgramId, separable: bool);
    fn bind_frag_data_location(&self, program: ProgramId, color: u32, name: &str);
    fn link_program(&self, program: ProgramId);
    fn program_link_status(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn delete_program(&self, program: ProgramId);
    /// `ProgramId::NONE` unbinds
    fn use_program(&self, program: ProgramId);

    fn get_attrib_location(&self, program: ProgramId, name: &str) -> Option<u32>;
    fn get_uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn get_uniform_block_index(&self, program: ProgramId, name: &str) -> Option<u32>;
    fn uniform_block_binding(&self, program: ProgramId, block: u32, binding: u32);
    fn uniform_1_i32(&self, location: UniformLocation, value: i32);
    fn uniform_1_f32(&self, location: UniformLocation, value: f32);
    fn uniform_2_f32(&self, location: UniformLocation, x: f32, y: f32);
    fn uniform_matrix_4_f32(&self, location: UniformLocation, value: &[f32; 16]);

    // ===== PROGRAM PIPELINES =====

    fn create_program_pipeline(&self) -> PipelineId;
    fn bind_program_pipeline(&self, pipeline: PipelineId);
    fn use_program_stages(&self, pipeline: PipelineId, stages: ProgramStages, program: ProgramId);
    fn delete_program_pipeline(&self, pipeline: PipelineId);

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> VertexArrayId;
    fn bind_vertex_array(&self, vertex_array: VertexArrayId);
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);
    fn enable_vertex_attrib_array(&self, index: u32);
    /// Float attribute sourced from the bound GL_ARRAY_BUFFER (strides/offsets in bytes)
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);
    fn vertex_attrib_divisor(&self, index: u32, divisor: u32);

    // ===== BUFFERS =====

    fn create_buffer(&self) -> BufferId;
    fn bind_buffer(&self, target: BufferTarget, buffer: BufferId);
    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: BufferId);
    /// Allocate (or orphan) the bound buffer's store without data
    fn buffer_data_size(&self, target: BufferTarget, size: usize, usage: BufferUsage);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]);
    /// Map `[0, length)` of the bound buffer, let `write` fill it, then unmap
    fn write_mapped_range(
        &self,
        target: BufferTarget,
        length: usize,
        access: MapAccess,
        write: &mut dyn FnMut(&mut [u8]),
    ) -> MapOutcome;
    fn delete_buffer(&self, buffer: BufferId);

    // ===== TEXTURES =====

    fn create_texture(&self) -> TextureId;
    fn bind_texture(&self, target: TextureTarget, texture: TextureId);
    /// Zero-based texture unit index
    fn active_texture(&self, unit: u32);
    fn texture_filter(&self, target: TextureTarget, min: TextureFilter, mag: TextureFilter);
    fn texture_wrap(&self, target: TextureTarget, wrap: TextureWrap);
    fn tex_image_2d_rgba8(&self, target: TextureTarget, width: i32, height: i32, pixels: Option<&[u8]>);
    fn tex_image_3d_rgba8(
        &self,
        target: TextureTarget,
        width: i32,
        height: i32,
        depth: i32,
        pixels: Option<&[u8]>,
    );
    fn tex_sub_image_3d_rgba8(&self, target: TextureTarget, layer: i32, width: i32, height: i32, pixels: &[u8]);
    fn generate_mipmap(&self, target: TextureTarget);
    fn delete_texture(&self, texture: TextureId);

    // ===== FRAMEBUFFERS AND RENDERBUFFERS =====

    fn create_framebuffer(&self) -> FramebufferId;
    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: FramebufferId);
    fn framebuffer_color_texture(&self, target: FramebufferTarget, attachment: u32, texture: TextureId);
    fn framebuffer_depth_renderbuffer(&self, target: FramebufferTarget, renderbuffer: RenderbufferId);
    /// glDrawBuffers with COLOR_ATTACHMENT0..count
    fn draw_buffers(&self, count: u32);
    fn check_framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus;
    fn read_buffer(&self, buffer: ReadBuffer);
    fn blit_framebuffer(&self, src: Rect, dst: Rect, mask: ClearMask, linear: bool);
    fn delete_framebuffer(&self, framebuffer: FramebufferId);

    fn create_renderbuffer(&self) -> RenderbufferId;
    fn bind_renderbuffer(&self, renderbuffer: RenderbufferId);
    fn renderbuffer_storage_depth24(&self, width: i32, height: i32);
    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId);

    // ===== FIXED-FUNCTION STATE =====

    fn enable(&self, cap: EnableCap);
    fn disable(&self, cap: EnableCap);
    fn is_enabled(&self, cap: EnableCap) -> bool;
    fn enable_indexed(&self, cap: EnableCap, index: u32);
    fn disable_indexed(&self, cap: EnableCap, index: u32);
    fn blend_func_indexed(&self, index: u32, src: BlendFactor, dst: BlendFactor);
    fn blend_equation_indexed(&self, index: u32, equation: BlendEquation);
    fn viewport(&self, rect: Rect);
    fn depth_func(&self, func: DepthFunc);
    fn color_mask(&self, mask: [bool; 4]);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self, mask: ClearMask);

    // ===== STATE QUERIES =====

    fn framebuffer_binding(&self, target: FramebufferTarget) -> FramebufferId;
    fn buffer_binding(&self, target: BufferTarget) -> BufferId;
    fn current_program(&self) -> ProgramId;
    fn vertex_array_binding(&self) -> VertexArrayId;
    fn viewport_rect(&self) -> Rect;
    fn current_depth_func(&self) -> DepthFunc;
    fn current_color_mask(&self) -> [bool; 4];
    /// Zero-based texture unit index
    fn current_active_texture(&self) -> u32;
    fn current_read_buffer(&self) -> ReadBuffer;
    fn current_clear_color(&self) -> [f32; 4];
    /// Texture bound to `target` on the active unit
    fn texture_binding(&self, target: TextureTarget) -> TextureId;

    // ===== DRAWS =====

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32);
    fn draw_arrays_instanced(&self, mode: PrimitiveMode, first: i32, count: i32, instances: i32);

    // ===== SYNCHRONIZATION =====

    /// glFenceSync(GL_SYNC_GPU_COMMANDS_COMPLETE)
    fn fence_sync(&self) -> SyncId;
    fn client_wait_sync(&self, sync: SyncId, flush: bool, timeout_ns: u64) -> WaitResult;
    fn delete_sync(&self, sync: SyncId);
    /// Blocking full pipeline drain
    fn finish(&self);
}
