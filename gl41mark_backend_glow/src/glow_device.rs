/// GlowDevice - GlDevice implementation over a glow::Context
///
/// Wraps the context of the current thread. Object names cross the trait as
/// plain `u32` newtypes and are rebuilt into glow natives on each call;
/// fence pointers live in a slot map and cross as 64-bit keys.

use crate::debug::record_gl_error;
use crate::glow_convert::*;
use crate::raw_procs::RawProcs;
use gl41mark_engine::gl41mark::device::{
    BlendEquation, BlendFactor, BufferId, BufferTarget, BufferUsage, ClearMask, DepthFunc,
    EnableCap, FramebufferId, FramebufferStatus, FramebufferTarget, GlDevice, IntegerQuery,
    MapAccess, MapOutcome, PipelineId, PrimitiveMode, ProcAddress, ProgramId, ProgramStages,
    ReadBuffer, Rect, RenderbufferId, ShaderId, ShaderStage, StringQuery, SyncId, TextureFilter,
    TextureId, TextureTarget, TextureWrap, UniformLocation, VertexArrayId, WaitResult,
};
use gl41mark_engine::gl41mark::Result;
use gl41mark_engine::{engine_bail, engine_debug, engine_info, engine_warn};
use glow::HasContext;
use rustc_hash::FxHashMap;
use slotmap::{Key, KeyData, SlotMap};
use std::cell::RefCell;
use std::ffi::c_void;

const SOURCE: &str = "gl41mark::backend::glow";

/// Upper bound on queued errors drained in one go (a lost context can
/// report GL_CONTEXT_LOST forever)
const MAX_DRAINED_ERRORS: usize = 16;

slotmap::new_key_type! {
    /// Slot map key behind a `SyncId`
    struct FenceKey;
}

type Loader = Box<dyn Fn(&str) -> *const c_void>;

/// OpenGL device backed by glow
///
/// Every method issues GL calls on the calling thread, which must have the
/// context current.
pub struct GlowDevice {
    gl: glow::Context,
    loader: Loader,
    raw: RawProcs,
    procs: RefCell<FxHashMap<String, Option<ProcAddress>>>,
    fences: RefCell<SlotMap<FenceKey, glow::NativeFence>>,
}

impl GlowDevice {
    /// Build a device from the platform's `GetProcAddress`
    ///
    /// # Safety
    ///
    /// The context that `loader` resolves against must be current on this
    /// thread for every later call on the device.
    pub unsafe fn from_loader_function<F>(loader: F) -> Result<Self>
    where
        F: Fn(&str) -> *const c_void + 'static,
    {
        let loader: Loader = Box::new(loader);
        let raw = RawProcs::load(loader.as_ref());
        if !raw.has_get_string() {
            engine_bail!(SOURCE, InitializationFailed, "glGetString not resolvable, no current GL context");
        }
        // glow parses GL_VERSION while building its context and cannot fail
        if raw.get_string(glow::VERSION).is_none() {
            engine_bail!(SOURCE, BackendError, "glGetString(GL_VERSION) returned null");
        }

        let gl = glow::Context::from_loader_function(|name| loader(name));
        let device = Self {
            gl,
            loader,
            raw,
            procs: RefCell::new(FxHashMap::default()),
            fences: RefCell::new(SlotMap::with_key()),
        };

        engine_info!(
            SOURCE,
            "GL context: {} / {}",
            device.get_string(StringQuery::Renderer).unwrap_or_default(),
            device.get_string(StringQuery::Version).unwrap_or_default()
        );
        Ok(device)
    }

    /// The wrapped glow context
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }

    /// Fences currently alive
    pub fn live_fences(&self) -> usize {
        self.fences.borrow().len()
    }

    /// Drain glGetError after `call` (only with `gl-error-checks`)
    #[inline]
    fn check(&self, call: &'static str) {
        #[cfg(feature = "gl-error-checks")]
        {
            for _ in 0..MAX_DRAINED_ERRORS {
                let code = unsafe { self.gl.get_error() };
                if code == glow::NO_ERROR {
                    break;
                }
                let count = record_gl_error(call, code);
                if count == 1 {
                    gl41mark_engine::engine_error!(SOURCE, "{} raised {}", call, gl_error_name(code));
                }
            }
        }
        #[cfg(not(feature = "gl-error-checks"))]
        let _ = call;
    }

    /// Discard pending errors so the next glGetError belongs to one call
    fn clear_errors(&self) {
        for _ in 0..MAX_DRAINED_ERRORS {
            if unsafe { self.gl.get_error() } == glow::NO_ERROR {
                break;
            }
        }
    }

    fn get_i32(&self, pname: u32) -> i32 {
        unsafe { self.gl.get_parameter_i32(pname) }
    }

    fn fence_key(sync: SyncId) -> FenceKey {
        FenceKey::from(KeyData::from_ffi(sync.raw()))
    }

    fn created<T>(&self, what: &str, result: std::result::Result<T, String>) -> Option<T> {
        match result {
            Ok(native) => Some(native),
            Err(message) => {
                engine_warn!(SOURCE, "glCreate{} failed: {}", what, message);
                None
            }
        }
    }
}

impl std::fmt::Debug for GlowDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowDevice")
            .field("resolved_procs", &self.procs.borrow().len())
            .field("live_fences", &self.fences.borrow().len())
            .finish()
    }
}

impl GlDevice for GlowDevice {
    // ===== CONTEXT / CAPABILITY QUERIES =====

    fn get_proc_address(&self, name: &str) -> Option<ProcAddress> {
        if let Some(cached) = self.procs.borrow().get(name) {
            return *cached;
        }
        let address = ProcAddress::from_ptr((self.loader)(name));
        if address.is_none() {
            engine_debug!(SOURCE, "{} not exported by the driver", name);
        }
        self.procs.borrow_mut().insert(name.to_string(), address);
        address
    }

    fn get_string(&self, query: StringQuery) -> Option<String> {
        unsafe { self.raw.get_string(string_query_to_gl(query)) }
    }

    fn get_string_indexed(&self, query: StringQuery, index: u32) -> Option<String> {
        unsafe { self.raw.get_string_i(string_query_to_gl(query), index) }
    }

    fn get_integer(&self, query: IntegerQuery) -> Option<i32> {
        self.clear_errors();
        let value = self.get_i32(integer_query_to_gl(query));
        let code = unsafe { self.gl.get_error() };
        if code != glow::NO_ERROR {
            record_gl_error("glGetIntegerv", code);
            engine_debug!(SOURCE, "glGetIntegerv({:?}) raised {}", query, gl_error_name(code));
            return None;
        }
        Some(value)
    }

    // ===== SHADERS AND PROGRAMS =====

    fn create_shader(&self, stage: ShaderStage) -> ShaderId {
        let result = unsafe { self.gl.create_shader(shader_stage_to_gl(stage)) };
        self.check("glCreateShader");
        shader_id(self.created("Shader", result))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(native) = native_shader(shader) {
            unsafe { self.gl.shader_source(native, source) };
            self.check("glShaderSource");
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        if let Some(native) = native_shader(shader) {
            unsafe { self.gl.compile_shader(native) };
            self.check("glCompileShader");
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        native_shader(shader).map_or(false, |native| unsafe { self.gl.get_shader_compile_status(native) })
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        native_shader(shader)
            .map(|native| unsafe { self.gl.get_shader_info_log(native) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        if let Some(native) = native_shader(shader) {
            unsafe { self.gl.delete_shader(native) };
            self.check("glDeleteShader");
        }
    }

    fn create_program(&self) -> ProgramId {
        let result = unsafe { self.gl.create_program() };
        self.check("glCreateProgram");
        program_id(self.created("Program", result))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let (Some(p), Some(s)) = (native_program(program), native_shader(shader)) {
            unsafe { self.gl.attach_shader(p, s) };
            self.check("glAttachShader");
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let (Some(p), Some(s)) = (native_program(program), native_shader(shader)) {
            unsafe { self.gl.detach_shader(p, s) };
            self.check("glDetachShader");
        }
    }

    fn set_program_separable(&self, program: ProgramId, separable: bool) {
        let resolved = unsafe {
            self.raw
                .program_parameter_i(program.raw(), glow::PROGRAM_SEPARABLE, separable as i32)
        };
        if !resolved {
            engine_warn!(SOURCE, "glProgramParameteri unavailable, program {} stays monolithic", program.raw());
        }
        self.check("glProgramParameteri");
    }

    fn bind_frag_data_location(&self, program: ProgramId, color: u32, name: &str) {
        if let Some(native) = native_program(program) {
            unsafe { self.gl.bind_frag_data_location(native, color, name) };
            self.check("glBindFragDataLocation");
        }
    }

    fn link_program(&self, program: ProgramId) {
        if let Some(native) = native_program(program) {
            unsafe { self.gl.link_program(native) };
            self.check("glLinkProgram");
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        native_program(program).map_or(false, |native| unsafe { self.gl.get_program_link_status(native) })
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        native_program(program)
            .map(|native| unsafe { self.gl.get_program_info_log(native) })
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramId) {
        if let Some(native) = native_program(program) {
            unsafe { self.gl.delete_program(native) };
            self.check("glDeleteProgram");
        }
    }

    fn use_program(&self, program: ProgramId) {
        unsafe { self.gl.use_program(native_program(program)) };
        self.check("glUseProgram");
    }

    fn get_attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        let native = native_program(program)?;
        unsafe { self.gl.get_attrib_location(native, name) }
    }

    fn get_uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let native = native_program(program)?;
        unsafe { self.gl.get_uniform_location(native, name) }.map(|location| UniformLocation(location.0))
    }

    fn get_uniform_block_index(&self, program: ProgramId, name: &str) -> Option<u32> {
        let native = native_program(program)?;
        unsafe { self.gl.get_uniform_block_index(native, name) }
    }

    fn uniform_block_binding(&self, program: ProgramId, block: u32, binding: u32) {
        if let Some(native) = native_program(program) {
            unsafe { self.gl.uniform_block_binding(native, block, binding) };
            self.check("glUniformBlockBinding");
        }
    }

    fn uniform_1_i32(&self, location: UniformLocation, value: i32) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe { self.gl.uniform_1_i32(Some(&location), value) };
        self.check("glUniform1i");
    }

    fn uniform_1_f32(&self, location: UniformLocation, value: f32) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe { self.gl.uniform_1_f32(Some(&location), value) };
        self.check("glUniform1f");
    }

    fn uniform_2_f32(&self, location: UniformLocation, x: f32, y: f32) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe { self.gl.uniform_2_f32(Some(&location), x, y) };
        self.check("glUniform2f");
    }

    fn uniform_matrix_4_f32(&self, location: UniformLocation, value: &[f32; 16]) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(&location), false, value) };
        self.check("glUniformMatrix4fv");
    }

    // ===== PROGRAM PIPELINES =====

    fn create_program_pipeline(&self) -> PipelineId {
        let name = unsafe { self.raw.gen_program_pipeline() };
        self.check("glGenProgramPipelines");
        if name == 0 {
            engine_warn!(SOURCE, "glGenProgramPipelines returned no name");
        }
        PipelineId(name)
    }

    fn bind_program_pipeline(&self, pipeline: PipelineId) {
        unsafe { self.raw.bind_program_pipeline(pipeline.raw()) };
        self.check("glBindProgramPipeline");
    }

    fn use_program_stages(&self, pipeline: PipelineId, stages: ProgramStages, program: ProgramId) {
        unsafe {
            self.raw
                .use_program_stages(pipeline.raw(), program_stages_to_gl(stages), program.raw())
        };
        self.check("glUseProgramStages");
    }

    fn delete_program_pipeline(&self, pipeline: PipelineId) {
        if pipeline.is_allocated() {
            unsafe { self.raw.delete_program_pipeline(pipeline.raw()) };
            self.check("glDeleteProgramPipelines");
        }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> VertexArrayId {
        let result = unsafe { self.gl.create_vertex_array() };
        self.check("glGenVertexArrays");
        vertex_array_id(self.created("VertexArray", result))
    }

    fn bind_vertex_array(&self, vertex_array: VertexArrayId) {
        unsafe { self.gl.bind_vertex_array(native_vertex_array(vertex_array)) };
        self.check("glBindVertexArray");
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        if let Some(native) = native_vertex_array(vertex_array) {
            unsafe { self.gl.delete_vertex_array(native) };
            self.check("glDeleteVertexArrays");
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
        self.check("glEnableVertexAttribArray");
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset)
        };
        self.check("glVertexAttribPointer");
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        unsafe { self.gl.vertex_attrib_divisor(index, divisor) };
        self.check("glVertexAttribDivisor");
    }

    // ===== BUFFERS =====

    fn create_buffer(&self) -> BufferId {
        let result = unsafe { self.gl.create_buffer() };
        self.check("glGenBuffers");
        buffer_id(self.created("Buffer", result))
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: BufferId) {
        unsafe { self.gl.bind_buffer(buffer_target_to_gl(target), native_buffer(buffer)) };
        self.check("glBindBuffer");
    }

    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: BufferId) {
        unsafe {
            self.gl
                .bind_buffer_base(buffer_target_to_gl(target), index, native_buffer(buffer))
        };
        self.check("glBindBufferBase");
    }

    fn buffer_data_size(&self, target: BufferTarget, size: usize, usage: BufferUsage) {
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        unsafe {
            self.gl
                .buffer_data_size(buffer_target_to_gl(target), size, buffer_usage_to_gl(usage))
        };
        self.check("glBufferData");
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target_to_gl(target), data, buffer_usage_to_gl(usage))
        };
        self.check("glBufferData");
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        let offset = i32::try_from(offset).unwrap_or(i32::MAX);
        unsafe {
            self.gl
                .buffer_sub_data_u8_slice(buffer_target_to_gl(target), offset, data)
        };
        self.check("glBufferSubData");
    }

    fn write_mapped_range(
        &self,
        target: BufferTarget,
        length: usize,
        access: MapAccess,
        write: &mut dyn FnMut(&mut [u8]),
    ) -> MapOutcome {
        let gl_target = buffer_target_to_gl(target);
        let Ok(gl_length) = i32::try_from(length) else {
            return MapOutcome::Unavailable;
        };

        let ptr = unsafe {
            self.gl
                .map_buffer_range(gl_target, 0, gl_length, map_access_to_gl(access))
        };
        self.check("glMapBufferRange");
        if ptr.is_null() {
            return MapOutcome::Unavailable;
        }

        // The mapping covers exactly [0, length) of the bound store until unmapped
        let mapped = unsafe { std::slice::from_raw_parts_mut(ptr, length) };
        write(mapped);

        let intact = match unsafe { self.raw.unmap_buffer(gl_target) } {
            Some(intact) => intact,
            None => {
                unsafe { self.gl.unmap_buffer(gl_target) };
                true
            }
        };
        self.check("glUnmapBuffer");
        if intact {
            MapOutcome::Written
        } else {
            MapOutcome::Corrupted
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        if let Some(native) = native_buffer(buffer) {
            unsafe { self.gl.delete_buffer(native) };
            self.check("glDeleteBuffers");
        }
    }

    // ===== TEXTURES =====

    fn create_texture(&self) -> TextureId {
        let result = unsafe { self.gl.create_texture() };
        self.check("glGenTextures");
        texture_id(self.created("Texture", result))
    }

    fn bind_texture(&self, target: TextureTarget, texture: TextureId) {
        unsafe { self.gl.bind_texture(texture_target_to_gl(target), native_texture(texture)) };
        self.check("glBindTexture");
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
        self.check("glActiveTexture");
    }

    fn texture_filter(&self, target: TextureTarget, min: TextureFilter, mag: TextureFilter) {
        let target = texture_target_to_gl(target);
        unsafe {
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, texture_filter_to_gl(min) as i32);
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, texture_filter_to_gl(mag) as i32);
        }
        self.check("glTexParameteri");
    }

    fn texture_wrap(&self, target: TextureTarget, wrap: TextureWrap) {
        let target = texture_target_to_gl(target);
        let wrap = texture_wrap_to_gl(wrap) as i32;
        unsafe {
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap);
        }
        self.check("glTexParameteri");
    }

    fn tex_image_2d_rgba8(&self, target: TextureTarget, width: i32, height: i32, pixels: Option<&[u8]>) {
        unsafe {
            self.gl.tex_image_2d(
                texture_target_to_gl(target),
                0,
                glow::RGBA8 as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                pixels,
            )
        };
        self.check("glTexImage2D");
    }

    fn tex_image_3d_rgba8(
        &self,
        target: TextureTarget,
        width: i32,
        height: i32,
        depth: i32,
        pixels: Option<&[u8]>,
    ) {
        unsafe {
            self.gl.tex_image_3d(
                texture_target_to_gl(target),
                0,
                glow::RGBA8 as i32,
                width,
                height,
                depth,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                pixels,
            )
        };
        self.check("glTexImage3D");
    }

    fn tex_sub_image_3d_rgba8(&self, target: TextureTarget, layer: i32, width: i32, height: i32, pixels: &[u8]) {
        unsafe {
            self.gl.tex_sub_image_3d(
                texture_target_to_gl(target),
                0,
                0,
                0,
                layer,
                width,
                height,
                1,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(pixels),
            )
        };
        self.check("glTexSubImage3D");
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        unsafe { self.gl.generate_mipmap(texture_target_to_gl(target)) };
        self.check("glGenerateMipmap");
    }

    fn delete_texture(&self, texture: TextureId) {
        if let Some(native) = native_texture(texture) {
            unsafe { self.gl.delete_texture(native) };
            self.check("glDeleteTextures");
        }
    }

    // ===== FRAMEBUFFERS AND RENDERBUFFERS =====

    fn create_framebuffer(&self) -> FramebufferId {
        let result = unsafe { self.gl.create_framebuffer() };
        self.check("glGenFramebuffers");
        framebuffer_id(self.created("Framebuffer", result))
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: FramebufferId) {
        unsafe {
            self.gl
                .bind_framebuffer(framebuffer_target_to_gl(target), native_framebuffer(framebuffer))
        };
        self.check("glBindFramebuffer");
    }

    fn framebuffer_color_texture(&self, target: FramebufferTarget, attachment: u32, texture: TextureId) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                framebuffer_target_to_gl(target),
                glow::COLOR_ATTACHMENT0 + attachment,
                glow::TEXTURE_2D,
                native_texture(texture),
                0,
            )
        };
        self.check("glFramebufferTexture2D");
    }

    fn framebuffer_depth_renderbuffer(&self, target: FramebufferTarget, renderbuffer: RenderbufferId) {
        unsafe {
            self.gl.framebuffer_renderbuffer(
                framebuffer_target_to_gl(target),
                glow::DEPTH_ATTACHMENT,
                glow::RENDERBUFFER,
                native_renderbuffer(renderbuffer),
            )
        };
        self.check("glFramebufferRenderbuffer");
    }

    fn draw_buffers(&self, count: u32) {
        let buffers: Vec<u32> = (0..count).map(|i| glow::COLOR_ATTACHMENT0 + i).collect();
        unsafe { self.gl.draw_buffers(&buffers) };
        self.check("glDrawBuffers");
    }

    fn check_framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus {
        let status = unsafe { self.gl.check_framebuffer_status(framebuffer_target_to_gl(target)) };
        framebuffer_status_from_gl(status)
    }

    fn read_buffer(&self, buffer: ReadBuffer) {
        unsafe { self.gl.read_buffer(read_buffer_to_gl(buffer)) };
        self.check("glReadBuffer");
    }

    fn blit_framebuffer(&self, src: Rect, dst: Rect, mask: ClearMask, linear: bool) {
        let filter = if linear { glow::LINEAR } else { glow::NEAREST };
        unsafe {
            self.gl.blit_framebuffer(
                src.x,
                src.y,
                src.x + src.width,
                src.y + src.height,
                dst.x,
                dst.y,
                dst.x + dst.width,
                dst.y + dst.height,
                clear_mask_to_gl(mask),
                filter,
            )
        };
        self.check("glBlitFramebuffer");
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        if let Some(native) = native_framebuffer(framebuffer) {
            unsafe { self.gl.delete_framebuffer(native) };
            self.check("glDeleteFramebuffers");
        }
    }

    fn create_renderbuffer(&self) -> RenderbufferId {
        let result = unsafe { self.gl.create_renderbuffer() };
        self.check("glGenRenderbuffers");
        renderbuffer_id(self.created("Renderbuffer", result))
    }

    fn bind_renderbuffer(&self, renderbuffer: RenderbufferId) {
        unsafe {
            self.gl
                .bind_renderbuffer(glow::RENDERBUFFER, native_renderbuffer(renderbuffer))
        };
        self.check("glBindRenderbuffer");
    }

    fn renderbuffer_storage_depth24(&self, width: i32, height: i32) {
        unsafe {
            self.gl
                .renderbuffer_storage(glow::RENDERBUFFER, glow::DEPTH_COMPONENT24, width, height)
        };
        self.check("glRenderbufferStorage");
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId) {
        if let Some(native) = native_renderbuffer(renderbuffer) {
            unsafe { self.gl.delete_renderbuffer(native) };
            self.check("glDeleteRenderbuffers");
        }
    }

    // ===== FIXED-FUNCTION STATE =====

    fn enable(&self, cap: EnableCap) {
        unsafe { self.gl.enable(enable_cap_to_gl(cap)) };
        self.check("glEnable");
    }

    fn disable(&self, cap: EnableCap) {
        unsafe { self.gl.disable(enable_cap_to_gl(cap)) };
        self.check("glDisable");
    }

    fn is_enabled(&self, cap: EnableCap) -> bool {
        unsafe { self.gl.is_enabled(enable_cap_to_gl(cap)) }
    }

    fn enable_indexed(&self, cap: EnableCap, index: u32) {
        unsafe { self.gl.enable_draw_buffer(enable_cap_to_gl(cap), index) };
        self.check("glEnablei");
    }

    fn disable_indexed(&self, cap: EnableCap, index: u32) {
        unsafe { self.gl.disable_draw_buffer(enable_cap_to_gl(cap), index) };
        self.check("glDisablei");
    }

    fn blend_func_indexed(&self, index: u32, src: BlendFactor, dst: BlendFactor) {
        unsafe {
            self.gl
                .blend_func_draw_buffer(index, blend_factor_to_gl(src), blend_factor_to_gl(dst))
        };
        self.check("glBlendFunci");
    }

    fn blend_equation_indexed(&self, index: u32, equation: BlendEquation) {
        unsafe {
            self.gl
                .blend_equation_draw_buffer(index, blend_equation_to_gl(equation))
        };
        self.check("glBlendEquationi");
    }

    fn viewport(&self, rect: Rect) {
        unsafe { self.gl.viewport(rect.x, rect.y, rect.width, rect.height) };
        self.check("glViewport");
    }

    fn depth_func(&self, func: DepthFunc) {
        unsafe { self.gl.depth_func(depth_func_to_gl(func)) };
        self.check("glDepthFunc");
    }

    fn color_mask(&self, mask: [bool; 4]) {
        unsafe { self.gl.color_mask(mask[0], mask[1], mask[2], mask[3]) };
        self.check("glColorMask");
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { self.gl.clear_color(rgba[0], rgba[1], rgba[2], rgba[3]) };
        self.check("glClearColor");
    }

    fn clear(&self, mask: ClearMask) {
        unsafe { self.gl.clear(clear_mask_to_gl(mask)) };
        self.check("glClear");
    }

    // ===== STATE QUERIES =====

    fn framebuffer_binding(&self, target: FramebufferTarget) -> FramebufferId {
        FramebufferId(name_from_query(self.get_i32(framebuffer_binding_query(target))))
    }

    fn buffer_binding(&self, target: BufferTarget) -> BufferId {
        BufferId(name_from_query(self.get_i32(buffer_binding_query(target))))
    }

    fn current_program(&self) -> ProgramId {
        ProgramId(name_from_query(self.get_i32(glow::CURRENT_PROGRAM)))
    }

    fn vertex_array_binding(&self) -> VertexArrayId {
        VertexArrayId(name_from_query(self.get_i32(glow::VERTEX_ARRAY_BINDING)))
    }

    fn viewport_rect(&self) -> Rect {
        let mut values = [0i32; 4];
        unsafe { self.gl.get_parameter_i32_slice(glow::VIEWPORT, &mut values) };
        Rect::new(values[0], values[1], values[2], values[3])
    }

    fn current_depth_func(&self) -> DepthFunc {
        depth_func_from_gl(self.get_i32(glow::DEPTH_FUNC) as u32)
    }

    fn current_color_mask(&self) -> [bool; 4] {
        // GL default is all channels writable
        let mut values = [1i32; 4];
        unsafe { self.gl.get_parameter_i32_slice(glow::COLOR_WRITEMASK, &mut values) };
        values.map(|v| v != 0)
    }

    fn current_active_texture(&self) -> u32 {
        (self.get_i32(glow::ACTIVE_TEXTURE) as u32).saturating_sub(glow::TEXTURE0)
    }

    fn current_read_buffer(&self) -> ReadBuffer {
        read_buffer_from_gl(self.get_i32(glow::READ_BUFFER) as u32)
    }

    fn current_clear_color(&self) -> [f32; 4] {
        let mut values = [0f32; 4];
        unsafe { self.gl.get_parameter_f32_slice(glow::COLOR_CLEAR_VALUE, &mut values) };
        values
    }

    fn texture_binding(&self, target: TextureTarget) -> TextureId {
        TextureId(name_from_query(self.get_i32(texture_binding_query(target))))
    }

    // ===== DRAWS =====

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(primitive_mode_to_gl(mode), first, count) };
        self.check("glDrawArrays");
    }

    fn draw_arrays_instanced(&self, mode: PrimitiveMode, first: i32, count: i32, instances: i32) {
        unsafe {
            self.gl
                .draw_arrays_instanced(primitive_mode_to_gl(mode), first, count, instances)
        };
        self.check("glDrawArraysInstanced");
    }

    // ===== SYNCHRONIZATION =====

    fn fence_sync(&self) -> SyncId {
        let result = unsafe { self.gl.fence_sync(glow::SYNC_GPU_COMMANDS_COMPLETE, 0) };
        self.check("glFenceSync");
        match result {
            Ok(fence) => SyncId(self.fences.borrow_mut().insert(fence).data().as_ffi()),
            Err(message) => {
                engine_warn!(SOURCE, "glFenceSync failed: {}", message);
                SyncId::NONE
            }
        }
    }

    fn client_wait_sync(&self, sync: SyncId, flush: bool, timeout_ns: u64) -> WaitResult {
        let Some(fence) = self.fences.borrow().get(Self::fence_key(sync)).copied() else {
            return WaitResult::WaitFailed;
        };
        let flags = if flush { glow::SYNC_FLUSH_COMMANDS_BIT } else { 0 };
        let timeout = i32::try_from(timeout_ns).unwrap_or(i32::MAX);
        let result = unsafe { self.gl.client_wait_sync(fence, flags, timeout) };
        self.check("glClientWaitSync");
        wait_result_from_gl(result)
    }

    fn delete_sync(&self, sync: SyncId) {
        if let Some(fence) = self.fences.borrow_mut().remove(Self::fence_key(sync)) {
            unsafe { self.gl.delete_sync(fence) };
            self.check("glDeleteSync");
        }
    }

    fn finish(&self) {
        unsafe { self.gl.finish() };
        self.check("glFinish");
    }
}

#[cfg(test)]
#[path = "glow_device_tests.rs"]
mod tests;
