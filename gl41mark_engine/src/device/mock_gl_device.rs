/// Mock GL device for unit tests (no GPU required)
///
/// Tracks every live driver object per kind, models the ambient state the
/// scenes are expected to preserve, and records each call as a line of text
/// so tests can assert on ordering. Failure injection goes through
/// [`MockGlDevice::config_mut`].

use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::device::handles::{
    BufferId, FramebufferId, PipelineId, ProgramId, RenderbufferId, ShaderId, SyncId,
    TextureId, VertexArrayId,
};
use crate::device::types::{
    BlendEquation, BlendFactor, BufferTarget, BufferUsage, ClearMask, DepthFunc, EnableCap,
    FramebufferStatus, FramebufferTarget, IntegerQuery, MapAccess, MapOutcome, PrimitiveMode,
    ProcAddress, ProgramStages, ReadBuffer, Rect, ShaderStage, StringQuery, TextureFilter,
    TextureTarget, TextureWrap, UniformLocation, WaitResult, CONTEXT_CORE_PROFILE_BIT,
};
use crate::device::GlDevice;

// ============================================================================
// Object bookkeeping
// ============================================================================

/// Kind of driver object tracked by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Shader,
    Program,
    Buffer,
    VertexArray,
    Texture,
    Framebuffer,
    Renderbuffer,
    Pipeline,
    Sync,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 9] = [
        ObjectKind::Shader,
        ObjectKind::Program,
        ObjectKind::Buffer,
        ObjectKind::VertexArray,
        ObjectKind::Texture,
        ObjectKind::Framebuffer,
        ObjectKind::Renderbuffer,
        ObjectKind::Pipeline,
        ObjectKind::Sync,
    ];
}

// ============================================================================
// Failure injection
// ============================================================================

/// Knobs for simulating driver behaviour
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Entry points `get_proc_address` reports as absent
    pub missing_procs: FxHashSet<String>,
    /// Attribute names `get_attrib_location` cannot find
    pub missing_attribs: FxHashSet<String>,
    /// Uniform names `get_uniform_location` cannot find
    pub missing_uniforms: FxHashSet<String>,
    /// Uniform block names `get_uniform_block_index` cannot find
    pub missing_uniform_blocks: FxHashSet<String>,
    /// Shaders of this stage fail to compile
    pub fail_compile: Option<ShaderStage>,
    /// Every link fails
    pub fail_link: bool,
    /// Creation of these kinds returns the sentinel
    pub fail_create: FxHashSet<ObjectKind>,
    /// glMapBufferRange returns null
    pub map_unavailable: bool,
    /// glUnmapBuffer reports GL_FALSE
    pub unmap_corrupt: bool,
    /// Scripted glClientWaitSync results, consumed front first;
    /// `AlreadySignaled` once exhausted
    pub wait_results: VecDeque<WaitResult>,
    /// GL_CONTEXT_PROFILE_MASK (`None` = query raises an error)
    pub profile_mask: Option<i32>,
    /// glGetString(GL_EXTENSIONS) (`None` = null pointer)
    pub extensions: Option<String>,
    /// glGetString(GL_VERSION)
    pub version: Option<String>,
    /// Names returned by glGetStringi(GL_EXTENSIONS, i)
    pub indexed_extensions: Vec<String>,
    /// Result of glCheckFramebufferStatus
    pub framebuffer_status: FramebufferStatus,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            missing_procs: FxHashSet::default(),
            missing_attribs: FxHashSet::default(),
            missing_uniforms: FxHashSet::default(),
            missing_uniform_blocks: FxHashSet::default(),
            fail_compile: None,
            fail_link: false,
            fail_create: FxHashSet::default(),
            map_unavailable: false,
            unmap_corrupt: false,
            wait_results: VecDeque::new(),
            profile_mask: Some(CONTEXT_CORE_PROFILE_BIT),
            extensions: None,
            version: Some("4.1 Mock".to_string()),
            indexed_extensions: vec![
                "GL_ARB_separate_shader_objects".to_string(),
                "GL_ARB_texture_storage".to_string(),
            ],
            framebuffer_status: FramebufferStatus::Complete,
        }
    }
}

// ============================================================================
// Modelled ambient state
// ============================================================================

/// Driver-side state the mock keeps so queries answer like a real context
#[derive(Debug, Clone, PartialEq)]
pub struct MockContextState {
    pub draw_framebuffer: FramebufferId,
    pub read_framebuffer: FramebufferId,
    pub array_buffer: BufferId,
    pub uniform_buffer: BufferId,
    pub program: ProgramId,
    pub pipeline: PipelineId,
    pub vertex_array: VertexArrayId,
    pub renderbuffer: RenderbufferId,
    pub viewport: Rect,
    pub enables: FxHashSet<EnableCap>,
    pub indexed_enables: FxHashSet<(EnableCap, u32)>,
    pub depth_func: DepthFunc,
    pub color_mask: [bool; 4],
    pub active_texture: u32,
    /// Keyed by (unit, target)
    pub texture_bindings: FxHashMap<(u32, TextureTarget), TextureId>,
    pub read_buffer: ReadBuffer,
    pub clear_color: [f32; 4],
}

impl Default for MockContextState {
    fn default() -> Self {
        Self {
            draw_framebuffer: FramebufferId::NONE,
            read_framebuffer: FramebufferId::NONE,
            array_buffer: BufferId::NONE,
            uniform_buffer: BufferId::NONE,
            program: ProgramId::NONE,
            pipeline: PipelineId::NONE,
            vertex_array: VertexArrayId::NONE,
            renderbuffer: RenderbufferId::NONE,
            viewport: Rect::sized(800, 600),
            enables: FxHashSet::default(),
            indexed_enables: FxHashSet::default(),
            depth_func: DepthFunc::Less,
            color_mask: [true; 4],
            active_texture: 0,
            texture_bindings: FxHashMap::default(),
            read_buffer: ReadBuffer::Back,
            clear_color: [0.0; 4],
        }
    }
}

// ============================================================================
// Mock GL Device
// ============================================================================

#[derive(Debug, Default)]
struct MockInner {
    next_name: u64,
    live: FxHashMap<ObjectKind, FxHashSet<u64>>,
    created: FxHashMap<ObjectKind, usize>,
    invalid_deletes: usize,
    shader_stages: FxHashMap<u64, ShaderStage>,
    buffer_store: FxHashMap<u64, Vec<u8>>,
    uniform_names: FxHashMap<String, u32>,
    events: Vec<String>,
    state: MockContextState,
    config: MockConfig,
}

#[derive(Debug, Default)]
pub struct MockGlDevice {
    inner: RefCell<MockInner>,
}

impl MockGlDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to failure injection knobs
    pub fn config_mut(&self) -> RefMut<'_, MockConfig> {
        RefMut::map(self.inner.borrow_mut(), |inner| &mut inner.config)
    }

    /// Number of live objects of one kind
    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.inner.borrow().live.get(&kind).map_or(0, |set| set.len())
    }

    /// Number of live objects of every kind
    pub fn total_live(&self) -> usize {
        ObjectKind::ALL.iter().map(|kind| self.live_count(*kind)).sum()
    }

    /// Number of objects of one kind created since construction
    pub fn created(&self, kind: ObjectKind) -> usize {
        self.inner.borrow().created.get(&kind).copied().unwrap_or(0)
    }

    /// Deletions of the sentinel or of an already deleted name
    pub fn invalid_deletes(&self) -> usize {
        self.inner.borrow().invalid_deletes
    }

    pub fn is_live(&self, kind: ObjectKind, raw: u64) -> bool {
        self.inner.borrow().live.get(&kind).is_some_and(|set| set.contains(&raw))
    }

    /// Recorded calls, oldest first
    pub fn events(&self) -> Ref<'_, Vec<String>> {
        Ref::map(self.inner.borrow(), |inner| &inner.events)
    }

    /// Recorded calls starting with `prefix`
    pub fn events_matching(&self, prefix: &str) -> Vec<String> {
        self.inner
            .borrow()
            .events
            .iter()
            .filter(|event| event.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear_events(&self) {
        self.inner.borrow_mut().events.clear();
    }

    /// Snapshot of the modelled context state
    pub fn context_state(&self) -> MockContextState {
        self.inner.borrow().state.clone()
    }

    /// Replace the modelled context state (simulates another client of the context)
    pub fn set_context_state(&self, state: MockContextState) {
        self.inner.borrow_mut().state = state;
    }

    /// Current contents of a buffer's data store
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.inner.borrow().buffer_store.get(&(buffer.raw() as u64)).cloned()
    }

    fn record(&self, event: String) {
        self.inner.borrow_mut().events.push(event);
    }

    fn allocate(&self, kind: ObjectKind) -> u64 {
        let mut inner = self.inner.borrow_mut();
        if inner.config.fail_create.contains(&kind) {
            inner.events.push(format!("create {:?} failed", kind));
            return 0;
        }
        inner.next_name += 1;
        let raw = inner.next_name;
        inner.live.entry(kind).or_default().insert(raw);
        *inner.created.entry(kind).or_insert(0) += 1;
        inner.events.push(format!("create {:?} {}", kind, raw));
        raw
    }

    fn release(&self, kind: ObjectKind, raw: u64) {
        let mut inner = self.inner.borrow_mut();
        let removed = inner.live.get_mut(&kind).is_some_and(|set| set.remove(&raw));
        if !removed {
            inner.invalid_deletes += 1;
        }
        if kind == ObjectKind::Buffer {
            inner.buffer_store.remove(&raw);
        }
        inner.events.push(format!("delete {:?} {}", kind, raw));
    }

    fn bound_buffer(inner: &MockInner, target: BufferTarget) -> u64 {
        match target {
            BufferTarget::Array => inner.state.array_buffer.raw() as u64,
            BufferTarget::Uniform => inner.state.uniform_buffer.raw() as u64,
        }
    }
}

impl GlDevice for MockGlDevice {
    // ===== CONTEXT / CAPABILITY QUERIES =====

    fn get_proc_address(&self, name: &str) -> Option<ProcAddress> {
        let inner = self.inner.borrow();
        if inner.config.missing_procs.contains(name) {
            return None;
        }
        // Any non-null address will do; the core never calls through it
        ProcAddress::from_ptr((0x1000 + name.len() * 8) as *const std::ffi::c_void)
    }

    fn get_string(&self, query: StringQuery) -> Option<String> {
        let inner = self.inner.borrow();
        match query {
            StringQuery::Vendor => Some("gl41mark mock".to_string()),
            StringQuery::Renderer => Some("MockGlDevice".to_string()),
            StringQuery::Version => inner.config.version.clone(),
            StringQuery::ShadingLanguageVersion => Some("4.10".to_string()),
            StringQuery::Extensions => inner.config.extensions.clone(),
        }
    }

    fn get_string_indexed(&self, query: StringQuery, index: u32) -> Option<String> {
        let inner = self.inner.borrow();
        match query {
            StringQuery::Extensions => inner.config.indexed_extensions.get(index as usize).cloned(),
            _ => None,
        }
    }

    fn get_integer(&self, query: IntegerQuery) -> Option<i32> {
        let inner = self.inner.borrow();
        match query {
            IntegerQuery::ContextProfileMask => inner.config.profile_mask,
            IntegerQuery::NumExtensions => Some(inner.config.indexed_extensions.len() as i32),
        }
    }

    // ===== SHADERS AND PROGRAMS =====

    fn create_shader(&self, stage: ShaderStage) -> ShaderId {
        let raw = self.allocate(ObjectKind::Shader);
        if raw != 0 {
            self.inner.borrow_mut().shader_stages.insert(raw, stage);
        }
        ShaderId(raw as u32)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        self.record(format!("shader_source {} ({} bytes)", shader.raw(), source.len()));
    }

    fn compile_shader(&self, shader: ShaderId) {
        self.record(format!("compile_shader {}", shader.raw()));
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        let inner = self.inner.borrow();
        let stage = inner.shader_stages.get(&(shader.raw() as u64)).copied();
        match (inner.config.fail_compile, stage) {
            (Some(failing), Some(stage)) => failing != stage,
            _ => true,
        }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:1(1): error: syntax error".to_string()
        }
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.inner.borrow_mut().shader_stages.remove(&(shader.raw() as u64));
        self.release(ObjectKind::Shader, shader.raw() as u64);
    }

    fn create_program(&self) -> ProgramId {
        ProgramId(self.allocate(ObjectKind::Program) as u32)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(format!("attach_shader {} {}", program.raw(), shader.raw()));
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(format!("detach_shader {} {}", program.raw(), shader.raw()));
    }

    fn set_program_separable(&self, program: ProgramId, separable: bool) {
        self.record(format!("program_separable {} {}", program.raw(), separable));
    }

    fn bind_frag_data_location(&self, program: ProgramId, color: u32, name: &str) {
        self.record(format!("bind_frag_data_location {} {} {}", program.raw(), color, name));
    }

    fn link_program(&self, program: ProgramId) {
        self.record(format!("link_program {}", program.raw()));
    }

    fn program_link_status(&self, _program: ProgramId) -> bool {
        !self.inner.borrow().config.fail_link
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "error: linking failed".to_string()
        }
    }

    fn delete_program(&self, program: ProgramId) {
        self.release(ObjectKind::Program, program.raw() as u64);
    }

    fn use_program(&self, program: ProgramId) {
        let mut inner = self.inner.borrow_mut();
        inner.state.program = program;
        inner.events.push(format!("use_program {}", program.raw()));
    }

    fn get_attrib_location(&self, _program: ProgramId, name: &str) -> Option<u32> {
        if self.inner.borrow().config.missing_attribs.contains(name) {
            return None;
        }
        // Stable per name, small enough for a real attribute index
        Some((name.bytes().map(u32::from).sum::<u32>()) % 16)
    }

    fn get_uniform_location(&self, _program: ProgramId, name: &str) -> Option<UniformLocation> {
        let mut inner = self.inner.borrow_mut();
        if inner.config.missing_uniforms.contains(name) {
            return None;
        }
        let next = inner.uniform_names.len() as u32;
        let location = *inner.uniform_names.entry(name.to_string()).or_insert(next);
        Some(UniformLocation(location))
    }

    fn get_uniform_block_index(&self, _program: ProgramId, name: &str) -> Option<u32> {
        let inner = self.inner.borrow();
        if inner.config.missing_uniform_blocks.contains(name) {
            return None;
        }
        Some(name.len() as u32 % 4)
    }

    fn uniform_block_binding(&self, program: ProgramId, block: u32, binding: u32) {
        self.record(format!("uniform_block_binding {} {} {}", program.raw(), block, binding));
    }

    fn uniform_1_i32(&self, location: UniformLocation, value: i32) {
        self.record(format!("uniform_1_i32 {} {}", location.0, value));
    }

    fn uniform_1_f32(&self, location: UniformLocation, value: f32) {
        self.record(format!("uniform_1_f32 {} {}", location.0, value));
    }

    fn uniform_2_f32(&self, location: UniformLocation, x: f32, y: f32) {
        self.record(format!("uniform_2_f32 {} {} {}", location.0, x, y));
    }

    fn uniform_matrix_4_f32(&self, location: UniformLocation, _value: &[f32; 16]) {
        self.record(format!("uniform_matrix_4_f32 {}", location.0));
    }

    // ===== PROGRAM PIPELINES =====

    fn create_program_pipeline(&self) -> PipelineId {
        PipelineId(self.allocate(ObjectKind::Pipeline) as u32)
    }

    fn bind_program_pipeline(&self, pipeline: PipelineId) {
        let mut inner = self.inner.borrow_mut();
        inner.state.pipeline = pipeline;
        inner.events.push(format!("bind_program_pipeline {}", pipeline.raw()));
    }

    fn use_program_stages(&self, pipeline: PipelineId, stages: ProgramStages, program: ProgramId) {
        self.record(format!(
            "use_program_stages {} {:?} {}",
            pipeline.raw(),
            stages,
            program.raw()
        ));
    }

    fn delete_program_pipeline(&self, pipeline: PipelineId) {
        self.release(ObjectKind::Pipeline, pipeline.raw() as u64);
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> VertexArrayId {
        VertexArrayId(self.allocate(ObjectKind::VertexArray) as u32)
    }

    fn bind_vertex_array(&self, vertex_array: VertexArrayId) {
        let mut inner = self.inner.borrow_mut();
        inner.state.vertex_array = vertex_array;
        inner.events.push(format!("bind_vertex_array {}", vertex_array.raw()));
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        self.release(ObjectKind::VertexArray, vertex_array.raw() as u64);
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(format!("enable_vertex_attrib_array {}", index));
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        self.record(format!("vertex_attrib_pointer {} {} {} {}", index, size, stride, offset));
    }

    fn vertex_attrib_divisor(&self, index: u32, divisor: u32) {
        self.record(format!("vertex_attrib_divisor {} {}", index, divisor));
    }

    // ===== BUFFERS =====

    fn create_buffer(&self) -> BufferId {
        BufferId(self.allocate(ObjectKind::Buffer) as u32)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: BufferId) {
        let mut inner = self.inner.borrow_mut();
        match target {
            BufferTarget::Array => inner.state.array_buffer = buffer,
            BufferTarget::Uniform => inner.state.uniform_buffer = buffer,
        }
        inner.events.push(format!("bind_buffer {:?} {}", target, buffer.raw()));
    }

    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: BufferId) {
        let mut inner = self.inner.borrow_mut();
        // Indexed binding also updates the generic binding point
        if target == BufferTarget::Uniform {
            inner.state.uniform_buffer = buffer;
        }
        inner.events.push(format!("bind_buffer_base {:?} {} {}", target, index, buffer.raw()));
    }

    fn buffer_data_size(&self, target: BufferTarget, size: usize, usage: BufferUsage) {
        let mut inner = self.inner.borrow_mut();
        let raw = Self::bound_buffer(&inner, target);
        inner.buffer_store.insert(raw, vec![0; size]);
        inner.events.push(format!("buffer_data {} {} {:?}", raw, size, usage));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let mut inner = self.inner.borrow_mut();
        let raw = Self::bound_buffer(&inner, target);
        inner.buffer_store.insert(raw, data.to_vec());
        inner.events.push(format!("buffer_data {} {} {:?}", raw, data.len(), usage));
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        let mut inner = self.inner.borrow_mut();
        let raw = Self::bound_buffer(&inner, target);
        let store = inner.buffer_store.entry(raw).or_default();
        let end = offset + data.len();
        if store.len() < end {
            store.resize(end, 0);
        }
        store[offset..end].copy_from_slice(data);
        inner.events.push(format!("buffer_sub_data {} {} {}", raw, offset, data.len()));
    }

    fn write_mapped_range(
        &self,
        target: BufferTarget,
        length: usize,
        access: MapAccess,
        write: &mut dyn FnMut(&mut [u8]),
    ) -> MapOutcome {
        let (raw, unavailable, corrupt) = {
            let inner = self.inner.borrow();
            (
                Self::bound_buffer(&inner, target),
                inner.config.map_unavailable,
                inner.config.unmap_corrupt,
            )
        };
        if unavailable {
            self.record(format!("map_buffer_range {} failed", raw));
            return MapOutcome::Unavailable;
        }

        // Work on a detached copy so the callback can't observe a held borrow
        let mut mapped = {
            let inner = self.inner.borrow();
            inner.buffer_store.get(&raw).cloned().unwrap_or_default()
        };
        if mapped.len() < length {
            self.record(format!("map_buffer_range {} failed (range {} > store {})", raw, length, mapped.len()));
            return MapOutcome::Unavailable;
        }
        self.record(format!("map_buffer_range {} {} {:?}", raw, length, access));
        write(&mut mapped[..length]);

        let mut inner = self.inner.borrow_mut();
        inner.buffer_store.insert(raw, mapped);
        inner.events.push(format!("unmap_buffer {}", raw));
        if corrupt {
            MapOutcome::Corrupted
        } else {
            MapOutcome::Written
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.release(ObjectKind::Buffer, buffer.raw() as u64);
    }

    // ===== TEXTURES =====

    fn create_texture(&self) -> TextureId {
        TextureId(self.allocate(ObjectKind::Texture) as u32)
    }

    fn bind_texture(&self, target: TextureTarget, texture: TextureId) {
        let mut inner = self.inner.borrow_mut();
        let unit = inner.state.active_texture;
        if texture.is_allocated() {
            inner.state.texture_bindings.insert((unit, target), texture);
        } else {
            inner.state.texture_bindings.remove(&(unit, target));
        }
        inner.events.push(format!("bind_texture {:?} {}", target, texture.raw()));
    }

    fn active_texture(&self, unit: u32) {
        let mut inner = self.inner.borrow_mut();
        inner.state.active_texture = unit;
        inner.events.push(format!("active_texture {}", unit));
    }

    fn texture_filter(&self, target: TextureTarget, min: TextureFilter, mag: TextureFilter) {
        self.record(format!("texture_filter {:?} {:?} {:?}", target, min, mag));
    }

    fn texture_wrap(&self, target: TextureTarget, wrap: TextureWrap) {
        self.record(format!("texture_wrap {:?} {:?}", target, wrap));
    }

    fn tex_image_2d_rgba8(&self, target: TextureTarget, width: i32, height: i32, pixels: Option<&[u8]>) {
        self.record(format!(
            "tex_image_2d {:?} {}x{} {}",
            target,
            width,
            height,
            pixels.map_or(0, |p| p.len())
        ));
    }

    fn tex_image_3d_rgba8(
        &self,
        target: TextureTarget,
        width: i32,
        height: i32,
        depth: i32,
        pixels: Option<&[u8]>,
    ) {
        self.record(format!(
            "tex_image_3d {:?} {}x{}x{} {}",
            target,
            width,
            height,
            depth,
            pixels.map_or(0, |p| p.len())
        ));
    }

    fn tex_sub_image_3d_rgba8(&self, target: TextureTarget, layer: i32, width: i32, height: i32, pixels: &[u8]) {
        self.record(format!(
            "tex_sub_image_3d {:?} layer={} {}x{} {}",
            target,
            layer,
            width,
            height,
            pixels.len()
        ));
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        self.record(format!("generate_mipmap {:?}", target));
    }

    fn delete_texture(&self, texture: TextureId) {
        self.release(ObjectKind::Texture, texture.raw() as u64);
    }

    // ===== FRAMEBUFFERS AND RENDERBUFFERS =====

    fn create_framebuffer(&self) -> FramebufferId {
        FramebufferId(self.allocate(ObjectKind::Framebuffer) as u32)
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: FramebufferId) {
        let mut inner = self.inner.borrow_mut();
        match target {
            FramebufferTarget::Framebuffer => {
                inner.state.draw_framebuffer = framebuffer;
                inner.state.read_framebuffer = framebuffer;
            }
            FramebufferTarget::Read => inner.state.read_framebuffer = framebuffer,
            FramebufferTarget::Draw => inner.state.draw_framebuffer = framebuffer,
        }
        inner.events.push(format!("bind_framebuffer {:?} {}", target, framebuffer.raw()));
    }

    fn framebuffer_color_texture(&self, target: FramebufferTarget, attachment: u32, texture: TextureId) {
        self.record(format!(
            "framebuffer_texture {:?} COLOR{} {}",
            target,
            attachment,
            texture.raw()
        ));
    }

    fn framebuffer_depth_renderbuffer(&self, target: FramebufferTarget, renderbuffer: RenderbufferId) {
        self.record(format!("framebuffer_renderbuffer {:?} DEPTH {}", target, renderbuffer.raw()));
    }

    fn draw_buffers(&self, count: u32) {
        self.record(format!("draw_buffers {}", count));
    }

    fn check_framebuffer_status(&self, _target: FramebufferTarget) -> FramebufferStatus {
        self.inner.borrow().config.framebuffer_status
    }

    fn read_buffer(&self, buffer: ReadBuffer) {
        let mut inner = self.inner.borrow_mut();
        inner.state.read_buffer = buffer;
        inner.events.push(format!("read_buffer {:?}", buffer));
    }

    fn blit_framebuffer(&self, src: Rect, dst: Rect, mask: ClearMask, linear: bool) {
        self.record(format!(
            "blit_framebuffer {}x{} -> {}x{} {:?} linear={}",
            src.width, src.height, dst.width, dst.height, mask, linear
        ));
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.release(ObjectKind::Framebuffer, framebuffer.raw() as u64);
    }

    fn create_renderbuffer(&self) -> RenderbufferId {
        RenderbufferId(self.allocate(ObjectKind::Renderbuffer) as u32)
    }

    fn bind_renderbuffer(&self, renderbuffer: RenderbufferId) {
        let mut inner = self.inner.borrow_mut();
        inner.state.renderbuffer = renderbuffer;
        inner.events.push(format!("bind_renderbuffer {}", renderbuffer.raw()));
    }

    fn renderbuffer_storage_depth24(&self, width: i32, height: i32) {
        self.record(format!("renderbuffer_storage DEPTH24 {}x{}", width, height));
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferId) {
        self.release(ObjectKind::Renderbuffer, renderbuffer.raw() as u64);
    }

    // ===== FIXED-FUNCTION STATE =====

    fn enable(&self, cap: EnableCap) {
        let mut inner = self.inner.borrow_mut();
        inner.state.enables.insert(cap);
        inner.events.push(format!("enable {:?}", cap));
    }

    fn disable(&self, cap: EnableCap) {
        let mut inner = self.inner.borrow_mut();
        inner.state.enables.remove(&cap);
        inner.events.push(format!("disable {:?}", cap));
    }

    fn is_enabled(&self, cap: EnableCap) -> bool {
        self.inner.borrow().state.enables.contains(&cap)
    }

    fn enable_indexed(&self, cap: EnableCap, index: u32) {
        let mut inner = self.inner.borrow_mut();
        inner.state.indexed_enables.insert((cap, index));
        inner.events.push(format!("enable_indexed {:?} {}", cap, index));
    }

    fn disable_indexed(&self, cap: EnableCap, index: u32) {
        let mut inner = self.inner.borrow_mut();
        inner.state.indexed_enables.remove(&(cap, index));
        inner.events.push(format!("disable_indexed {:?} {}", cap, index));
    }

    fn blend_func_indexed(&self, index: u32, src: BlendFactor, dst: BlendFactor) {
        self.record(format!("blend_func_indexed {} {:?} {:?}", index, src, dst));
    }

    fn blend_equation_indexed(&self, index: u32, equation: BlendEquation) {
        self.record(format!("blend_equation_indexed {} {:?}", index, equation));
    }

    fn viewport(&self, rect: Rect) {
        let mut inner = self.inner.borrow_mut();
        inner.state.viewport = rect;
        inner.events.push(format!(
            "viewport {} {} {} {}",
            rect.x, rect.y, rect.width, rect.height
        ));
    }

    fn depth_func(&self, func: DepthFunc) {
        let mut inner = self.inner.borrow_mut();
        inner.state.depth_func = func;
        inner.events.push(format!("depth_func {:?}", func));
    }

    fn color_mask(&self, mask: [bool; 4]) {
        let mut inner = self.inner.borrow_mut();
        inner.state.color_mask = mask;
        inner.events.push(format!("color_mask {:?}", mask));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        let mut inner = self.inner.borrow_mut();
        inner.state.clear_color = rgba;
        inner.events.push(format!("clear_color {:?}", rgba));
    }

    fn clear(&self, mask: ClearMask) {
        self.record(format!("clear {:?}", mask));
    }

    // ===== STATE QUERIES =====

    fn framebuffer_binding(&self, target: FramebufferTarget) -> FramebufferId {
        let inner = self.inner.borrow();
        match target {
            FramebufferTarget::Framebuffer | FramebufferTarget::Draw => inner.state.draw_framebuffer,
            FramebufferTarget::Read => inner.state.read_framebuffer,
        }
    }

    fn buffer_binding(&self, target: BufferTarget) -> BufferId {
        let inner = self.inner.borrow();
        match target {
            BufferTarget::Array => inner.state.array_buffer,
            BufferTarget::Uniform => inner.state.uniform_buffer,
        }
    }

    fn current_program(&self) -> ProgramId {
        self.inner.borrow().state.program
    }

    fn vertex_array_binding(&self) -> VertexArrayId {
        self.inner.borrow().state.vertex_array
    }

    fn viewport_rect(&self) -> Rect {
        self.inner.borrow().state.viewport
    }

    fn current_depth_func(&self) -> DepthFunc {
        self.inner.borrow().state.depth_func
    }

    fn current_color_mask(&self) -> [bool; 4] {
        self.inner.borrow().state.color_mask
    }

    fn current_active_texture(&self) -> u32 {
        self.inner.borrow().state.active_texture
    }

    fn current_read_buffer(&self) -> ReadBuffer {
        self.inner.borrow().state.read_buffer
    }

    fn current_clear_color(&self) -> [f32; 4] {
        self.inner.borrow().state.clear_color
    }

    fn texture_binding(&self, target: TextureTarget) -> TextureId {
        let inner = self.inner.borrow();
        let unit = inner.state.active_texture;
        inner
            .state
            .texture_bindings
            .get(&(unit, target))
            .copied()
            .unwrap_or(TextureId::NONE)
    }

    // ===== DRAWS =====

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
        self.record(format!("draw_arrays {:?} {} {}", mode, first, count));
    }

    fn draw_arrays_instanced(&self, mode: PrimitiveMode, first: i32, count: i32, instances: i32) {
        self.record(format!(
            "draw_arrays_instanced {:?} {} {} {}",
            mode, first, count, instances
        ));
    }

    // ===== SYNCHRONIZATION =====

    fn fence_sync(&self) -> SyncId {
        SyncId(self.allocate(ObjectKind::Sync))
    }

    fn client_wait_sync(&self, sync: SyncId, flush: bool, timeout_ns: u64) -> WaitResult {
        let mut inner = self.inner.borrow_mut();
        let result = inner
            .config
            .wait_results
            .pop_front()
            .unwrap_or(WaitResult::AlreadySignaled);
        inner.events.push(format!(
            "client_wait_sync {} flush={} timeout={} -> {}",
            sync.raw(),
            flush,
            timeout_ns,
            result.name()
        ));
        result
    }

    fn delete_sync(&self, sync: SyncId) {
        self.release(ObjectKind::Sync, sync.raw());
    }

    fn finish(&self) {
        self.record("finish".to_string());
    }
}

#[cfg(test)]
#[path = "mock_gl_device_tests.rs"]
mod tests;
