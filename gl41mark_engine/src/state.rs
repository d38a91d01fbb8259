/// Ambient render state preservation
///
/// A scene's `draw()` opens one `StateGuard` covering every category it is
/// about to touch. The guard snapshots those values on entry and writes them
/// back when it drops, so an early `return` or `?` cannot leak state into
/// the next scene.

use bitflags::bitflags;

use crate::device::{
    BufferId, BufferTarget, DepthFunc, EnableCap, FramebufferId, FramebufferTarget, GlDevice,
    ProgramId, ReadBuffer, Rect, VertexArrayId,
};

bitflags! {
    /// Categories of ambient state a snapshot covers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateMask: u32 {
        /// Draw and read framebuffer bindings
        const FRAMEBUFFERS = 1 << 0;
        const ARRAY_BUFFER = 1 << 1;
        const PROGRAM = 1 << 2;
        const VERTEX_ARRAY = 1 << 3;
        const VIEWPORT = 1 << 4;
        /// Depth test, cull face, blend, scissor test, stencil test
        const ENABLES = 1 << 5;
        const DEPTH_FUNC = 1 << 6;
        const COLOR_MASK = 1 << 7;
        const ACTIVE_TEXTURE = 1 << 8;
        const READ_BUFFER = 1 << 9;
        const CLEAR_COLOR = 1 << 10;
        /// Generic GL_UNIFORM_BUFFER binding (indexed bindings are scene-owned)
        const UNIFORM_BUFFER = 1 << 11;
    }
}

/// Point-in-time capture of the selected categories
///
/// Fields outside `mask` hold defaults and are ignored by `restore` and by
/// equality.
#[derive(Debug, Clone, Copy)]
pub struct AmbientState {
    mask: StateMask,
    draw_framebuffer: FramebufferId,
    read_framebuffer: FramebufferId,
    array_buffer: BufferId,
    uniform_buffer: BufferId,
    program: ProgramId,
    vertex_array: VertexArrayId,
    viewport: Rect,
    enables: [bool; EnableCap::ALL.len()],
    depth_func: DepthFunc,
    color_mask: [bool; 4],
    active_texture: u32,
    read_buffer: ReadBuffer,
    clear_color: [f32; 4],
}

impl AmbientState {
    pub fn capture(device: &dyn GlDevice, mask: StateMask) -> Self {
        let mut state = Self {
            mask,
            draw_framebuffer: FramebufferId::NONE,
            read_framebuffer: FramebufferId::NONE,
            array_buffer: BufferId::NONE,
            uniform_buffer: BufferId::NONE,
            program: ProgramId::NONE,
            vertex_array: VertexArrayId::NONE,
            viewport: Rect::default(),
            enables: [false; EnableCap::ALL.len()],
            depth_func: DepthFunc::default(),
            color_mask: [true; 4],
            active_texture: 0,
            read_buffer: ReadBuffer::default(),
            clear_color: [0.0; 4],
        };

        if mask.contains(StateMask::FRAMEBUFFERS) {
            state.draw_framebuffer = device.framebuffer_binding(FramebufferTarget::Draw);
            state.read_framebuffer = device.framebuffer_binding(FramebufferTarget::Read);
        }
        if mask.contains(StateMask::ARRAY_BUFFER) {
            state.array_buffer = device.buffer_binding(BufferTarget::Array);
        }
        if mask.contains(StateMask::UNIFORM_BUFFER) {
            state.uniform_buffer = device.buffer_binding(BufferTarget::Uniform);
        }
        if mask.contains(StateMask::PROGRAM) {
            state.program = device.current_program();
        }
        if mask.contains(StateMask::VERTEX_ARRAY) {
            state.vertex_array = device.vertex_array_binding();
        }
        if mask.contains(StateMask::VIEWPORT) {
            state.viewport = device.viewport_rect();
        }
        if mask.contains(StateMask::ENABLES) {
            for (slot, cap) in state.enables.iter_mut().zip(EnableCap::ALL) {
                *slot = device.is_enabled(cap);
            }
        }
        if mask.contains(StateMask::DEPTH_FUNC) {
            state.depth_func = device.current_depth_func();
        }
        if mask.contains(StateMask::COLOR_MASK) {
            state.color_mask = device.current_color_mask();
        }
        if mask.contains(StateMask::ACTIVE_TEXTURE) {
            state.active_texture = device.current_active_texture();
        }
        if mask.contains(StateMask::READ_BUFFER) {
            state.read_buffer = device.current_read_buffer();
        }
        if mask.contains(StateMask::CLEAR_COLOR) {
            state.clear_color = device.current_clear_color();
        }
        state
    }

    pub fn mask(&self) -> StateMask {
        self.mask
    }

    /// Write the captured categories back to the context
    pub fn restore(&self, device: &dyn GlDevice) {
        let mask = self.mask;

        // Read buffer selection belongs to the read framebuffer, so rebind first
        if mask.contains(StateMask::FRAMEBUFFERS) {
            device.bind_framebuffer(FramebufferTarget::Read, self.read_framebuffer);
            device.bind_framebuffer(FramebufferTarget::Draw, self.draw_framebuffer);
        }
        if mask.contains(StateMask::READ_BUFFER) {
            device.read_buffer(self.read_buffer);
        }
        if mask.contains(StateMask::PROGRAM) {
            device.use_program(self.program);
        }
        if mask.contains(StateMask::VERTEX_ARRAY) {
            device.bind_vertex_array(self.vertex_array);
        }
        if mask.contains(StateMask::ARRAY_BUFFER) {
            device.bind_buffer(BufferTarget::Array, self.array_buffer);
        }
        if mask.contains(StateMask::UNIFORM_BUFFER) {
            device.bind_buffer(BufferTarget::Uniform, self.uniform_buffer);
        }
        if mask.contains(StateMask::VIEWPORT) {
            device.viewport(self.viewport);
        }
        if mask.contains(StateMask::ENABLES) {
            for (enabled, cap) in self.enables.iter().zip(EnableCap::ALL) {
                if *enabled {
                    device.enable(cap);
                } else {
                    device.disable(cap);
                }
            }
        }
        if mask.contains(StateMask::DEPTH_FUNC) {
            device.depth_func(self.depth_func);
        }
        if mask.contains(StateMask::COLOR_MASK) {
            device.color_mask(self.color_mask);
        }
        if mask.contains(StateMask::ACTIVE_TEXTURE) {
            device.active_texture(self.active_texture);
        }
        if mask.contains(StateMask::CLEAR_COLOR) {
            device.clear_color(self.clear_color);
        }
    }
}

impl PartialEq for AmbientState {
    fn eq(&self, other: &Self) -> bool {
        if self.mask != other.mask {
            return false;
        }
        let mask = self.mask;
        (!mask.contains(StateMask::FRAMEBUFFERS)
            || (self.draw_framebuffer == other.draw_framebuffer
                && self.read_framebuffer == other.read_framebuffer))
            && (!mask.contains(StateMask::ARRAY_BUFFER) || self.array_buffer == other.array_buffer)
            && (!mask.contains(StateMask::UNIFORM_BUFFER) || self.uniform_buffer == other.uniform_buffer)
            && (!mask.contains(StateMask::PROGRAM) || self.program == other.program)
            && (!mask.contains(StateMask::VERTEX_ARRAY) || self.vertex_array == other.vertex_array)
            && (!mask.contains(StateMask::VIEWPORT) || self.viewport == other.viewport)
            && (!mask.contains(StateMask::ENABLES) || self.enables == other.enables)
            && (!mask.contains(StateMask::DEPTH_FUNC) || self.depth_func == other.depth_func)
            && (!mask.contains(StateMask::COLOR_MASK) || self.color_mask == other.color_mask)
            && (!mask.contains(StateMask::ACTIVE_TEXTURE) || self.active_texture == other.active_texture)
            && (!mask.contains(StateMask::READ_BUFFER) || self.read_buffer == other.read_buffer)
            && (!mask.contains(StateMask::CLEAR_COLOR) || self.clear_color == other.clear_color)
    }
}

/// Snapshot on construction, restore on drop
pub struct StateGuard<'a> {
    device: &'a dyn GlDevice,
    saved: AmbientState,
}

impl<'a> StateGuard<'a> {
    pub fn new(device: &'a dyn GlDevice, mask: StateMask) -> Self {
        Self {
            device,
            saved: AmbientState::capture(device, mask),
        }
    }

    pub fn saved(&self) -> &AmbientState {
        &self.saved
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.saved.restore(self.device);
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
