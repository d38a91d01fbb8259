/// Paired create/destroy of driver objects held in scene resource sets
///
/// Every handle field of a resource set starts at `NONE`. `create_*` fills
/// an empty slot and turns a sentinel result into
/// `Error::ResourceAllocationFailure`; `destroy_*` releases a live slot and
/// resets it to `NONE` straight away, so teardown can run any number of
/// times.

use crate::device::{
    BufferId, FramebufferId, GlDevice, PipelineId, ProgramId, RenderbufferId, SyncId, TextureId,
    VertexArrayId,
};
use crate::engine_bail;
use crate::error::Result;

const SOURCE: &str = "gl41mark::resource";

macro_rules! paired_resource {
    ($create:ident, $destroy:ident, $handle:ty, $gl_create:ident, $gl_delete:ident, $kind:expr) => {
        /// Allocate into an empty slot
        pub fn $create(device: &dyn GlDevice, slot: &mut $handle, what: &str) -> Result<()> {
            debug_assert!(
                !slot.is_allocated(),
                "{} '{}' created over a live handle",
                $kind,
                what
            );
            let handle = device.$gl_create();
            if !handle.is_allocated() {
                engine_bail!(SOURCE, ResourceAllocationFailure, "failed to create {} '{}'", $kind, what);
            }
            *slot = handle;
            Ok(())
        }

        /// Release a slot and reset it to the sentinel; no-op when empty
        pub fn $destroy(device: &dyn GlDevice, slot: &mut $handle) {
            if slot.is_allocated() {
                device.$gl_delete(*slot);
                *slot = <$handle>::NONE;
            }
        }
    };
}

paired_resource!(create_buffer, destroy_buffer, BufferId, create_buffer, delete_buffer, "buffer");
paired_resource!(
    create_vertex_array,
    destroy_vertex_array,
    VertexArrayId,
    create_vertex_array,
    delete_vertex_array,
    "vertex array"
);
paired_resource!(create_texture, destroy_texture, TextureId, create_texture, delete_texture, "texture");
paired_resource!(
    create_framebuffer,
    destroy_framebuffer,
    FramebufferId,
    create_framebuffer,
    delete_framebuffer,
    "framebuffer"
);
paired_resource!(
    create_renderbuffer,
    destroy_renderbuffer,
    RenderbufferId,
    create_renderbuffer,
    delete_renderbuffer,
    "renderbuffer"
);
paired_resource!(
    create_program_pipeline,
    destroy_program_pipeline,
    PipelineId,
    create_program_pipeline,
    delete_program_pipeline,
    "program pipeline"
);
paired_resource!(create_fence, destroy_fence, SyncId, fence_sync, delete_sync, "fence");

/// Programs come out of `shader::build_program`; only the release half lives here
pub fn destroy_program(device: &dyn GlDevice, slot: &mut ProgramId) {
    if slot.is_allocated() {
        device.delete_program(*slot);
        *slot = ProgramId::NONE;
    }
}

/// Release every allocated handle of a slice (texture attachments, ring buffers)
pub fn destroy_textures(device: &dyn GlDevice, slots: &mut [TextureId]) {
    for slot in slots {
        destroy_texture(device, slot);
    }
}

/// Owner of one scene's driver objects
pub trait ResourceSet {
    /// Destroy every held object; safe on an empty or partially built set
    fn release(&mut self, device: &dyn GlDevice);

    /// True when every handle is back at the sentinel
    fn is_released(&self) -> bool;
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
