/// Opaque native GPU handles
///
/// Each handle is the raw name returned by the driver. Zero is the
/// "not allocated" sentinel for every kind, matching GL's own convention.

macro_rules! gl_handle {
    ($(#[$meta:meta])* $name:ident, $raw:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub $raw);

        impl $name {
            /// "Not allocated" sentinel
            pub const NONE: $name = $name(0);

            /// True when the handle names a live driver object
            pub fn is_allocated(self) -> bool {
                self.0 != 0
            }

            /// Raw driver name
            pub fn raw(self) -> $raw {
                self.0
            }
        }
    };
}

gl_handle!(
    /// Shader object (transient, deleted once linked)
    ShaderId, u32
);
gl_handle!(
    /// Linked program object
    ProgramId, u32
);
gl_handle!(
    /// Buffer object (vertex, uniform)
    BufferId, u32
);
gl_handle!(
    /// Vertex array object
    VertexArrayId, u32
);
gl_handle!(
    /// Texture object (2D or 2D array)
    TextureId, u32
);
gl_handle!(
    /// Framebuffer object
    FramebufferId, u32
);
gl_handle!(
    /// Renderbuffer object
    RenderbufferId, u32
);
gl_handle!(
    /// Separable program pipeline object
    PipelineId, u32
);
gl_handle!(
    /// Fence sync object
    ///
    /// GL sync objects are pointers rather than names; backends map them to
    /// a 64-bit key.
    SyncId, u64
);
