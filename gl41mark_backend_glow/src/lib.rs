/*!
# gl41mark glow backend

OpenGL implementation of the gl41mark [`GlDevice`] trait on top of the
`glow` crate.

The platform layer creates a GL 4.1 context, makes it current and hands its
`GetProcAddress` to [`GlowDevice::from_loader_function`]. A few entry points
(`glProgramParameteri`, the program pipeline calls, `glUnmapBuffer` and
`glGetString`) are resolved directly from the same loader so their results
reach the scenes unfiltered.

Enable the `gl-error-checks` feature to drain `glGetError` after every call;
errors are logged through the engine logger and counted in [`get_gl_error_stats`].

[`GlDevice`]: gl41mark_engine::gl41mark::device::GlDevice
*/

mod glow_convert;
mod glow_device;
mod raw_procs;
mod debug;

pub use glow_device::GlowDevice;

// Re-export debug utilities
pub use debug::{
    get_gl_error_stats, gl_error_offenders, print_context_report, print_gl_error_stats_report,
    reset_gl_error_stats, GlErrorStats,
};
