/// Benchmark configuration and platform contracts
///
/// The driver fills a `BenchConfig` once per run; scenes only read it.

/// Which GL profile the run was asked to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlProfile {
    /// Use whatever the platform layer created
    #[default]
    Auto,
    /// Core profile was requested explicitly
    Core,
    /// Legacy (compatibility) profile; disables every core-only scene
    Legacy,
}

/// Escalating fence-wait timeouts for the streaming ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceWaitPolicy {
    /// First wait, in nanoseconds
    pub short_timeout_ns: u64,
    /// Retry after the first wait timed out, in nanoseconds
    pub long_timeout_ns: u64,
}

impl Default for FenceWaitPolicy {
    fn default() -> Self {
        Self {
            short_timeout_ns: 1_000_000,
            long_timeout_ns: 5_000_000,
        }
    }
}

/// Run-wide settings shared by all scenes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Requested GL profile
    pub profile: GlProfile,
    /// Emit a diagnostic line for each reason a scene is unsupported
    pub show_errors: bool,
    /// Timeouts used by the streaming synchronizer
    pub fence_wait: FenceWaitPolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            profile: GlProfile::Auto,
            show_errors: true,
            fence_wait: FenceWaitPolicy::default(),
        }
    }
}

/// Surface dimensions provided by the platform/windowing layer
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Width over height, 1.0 for a degenerate surface
    fn aspect(&self) -> f32 {
        let h = self.height();
        if h == 0 {
            1.0
        } else {
            self.width() as f32 / h as f32
        }
    }
}

/// Fixed-size canvas (offscreen runs, tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Canvas for SurfaceSize {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
