/// Scene trait and the context every scene operation receives
///
/// Scenes are leaf implementers: each owns its options, its resolved
/// capabilities and one resource set. Ordering rules (load before setup,
/// setup before draw) are enforced by `SceneLifecycle`, not here.

use glam::{Mat4, Vec3};

use crate::capability::{is_core_profile, CapabilitySet, Feature};
use crate::config::{BenchConfig, Canvas, GlProfile};
use crate::device::GlDevice;
use crate::engine_info;
use crate::error::{Error, Result};
use crate::params::SceneOptions;
use crate::shader::ShaderRewriter;

/// Collaborators borrowed for the duration of one scene call
#[derive(Clone, Copy)]
pub struct SceneContext<'a> {
    pub device: &'a dyn GlDevice,
    pub canvas: &'a dyn Canvas,
    pub config: &'a BenchConfig,
    pub rewriter: &'a dyn ShaderRewriter,
}

/// Timing of the frame being drawn
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    /// Frames drawn since setup
    pub frame: u64,
    /// Seconds since the scene started
    pub elapsed: f32,
}

impl FrameInfo {
    pub fn new(frame: u64, elapsed: f32) -> Self {
        Self { frame, elapsed }
    }
}

/// One benchmark workload
pub trait Scene {
    /// Catalog name ("gl41-instancing", ...)
    fn name(&self) -> &'static str;

    fn options(&self) -> &SceneOptions;
    fn options_mut(&mut self) -> &mut SceneOptions;

    /// Pure capability query; allocates nothing
    fn supported(&self, ctx: &SceneContext<'_>) -> bool;

    /// Build programs and fixed-topology resources sized from defaults
    ///
    /// On error the resource set may be partially filled; the caller
    /// follows up with `unload`.
    fn load(&mut self, ctx: &SceneContext<'_>) -> Result<()>;

    /// Apply current option values, reallocating only what changed size
    fn setup(&mut self, ctx: &SceneContext<'_>) -> Result<()>;

    /// Issue one frame of GPU work; ambient state is left as found
    fn draw(&mut self, ctx: &SceneContext<'_>, frame: &FrameInfo);

    /// Destroy everything the resource set holds; safe in any state
    fn unload(&mut self, device: &dyn GlDevice);

    /// True when every handle is back at the sentinel
    fn is_released(&self) -> bool;
}

// ===== SHARED HELPERS =====

/// Resolve the features a scene needs on the current context
///
/// Checks the run profile and the context profile before probing entry
/// points. With `show_errors`, each reason is logged.
pub fn probe_features(
    ctx: &SceneContext<'_>,
    source: &str,
    extra: &[Feature],
    show_errors: bool,
) -> Result<CapabilitySet> {
    let unsupported = |message: &str| {
        if show_errors {
            engine_info!(source, "{}", message);
        }
        Error::CapabilityMissing(message.to_string())
    };

    if ctx.config.profile == GlProfile::Legacy {
        return Err(unsupported("disabled in legacy profile"));
    }
    if !is_core_profile(ctx.device) {
        return Err(unsupported("requires a core profile context"));
    }

    let features: Vec<Feature> = Feature::CORE.iter().chain(extra.iter()).copied().collect();
    let caps = CapabilitySet::resolve(ctx.device, &features, show_errors, source);
    caps.require_core(show_errors, source)?;

    for feature in extra {
        if !caps.has(*feature) {
            return Err(unsupported(&format!("missing {} entry points", feature.label())));
        }
    }
    Ok(caps)
}

/// Rotation about Z by `frame * 0.01` radians, column-major
pub fn spin_matrix(frame: u64) -> [f32; 16] {
    Mat4::from_rotation_z(frame as f32 * 0.01).to_cols_array()
}

/// Perspective camera orbiting the origin
///
/// `fov_y_deg` vertical field of view, eye pulled back by `distance`, then
/// yawed by `yaw_deg` and pitched by `pitch_deg`.
pub fn orbit_view_projection(
    aspect: f32,
    fov_y_deg: f32,
    far: f32,
    distance: f32,
    yaw_deg: f32,
    pitch_deg: f32,
) -> Mat4 {
    let projection = Mat4::perspective_rh_gl(fov_y_deg.to_radians(), aspect, 0.1, far);
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -distance))
        * Mat4::from_rotation_y(yaw_deg.to_radians())
        * Mat4::from_rotation_x(pitch_deg.to_radians());
    projection * view
}

/// Square grid of `count` cells spanning -0.9..0.9, row-major
pub fn centered_grid(count: u32) -> Vec<[f32; 2]> {
    let side = (count as f64).sqrt().ceil() as u32;
    let step = if side > 1 { 1.8 / (side - 1) as f32 } else { 0.0 };
    (0..count)
        .map(|i| [-0.9 + step * (i % side) as f32, -0.9 + step * (i / side) as f32])
        .collect()
}
