/// Lifecycle state machine wrapped around one scene
///
/// ```text
/// Unloaded --load--> Loaded --setup--> Configured --draw--> Configured
///     ^                 |                  |
///     +----unload-------+------------------+
/// load/setup failure: roll back through unload, then Failed
/// (load allowed again, unload returns to Unloaded)
/// ```

use std::fmt;

use crate::device::GlDevice;
use crate::error::{Error, Result};
use crate::params::SceneOptions;
use crate::scene::scene::{FrameInfo, Scene, SceneContext};
use crate::{engine_bail, engine_debug};

const SOURCE: &str = "gl41mark::scene::lifecycle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Unloaded,
    Loaded,
    Configured,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Unloaded => "Unloaded",
            LifecycleState::Loaded => "Loaded",
            LifecycleState::Configured => "Configured",
            LifecycleState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Owns a scene and enforces call ordering
pub struct SceneLifecycle {
    scene: Box<dyn Scene>,
    state: LifecycleState,
    last_error: Option<Error>,
    frames: u64,
}

impl SceneLifecycle {
    pub fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            state: LifecycleState::Unloaded,
            last_error: None,
            frames: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.scene.name()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Error that moved the scene to `Failed`, kept until the next load
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Frames drawn since the last successful setup
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    pub fn options(&self) -> &SceneOptions {
        self.scene.options()
    }

    /// Store a raw option value; applied by the next `setup`
    pub fn set_option(&mut self, name: &str, value: &str) -> bool {
        self.scene.options_mut().set(name, value)
    }

    pub fn reset_options(&mut self) {
        self.scene.options_mut().reset();
    }

    /// Capability query; valid in every state
    pub fn supported(&self, ctx: &SceneContext<'_>) -> bool {
        self.scene.supported(ctx)
    }

    pub fn load(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        match self.state {
            LifecycleState::Unloaded | LifecycleState::Failed => {}
            state => engine_bail!(SOURCE, InvalidState, "{}: load while {}", self.name(), state),
        }

        self.last_error = None;
        match self.scene.load(ctx) {
            Ok(()) => {
                engine_debug!(SOURCE, "{} loaded", self.name());
                self.state = LifecycleState::Loaded;
                Ok(())
            }
            Err(err) => self.fail(ctx.device, err),
        }
    }

    pub fn setup(&mut self, ctx: &SceneContext<'_>) -> Result<()> {
        match self.state {
            LifecycleState::Loaded | LifecycleState::Configured => {}
            state => engine_bail!(SOURCE, InvalidState, "{}: setup while {}", self.name(), state),
        }

        match self.scene.setup(ctx) {
            Ok(()) => {
                self.state = LifecycleState::Configured;
                self.frames = 0;
                Ok(())
            }
            Err(err) => self.fail(ctx.device, err),
        }
    }

    pub fn draw(&mut self, ctx: &SceneContext<'_>, elapsed: f32) -> Result<()> {
        if self.state != LifecycleState::Configured {
            engine_bail!(SOURCE, InvalidState, "{}: draw while {}", self.name(), self.state);
        }
        self.scene.draw(ctx, &FrameInfo::new(self.frames, elapsed));
        self.frames += 1;
        Ok(())
    }

    /// Release every resource; valid in every state
    pub fn unload(&mut self, device: &dyn GlDevice) {
        self.scene.unload(device);
        self.state = LifecycleState::Unloaded;
        self.frames = 0;
    }

    fn fail(&mut self, device: &dyn GlDevice, err: Error) -> Result<()> {
        self.scene.unload(device);
        self.state = LifecycleState::Failed;
        self.last_error = Some(err.clone());
        Err(err)
    }
}

impl fmt::Debug for SceneLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneLifecycle")
            .field("scene", &self.scene.name())
            .field("state", &self.state)
            .field("last_error", &self.last_error)
            .field("frames", &self.frames)
            .finish()
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
