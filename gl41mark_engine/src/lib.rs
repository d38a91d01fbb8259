/*!
# gl41mark Engine

Core lifecycle, synchronization and state-preservation logic for the gl41mark
OpenGL 4.1 benchmark scenes.

This crate is backend-agnostic: every GPU call goes through the [`GlDevice`]
trait, implemented by a concrete backend crate (glow) or by the mock device
used in unit tests.

## Architecture

- [`CapabilitySet`] and [`is_core_profile`]: per-context entry point
  resolution and core-profile detection
- [`ResourceSet`] with the `resource::create_*` / `destroy_*` pairs: opaque
  GPU handles with a zero sentinel
- [`SceneLifecycle`]: Unloaded / Loaded / Configured / Failed state machine
- [`StreamingRing`]: triple-buffered vertex streaming guarded by fences
- [`StateGuard`] over [`AmbientState`]: snapshot and restore of ambient
  render state around a draw

Scenes (instancing, separable pipelines, MRT, texture arrays, streaming sync,
geometry shaders) are leaf implementers of the [`Scene`] trait.

[`GlDevice`]: crate::gl41mark::device::GlDevice
[`CapabilitySet`]: crate::gl41mark::capability::CapabilitySet
[`is_core_profile`]: crate::gl41mark::capability::is_core_profile
[`ResourceSet`]: crate::gl41mark::resource::ResourceSet
[`SceneLifecycle`]: crate::gl41mark::scene::SceneLifecycle
[`StreamingRing`]: crate::gl41mark::streaming::StreamingRing
[`StateGuard`]: crate::gl41mark::state::StateGuard
[`AmbientState`]: crate::gl41mark::state::AmbientState
[`Scene`]: crate::gl41mark::scene::Scene
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod device;
pub mod capability;
pub mod resource;
pub mod shader;
pub mod params;
pub mod state;
pub mod streaming;
pub mod scene;

// Main gl41mark namespace module
pub mod gl41mark {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (logging hub)
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Configuration and platform contracts
    pub mod config {
        pub use crate::config::*;
    }

    // Device abstraction (handles, enums, GlDevice trait)
    pub mod device {
        pub use crate::device::*;
    }

    // Capability probing
    pub mod capability {
        pub use crate::capability::*;
    }

    // Resource pairing helpers
    pub mod resource {
        pub use crate::resource::*;
    }

    // Program building and shader text collaborators
    pub mod shader {
        pub use crate::shader::*;
    }

    // Option parsing
    pub mod params {
        pub use crate::params::*;
    }

    // Ambient state preservation
    pub mod state {
        pub use crate::state::*;
    }

    // Streaming ring synchronizer
    pub mod streaming {
        pub use crate::streaming::*;
    }

    // Scenes and lifecycle
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
