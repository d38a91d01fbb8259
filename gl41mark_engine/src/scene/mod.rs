//! Benchmark scenes
//!
//! Provides the scene contract, the lifecycle wrapper that enforces load /
//! setup / draw ordering, the catalog, and the six gl41 scene variants.

mod scene;
mod lifecycle;
mod catalog;
mod instancing;
mod pipeline;
mod mrt;
mod texarray;
mod streaming_sync;
mod geometry;

pub use scene::{
    Scene, SceneContext, FrameInfo,
    probe_features, spin_matrix, orbit_view_projection, centered_grid,
};
pub use lifecycle::{SceneLifecycle, LifecycleState};
pub use catalog::{create_scene, scene_names, SCENE_NAMES};
pub use instancing::{InstancingScene, InstancingResources};
pub use pipeline::{PipelineScene, PipelineResources, model_entries};
pub use mrt::{MrtScene, MrtResources, MAX_TARGETS};
pub use texarray::{TexArrayScene, TexArrayResources, layer_pixels};
pub use streaming_sync::{StreamingSyncScene, StreamingSyncResources};
pub use geometry::{GeometryScene, GeometryResources, point_grid};

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
