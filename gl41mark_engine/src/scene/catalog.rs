/// Scene catalog: name to constructor

use crate::scene::geometry::GeometryScene;
use crate::scene::instancing::InstancingScene;
use crate::scene::mrt::MrtScene;
use crate::scene::pipeline::PipelineScene;
use crate::scene::scene::Scene;
use crate::scene::streaming_sync::StreamingSyncScene;
use crate::scene::texarray::TexArrayScene;

/// Every scene, in benchmark order
pub const SCENE_NAMES: [&str; 6] = [
    InstancingScene::NAME,
    PipelineScene::NAME,
    MrtScene::NAME,
    TexArrayScene::NAME,
    StreamingSyncScene::NAME,
    GeometryScene::NAME,
];

pub fn scene_names() -> &'static [&'static str] {
    &SCENE_NAMES
}

/// Fresh scene with default options, or `None` for an unknown name
pub fn create_scene(name: &str) -> Option<Box<dyn Scene>> {
    let scene: Box<dyn Scene> = match name {
        InstancingScene::NAME => Box::new(InstancingScene::new()),
        PipelineScene::NAME => Box::new(PipelineScene::new()),
        MrtScene::NAME => Box::new(MrtScene::new()),
        TexArrayScene::NAME => Box::new(TexArrayScene::new()),
        StreamingSyncScene::NAME => Box::new(StreamingSyncScene::new()),
        GeometryScene::NAME => Box::new(GeometryScene::new()),
        _ => return None,
    };
    Some(scene)
}
