//! Integration tests for a full frame: engine singleton, resource manager,
//! renderers, post-processing and screen composite.
//!
//! Uses the headless device from `headless_test_utils`. No GPU required.
//!
//! Run with: cargo test --test pipeline_integration_tests


use std::sync::{Arc, Mutex};
use glam::Vec3;
use serial_test::serial;
use winit::dpi::PhysicalSize;
use headless_test_utils::{HeadlessDevice, MemoryAssets};
use lumen_3d_engine::lumen3d::{Engine, Error};
use lumen_3d_engine::lumen3d::config::{MemoryBudget, PipelineConfig};
use lumen_3d_engine::lumen3d::parameter::{keys, ParameterContainer};
use lumen_3d_engine::lumen3d::pipeline::{
    MeshRenderer, PipelineState, PostEffect, RendererKind, RenderingPipeline, SkyRenderer,
};
use lumen_3d_engine::lumen3d::render::GraphicsDevice;
use lumen_3d_engine::lumen3d::resource::DataStorePolicy;
use lumen_3d_engine::lumen3d::scene::{Camera, DirectionalLight};

const SKY: [&str; 6] = [
    "sky/right.png", "sky/left.png", "sky/top.png", "sky/bottom.png", "sky/front.png", "sky/back.png",
];

fn assets() -> MemoryAssets {
    let mut assets = MemoryAssets::new()
        .triangle("models/tri.obj")
        .text("shaders/basic.vert", "void main() {}")
        .text("shaders/basic.frag", "void main() {}")
        .text("shaders/skybox.vert", "void main() {}")
        .text("shaders/skybox.frag", "void main() {}");
    for face in SKY {
        assets = assets.image(face, 8, 8);
    }
    assets
}

fn scene() -> ParameterContainer {
    let mut scene = ParameterContainer::new();
    scene.set(&keys::MAIN_CAMERA,
        Camera::look_at(Vec3::new(0.0, 1.0, 4.0), Vec3::ZERO, 1.0, 1.5, 0.1, 50.0)).unwrap();
    scene.set(&keys::MAIN_DIRECTIONAL_LIGHT,
        DirectionalLight::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::ONE, 2.0).unwrap()).unwrap();
    scene
}

/// Engine with a resource manager over a fresh headless device
fn setup() -> Arc<Mutex<HeadlessDevice>> {
    Engine::shutdown();
    Engine::initialize().unwrap();
    let device = HeadlessDevice::shared();
    Engine::create_resource_manager(device.clone(), Arc::new(assets()), MemoryBudget::unlimited()).unwrap();
    device
}

fn build_pipeline(device: &Arc<Mutex<HeadlessDevice>>) -> RenderingPipeline {
    let manager = Engine::resource_manager().unwrap();
    let (meshes, sky) = {
        let mut resources = manager.lock().unwrap();
        let program = resources.load_shader("shaders/basic.vert", "shaders/basic.frag").unwrap();
        let mesh = resources.load_mesh("models/tri.obj", DataStorePolicy::AllowDemotion).unwrap();
        let mut meshes = MeshRenderer::new(RendererKind::Opaque, program);
        meshes.add_mesh(mesh);
        let sky = SkyRenderer::load(&mut resources, SKY, "shaders/skybox.vert", "shaders/skybox.frag").unwrap();
        (meshes, sky)
    };

    let mut pipeline = RenderingPipeline::new(device.clone(), PipelineConfig::default()).unwrap();
    pipeline.initialize(PhysicalSize::new(640, 480)).unwrap();
    pipeline.geometry_stage_mut("opaque").unwrap().add_renderer(Box::new(meshes)).unwrap();
    pipeline.set_sky_renderer(Some(Box::new(sky)));
    pipeline.post_processing_mut().add_effect(PostEffect::ToneMapping { exposure: 1.2 }).unwrap();
    pipeline.post_processing_mut().add_effect(PostEffect::GammaCorrection).unwrap();
    pipeline
}

#[test]
#[serial]
fn test_integration_frame_runs_every_stage_in_order() {
    let device = setup();
    let mut pipeline = build_pipeline(&device);

    assert!(pipeline.render(&scene(), PhysicalSize::new(640, 480)).unwrap());

    {
        let device = device.lock().unwrap();
        assert_eq!(device.draws, vec!["basic", "skybox", "tone_mapping", "gamma_correction", "copy"]);
        assert_eq!(device.screen_draws, 1);
    }

    pipeline.release().unwrap();
    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_resize_and_minimize() {
    let device = setup();
    let mut pipeline = build_pipeline(&device);
    let scene = scene();

    pipeline.render(&scene, PhysicalSize::new(640, 480)).unwrap();
    let created = device.lock().unwrap().framebuffers_created;

    assert!(!pipeline.render(&scene, PhysicalSize::new(0, 0)).unwrap());
    assert_eq!(device.lock().unwrap().framebuffers_created, created);

    pipeline.render(&scene, PhysicalSize::new(1280, 720)).unwrap();
    assert_eq!(device.lock().unwrap().framebuffers_created, created + 2);
    assert_eq!(pipeline.main_target().size(), Some((1280, 720)));

    pipeline.release().unwrap();
    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_shutdown_frees_device_memory() {
    let device = setup();
    let mut pipeline = build_pipeline(&device);
    pipeline.render(&scene(), PhysicalSize::new(320, 240)).unwrap();

    pipeline.release().unwrap();
    assert_eq!(pipeline.state(), PipelineState::Released);
    Engine::shutdown();

    assert_eq!(device.lock().unwrap().stats().device_memory_used, 0);
    assert!(matches!(Engine::resource_manager(), Err(Error::InitializationFailed(_))));
}

#[test]
#[serial]
fn test_integration_missing_camera_is_reported() {
    let device = setup();
    let mut pipeline = build_pipeline(&device);
    let mut scene = scene();
    scene.remove(&keys::MAIN_CAMERA).unwrap();

    let result = pipeline.render(&scene, PhysicalSize::new(640, 480));
    assert!(matches!(result, Err(Error::PreconditionFailed(_))));
    assert!(device.lock().unwrap().draws.is_empty());

    pipeline.release().unwrap();
    Engine::shutdown();
}
