//! Unit tests for RenderingStage

use super::*;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::parameter::ParameterContainer;
use crate::pipeline::mock_renderer::{journal, MockRenderer};

fn run(stage: &mut RenderingStage, device: &mut MockGraphicsDevice) -> Result<()> {
    let mut pipeline_parameters = ParameterContainer::new();
    let scene_parameters = ParameterContainer::new();
    let mut ctx = RenderContext {
        device,
        pipeline_parameters: &mut pipeline_parameters,
        scene_parameters: &scene_parameters,
        width: 64,
        height: 64,
    };
    stage.render(&mut ctx)
}

// ============================================================================
// EXECUTION
// ============================================================================

#[test]
fn test_renderers_run_in_insertion_order() {
    let journal = journal();
    let mut stage = RenderingStage::geometry("opaque");
    stage.add_renderer(MockRenderer::new(RendererKind::Opaque, "terrain", &journal).boxed()).unwrap();
    stage.add_renderer(MockRenderer::new(RendererKind::Custom("water"), "water", &journal).boxed()).unwrap();
    stage.add_renderer(MockRenderer::new(RendererKind::Transparent, "glass", &journal).boxed()).unwrap();

    run(&mut stage, &mut MockGraphicsDevice::new()).unwrap();
    assert_eq!(*journal.lock().unwrap(), vec!["terrain", "water", "glass"]);
}

#[test]
fn test_inactive_renderers_are_skipped() {
    let journal = journal();
    let mut stage = RenderingStage::prepare();
    stage.add_renderer(MockRenderer::new(RendererKind::Shadow, "shadow", &journal).inactive().boxed()).unwrap();
    stage.add_renderer(MockRenderer::new(RendererKind::Custom("reflections"), "reflections", &journal).boxed()).unwrap();

    run(&mut stage, &mut MockGraphicsDevice::new()).unwrap();
    assert_eq!(*journal.lock().unwrap(), vec!["reflections"]);
}

#[test]
fn test_failure_aborts_stage() {
    let journal = journal();
    let mut stage = RenderingStage::geometry("opaque");
    stage.add_renderer(MockRenderer::new(RendererKind::Opaque, "broken", &journal).failing().boxed()).unwrap();
    stage.add_renderer(MockRenderer::new(RendererKind::Transparent, "after", &journal).boxed()).unwrap();

    let result = run(&mut stage, &mut MockGraphicsDevice::new());
    assert!(matches!(result, Err(Error::DeviceResourceError(_))));
    assert_eq!(*journal.lock().unwrap(), vec!["broken"]);
}

#[test]
fn test_duplicate_kind_in_stage_is_rejected() {
    let journal = journal();
    let mut stage = RenderingStage::geometry("opaque");
    stage.add_renderer(MockRenderer::new(RendererKind::Opaque, "a", &journal).boxed()).unwrap();
    let result = stage.add_renderer(MockRenderer::new(RendererKind::Opaque, "b", &journal).boxed());
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

// ============================================================================
// RELEASE
// ============================================================================

#[test]
fn test_release_releases_every_renderer() {
    let journal = journal();
    let mut device = MockGraphicsDevice::new();
    let mut stage = RenderingStage::geometry("opaque");
    stage.add_renderer(MockRenderer::new(RendererKind::Opaque, "terrain", &journal).drawing("terrain").boxed()).unwrap();
    stage.add_renderer(MockRenderer::new(RendererKind::Transparent, "glass", &journal).boxed()).unwrap();
    run(&mut stage, &mut device).unwrap();

    stage.release(&mut device).unwrap();

    assert!(stage.renderers().is_empty());
    assert_eq!(device.programs_destroyed, 1);
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["terrain", "glass", "release terrain", "release glass"]
    );
}

#[test]
fn test_stage_roles() {
    assert_eq!(RenderingStage::prepare().role(), StageRole::Prepare);
    let geometry = RenderingStage::geometry("transparent");
    assert_eq!(geometry.role(), StageRole::Geometry);
    assert_eq!(geometry.name(), "transparent");
}
