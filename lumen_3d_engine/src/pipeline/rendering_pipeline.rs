/// Rendering pipeline - top-level per-frame orchestrator.
///
/// Owns the main framebuffer, the stages and the pipeline-level parameters,
/// and runs every frame in a fixed order:
///
/// Prepare -> Geometry stages -> Sky -> PostProcessing -> screen composite
///
/// The main framebuffer follows (client size x rendering scale, MSAA level)
/// and is recreated on the first frame where either changes.

use std::sync::{Arc, Mutex, MutexGuard};
use winit::dpi::PhysicalSize;
use crate::config::{self, PipelineConfig};
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{AttachmentMask, GraphicsDevice, TextureFormat};
use crate::parameter::{keys, Parameter, ParameterContainer};
use super::post_processing_stage::PostProcessingRenderingStage;
use super::render_target::RenderTarget;
use super::renderer::{RenderContext, Renderer};
use super::rendering_stage::RenderingStage;
use super::screen_compositor::ScreenCompositor;

/// Color format of the main framebuffer
pub const MAIN_COLOR_FORMAT: TextureFormat = TextureFormat::R16G16B16A16_SFLOAT;

/// Depth format of the main framebuffer
pub const MAIN_DEPTH_FORMAT: TextureFormat = TextureFormat::D32_FLOAT;

/// Names of the geometry stages registered by `initialize`, in order
pub const DEFAULT_GEOMETRY_STAGES: [&str; 2] = ["opaque", "transparent"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Created,
    Ready,
    Released,
}

fn lock<'a>(device: &'a Mutex<dyn GraphicsDevice + 'static>) -> Result<MutexGuard<'a, dyn GraphicsDevice + 'static>> {
    device.lock().map_err(|_| crate::engine_err!("lumen3d::RenderingPipeline", "GraphicsDevice lock poisoned"))
}

/// Internal render size for a client area, at least 1x1
pub fn scaled_size(client: PhysicalSize<u32>, scale: f32) -> (u32, u32) {
    let scale_axis = |v: u32| ((v as f32 * scale).round() as u32).max(1);
    (scale_axis(client.width), scale_axis(client.height))
}

pub struct RenderingPipeline {
    graphics_device: Arc<Mutex<dyn GraphicsDevice>>,
    config: PipelineConfig,
    state: PipelineState,
    parameters: ParameterContainer,
    main_target: RenderTarget,
    prepare_stage: RenderingStage,
    geometry_stages: Vec<RenderingStage>,
    sky_renderer: Option<Box<dyn Renderer>>,
    post_processing: PostProcessingRenderingStage,
    compositor: ScreenCompositor,
}

impl RenderingPipeline {
    /// Create a pipeline; nothing is allocated until `initialize`
    ///
    /// # Errors
    ///
    /// `Error::ConfigurationError` if `config` is out of range.
    pub fn new(graphics_device: Arc<Mutex<dyn GraphicsDevice>>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            graphics_device,
            config,
            state: PipelineState::Created,
            parameters: ParameterContainer::new(),
            main_target: RenderTarget::new("main", vec![MAIN_COLOR_FORMAT], Some(MAIN_DEPTH_FORMAT)),
            prepare_stage: RenderingStage::prepare(),
            geometry_stages: Vec::new(),
            sky_renderer: None,
            post_processing: PostProcessingRenderingStage::new(),
            compositor: ScreenCompositor::new(),
        })
    }

    /// Publish pipeline parameters, register default stages and allocate the
    /// main framebuffer for `client_size`
    ///
    /// A zero-sized client area defers allocation to the first rendered frame.
    pub fn initialize(&mut self, client_size: PhysicalSize<u32>) -> Result<()> {
        if self.state != PipelineState::Created {
            engine_bail!(PreconditionFailed, "lumen3d::RenderingPipeline",
                "Pipeline cannot be initialized in state {:?}", self.state);
        }

        self.parameters.insert_parameter(&keys::GAMMA,
            Parameter::new(self.config.gamma).with_validator(|g| config::validate_gamma(*g))?)?;
        self.parameters.insert_parameter(&keys::MSAA_LEVEL,
            Parameter::new(self.config.msaa_level).with_validator(|l| config::validate_msaa_level(*l))?)?;
        self.parameters.insert_parameter(&keys::RENDERING_SCALE,
            Parameter::new(self.config.rendering_scale).with_validator(|s| config::validate_rendering_scale(*s))?)?;
        self.parameters.insert_parameter(&keys::WIREFRAME, Parameter::new(self.config.wireframe))?;

        self.geometry_stages = DEFAULT_GEOMETRY_STAGES.iter()
            .map(|name| RenderingStage::geometry(name))
            .collect();

        if client_size.width > 0 && client_size.height > 0 {
            let (width, height) = scaled_size(client_size, self.config.rendering_scale);
            let device = self.graphics_device.clone();
            let mut device = lock(&device)?;
            self.main_target.ensure(&mut *device, width, height, self.config.msaa_level)?;
        }

        self.state = PipelineState::Ready;
        crate::engine_info!("lumen3d::RenderingPipeline", "Pipeline initialized");
        Ok(())
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pipeline-level parameters (gamma, MSAA level, work texture, ...)
    pub fn parameters(&self) -> &ParameterContainer {
        &self.parameters
    }

    pub fn main_target(&self) -> &RenderTarget {
        &self.main_target
    }

    // ===== SETTERS =====

    /// # Errors
    ///
    /// `Error::ConfigurationError` if `gamma` < 1; the previous value is kept.
    pub fn set_gamma(&mut self, gamma: f32) -> Result<()> {
        config::validate_gamma(gamma)?;
        if self.parameters.contains(&keys::GAMMA) {
            self.parameters.set(&keys::GAMMA, gamma)?;
        }
        self.config.gamma = gamma;
        Ok(())
    }

    /// Takes effect on the next frame (the main framebuffer is recreated)
    ///
    /// # Errors
    ///
    /// `Error::ConfigurationError` if `level` < 1; the previous value is kept.
    pub fn set_msaa_level(&mut self, level: u32) -> Result<()> {
        config::validate_msaa_level(level)?;
        if self.parameters.contains(&keys::MSAA_LEVEL) {
            self.parameters.set(&keys::MSAA_LEVEL, level)?;
        }
        self.config.msaa_level = level;
        Ok(())
    }

    /// # Errors
    ///
    /// `Error::ConfigurationError` if `scale` is not a positive number; the
    /// previous value is kept.
    pub fn set_rendering_scale(&mut self, scale: f32) -> Result<()> {
        config::validate_rendering_scale(scale)?;
        if self.parameters.contains(&keys::RENDERING_SCALE) {
            self.parameters.set(&keys::RENDERING_SCALE, scale)?;
        }
        self.config.rendering_scale = scale;
        Ok(())
    }

    pub fn set_wireframe(&mut self, enabled: bool) -> Result<()> {
        if self.parameters.contains(&keys::WIREFRAME) {
            self.parameters.set(&keys::WIREFRAME, enabled)?;
        }
        self.config.wireframe = enabled;
        Ok(())
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.config.clear_color = color;
    }

    // ===== STAGES =====

    pub fn prepare_stage(&self) -> &RenderingStage {
        &self.prepare_stage
    }

    pub fn prepare_stage_mut(&mut self) -> &mut RenderingStage {
        &mut self.prepare_stage
    }

    /// Geometry stages in execution order
    pub fn geometry_stages(&self) -> &[RenderingStage] {
        &self.geometry_stages
    }

    pub fn geometry_stage_mut(&mut self, name: &str) -> Option<&mut RenderingStage> {
        self.geometry_stages.iter_mut().find(|stage| stage.name() == name)
    }

    /// Append a geometry stage after the existing ones
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if a stage with the same name exists.
    pub fn add_geometry_stage(&mut self, name: &str) -> Result<&mut RenderingStage> {
        if self.geometry_stages.iter().any(|stage| stage.name() == name) {
            engine_bail!(InvalidArgument, "lumen3d::RenderingPipeline",
                "Geometry stage '{}' already exists", name);
        }
        self.geometry_stages.push(RenderingStage::geometry(name));
        let index = self.geometry_stages.len() - 1;
        Ok(&mut self.geometry_stages[index])
    }

    /// Install the sky renderer, returning the previous one (not released)
    pub fn set_sky_renderer(&mut self, renderer: Option<Box<dyn Renderer>>) -> Option<Box<dyn Renderer>> {
        std::mem::replace(&mut self.sky_renderer, renderer)
    }

    pub fn post_processing(&self) -> &PostProcessingRenderingStage {
        &self.post_processing
    }

    pub fn post_processing_mut(&mut self) -> &mut PostProcessingRenderingStage {
        &mut self.post_processing
    }

    // ===== FRAME =====

    fn check_ready(&self) -> Result<()> {
        match self.state {
            PipelineState::Ready => Ok(()),
            PipelineState::Created => engine_bail!(PreconditionFailed, "lumen3d::RenderingPipeline",
                "Pipeline rendered before initialize"),
            PipelineState::Released => engine_bail!(UseAfterRelease, "lumen3d::RenderingPipeline",
                "Pipeline rendered after release"),
        }
    }

    /// Render one frame of `scene` into a window of `client_size`
    ///
    /// Returns false if the frame was skipped because the client area is
    /// empty (minimized window).
    ///
    /// # Errors
    ///
    /// - `Error::PreconditionFailed` if the scene has no main camera or no
    ///   main directional light, or before `initialize`
    /// - `Error::UseAfterRelease` after `release`
    /// - any device error raised mid-frame; the frame is abandoned
    pub fn render(&mut self, scene: &ParameterContainer, client_size: PhysicalSize<u32>) -> Result<bool> {
        self.check_ready()?;
        scene.require(&keys::MAIN_CAMERA)?;
        scene.require(&keys::MAIN_DIRECTIONAL_LIGHT)?;

        if client_size.width == 0 || client_size.height == 0 {
            crate::engine_trace!("lumen3d::RenderingPipeline", "Empty client area, frame skipped");
            return Ok(false);
        }

        let (width, height) = scaled_size(client_size, self.config.rendering_scale);
        let device = self.graphics_device.clone();
        let mut device = lock(&device)?;
        self.main_target.ensure(&mut *device, width, height, self.config.msaa_level)?;
        let main = self.main_target.framebuffer()?.clone();

        let mut ctx = RenderContext {
            device: &mut *device,
            pipeline_parameters: &mut self.parameters,
            scene_parameters: scene,
            width,
            height,
        };

        self.prepare_stage.render(&mut ctx)?;

        ctx.device.bind_framebuffer(Some(&main), AttachmentMask::ATTACHMENT_0)?;
        ctx.device.set_viewport(width, height);
        ctx.device.clear(self.config.clear_color)?;
        ctx.device.set_wireframe(self.config.wireframe);

        for stage in self.geometry_stages.iter_mut() {
            stage.render(&mut ctx)?;
        }
        ctx.device.set_wireframe(false);

        if let Some(sky) = self.sky_renderer.as_mut().filter(|sky| sky.is_active()) {
            sky.render(&mut ctx)?;
        }

        self.post_processing.render(&mut *device, &mut self.parameters, &main, width, height)?;
        self.compositor.composite(&mut *device, &self.parameters, client_size.width, client_size.height)?;
        Ok(true)
    }

    // ===== RELEASE =====

    /// Tear down stages, compositor, main framebuffer and parameters, in
    /// that order
    ///
    /// Every step runs even if one fails; the first error is returned.
    /// Releasing twice is a no-op.
    pub fn release(&mut self) -> Result<()> {
        if self.state == PipelineState::Released {
            return Ok(());
        }
        let device = self.graphics_device.clone();
        let mut device = lock(&device)?;
        let mut first_error = None;

        if let Err(error) = self.prepare_stage.release(&mut *device) {
            first_error.get_or_insert(error);
        }
        for stage in self.geometry_stages.iter_mut() {
            if let Err(error) = stage.release(&mut *device) {
                first_error.get_or_insert(error);
            }
        }
        if let Some(mut sky) = self.sky_renderer.take() {
            if let Err(error) = sky.release(&mut *device) {
                first_error.get_or_insert(error);
            }
        }
        self.post_processing.release(&mut *device);
        self.compositor.release(&mut *device);
        self.main_target.release(&mut *device);
        self.parameters.clear();

        self.state = PipelineState::Released;
        crate::engine_info!("lumen3d::RenderingPipeline", "Pipeline released");
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Drop for RenderingPipeline {
    fn drop(&mut self) {
        if self.state != PipelineState::Released {
            if let Err(error) = self.release() {
                crate::engine_warn!("lumen3d::RenderingPipeline", "Release on drop failed: {}", error);
            }
        }
    }
}

#[cfg(test)]
#[path = "rendering_pipeline_tests.rs"]
mod tests;
