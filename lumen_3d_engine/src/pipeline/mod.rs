//! Rendering pipeline module
//!
//! Stage orchestration, renderer lists and the double-buffered
//! post-processing chain.

mod renderer;
mod renderer_list;
mod rendering_stage;
mod render_target;
mod post_effect;
mod effect_registry;
mod post_processing_stage;
mod screen_compositor;
mod sky_renderer;
mod mesh_renderer;
mod rendering_pipeline;

#[cfg(test)]
pub mod mock_renderer;

pub use renderer::{RenderContext, Renderer, RendererKind};
pub use renderer_list::{ListEntry, RendererList};
pub use rendering_stage::{GeometryRenderingStage, PrepareRenderingStage, RenderingStage, StageRole};
pub use render_target::RenderTarget;
pub use post_effect::{
    FxaaUniforms, GammaUniforms, PostEffect, PostEffectKind, ToneMappingUniforms,
    COPY_FRAGMENT_SOURCE, FULLSCREEN_VERTEX_SOURCE,
};
pub use effect_registry::{EffectProgramKey, EffectRegistry};
pub use post_processing_stage::{PostProcessingPass, PostProcessingRenderingStage, POST_PROCESSING_FORMAT};
pub use screen_compositor::ScreenCompositor;
pub use sky_renderer::{SkyRenderer, SkyUniforms};
pub use mesh_renderer::MeshRenderer;
pub use rendering_pipeline::{
    scaled_size, PipelineState, RenderingPipeline, DEFAULT_GEOMETRY_STAGES,
    MAIN_COLOR_FORMAT, MAIN_DEPTH_FORMAT,
};
