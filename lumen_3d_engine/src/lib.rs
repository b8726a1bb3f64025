/*!
# Lumen 3D Engine

Resource lifecycle and frame composition core of the Lumen 3D rendering engine.

The crate sits above an abstract graphics device: it never issues native API
calls itself, it drives a `GraphicsDevice` implementation supplied by the
application.

## Architecture

- **ResourceManager**: deduplicating cache of textures, meshes and shader
  programs, moving static resources between disk, host and device memory
- **InvalidatableContainer**: dependents notified when derived data goes stale
- **ParameterContainer**: typed, hook-bearing slots publishing render state
- **RenderingPipeline**: Prepare, Geometry, Sky, PostProcessing and screen
  composite stages executed in a fixed order every frame
- **PostProcessingRenderingStage**: ping-pong chain of full-screen effects
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod graphics_device;
pub mod invalidation;
pub mod parameter;
pub mod resource;
pub mod scene;
pub mod pipeline;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Configuration sub-module
    pub mod config {
        pub use crate::config::*;
    }

    // Render sub-module with the graphics device binding
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Invalidation sub-module
    pub mod invalidation {
        pub use crate::invalidation::*;
    }

    // Parameter sub-module
    pub mod parameter {
        pub use crate::parameter::*;
    }

    // Pipeline sub-module
    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
