//! Engine configuration
//!
//! Plain-data configuration for the rendering pipeline and the resource
//! cache. Values are validated when applied; invalid values are rejected
//! with `Error::ConfigurationError` and the previous state is kept.

use crate::error::Result;
use crate::engine_bail;

/// Default display gamma
pub const DEFAULT_GAMMA: f32 = 2.2;

/// Default multisample level of the main framebuffer
pub const DEFAULT_MSAA_LEVEL: u32 = 2;

/// Rendering pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Internal render size = client size x rendering scale (must be > 0)
    pub rendering_scale: f32,
    /// Gamma used by gamma correction (must be >= 1)
    pub gamma: f32,
    /// Multisample level of the main framebuffer (must be >= 1)
    pub msaa_level: u32,
    /// Draw geometry as wireframe
    pub wireframe: bool,
    /// Clear color of the main framebuffer (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rendering_scale: 1.0,
            gamma: DEFAULT_GAMMA,
            msaa_level: DEFAULT_MSAA_LEVEL,
            wireframe: false,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl PipelineConfig {
    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<()> {
        validate_rendering_scale(self.rendering_scale)?;
        validate_gamma(self.gamma)?;
        validate_msaa_level(self.msaa_level)?;
        Ok(())
    }
}

pub(crate) fn validate_rendering_scale(scale: f32) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        engine_bail!(ConfigurationError, "lumen3d::Config",
            "Rendering scale must be a positive number, got {}", scale);
    }
    Ok(())
}

pub(crate) fn validate_gamma(gamma: f32) -> Result<()> {
    if !gamma.is_finite() || gamma < 1.0 {
        engine_bail!(ConfigurationError, "lumen3d::Config",
            "Gamma must be >= 1, got {}", gamma);
    }
    Ok(())
}

pub(crate) fn validate_msaa_level(level: u32) -> Result<()> {
    if level < 1 {
        engine_bail!(ConfigurationError, "lumen3d::Config",
            "MSAA level must be >= 1, got {}", level);
    }
    Ok(())
}

/// Memory budget driving resource eviction
///
/// `None` means unlimited for that tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryBudget {
    /// Maximum bytes of static resources resident in device memory
    pub device_bytes: Option<u64>,
    /// Maximum bytes of static resources resident in host memory
    pub host_bytes: Option<u64>,
}

impl MemoryBudget {
    /// Budget without any limit
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Returns true if `used` device bytes exceed the device budget
    pub fn device_exceeded(&self, used: u64) -> bool {
        self.device_bytes.is_some_and(|limit| used > limit)
    }

    /// Returns true if `used` host bytes exceed the host budget
    pub fn host_exceeded(&self, used: u64) -> bool {
        self.host_bytes.is_some_and(|limit| used > limit)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
