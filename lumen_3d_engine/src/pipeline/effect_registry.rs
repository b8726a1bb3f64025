/// Registry of compiled full-screen programs.
///
/// Holds at most one program per label in a SlotMap arena. A program is
/// compiled on first use and rebuilt when the device reports it invalid.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, Program, ProgramDesc};
use super::post_effect::{PostEffect, FULLSCREEN_VERTEX_SOURCE};

new_key_type! {
    /// Stable key of a compiled program in an `EffectRegistry`
    pub struct EffectProgramKey;
}

#[derive(Default)]
pub struct EffectRegistry {
    programs: SlotMap<EffectProgramKey, Arc<dyn Program>>,
    by_label: FxHashMap<&'static str, EffectProgramKey>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program for `label`, compiling it if absent or no longer valid
    pub fn program(
        &mut self,
        device: &mut dyn GraphicsDevice,
        label: &'static str,
        fragment_source: &str,
    ) -> Result<Arc<dyn Program>> {
        if let Some(key) = self.by_label.get(label).copied() {
            match self.programs.get(key) {
                Some(program) if program.is_valid() => return Ok(program.clone()),
                _ => {
                    if let Some(lost) = self.programs.remove(key) {
                        device.destroy_program(&lost);
                    }
                    self.by_label.remove(label);
                    crate::engine_warn!("lumen3d::EffectRegistry",
                        "Program '{}' is no longer valid, rebuilding", label);
                }
            }
        }

        let program = device.create_program(&ProgramDesc {
            label: label.to_string(),
            vertex_source: FULLSCREEN_VERTEX_SOURCE.to_string(),
            fragment_source: fragment_source.to_string(),
        })?;
        let key = self.programs.insert(program.clone());
        self.by_label.insert(label, key);
        crate::engine_debug!("lumen3d::EffectRegistry", "Compiled program '{}'", label);
        Ok(program)
    }

    /// Program of a post-processing effect
    pub fn effect_program(
        &mut self,
        device: &mut dyn GraphicsDevice,
        effect: &PostEffect,
    ) -> Result<Arc<dyn Program>> {
        self.program(device, effect.label(), effect.fragment_source())
    }

    pub fn key(&self, label: &str) -> Option<EffectProgramKey> {
        self.by_label.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Destroy every program
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        for (_, program) in self.programs.drain() {
            device.destroy_program(&program);
        }
        self.by_label.clear();
    }
}

#[cfg(test)]
#[path = "effect_registry_tests.rs"]
mod tests;
