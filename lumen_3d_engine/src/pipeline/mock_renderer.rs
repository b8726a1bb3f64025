/// Recording renderer for tests
///
/// Appends `"<name>"` to a shared journal every time it renders and, when
/// configured with a program label, draws a full-screen pass with no input
/// so the bound attachments receive that label as simulated content.

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{GraphicsDevice, Program, ProgramDesc};
use super::renderer::{RenderContext, Renderer, RendererKind};

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct MockRenderer {
    pub kind: RendererKind,
    pub name: String,
    pub active: bool,
    pub fail: bool,
    pub draw_label: Option<String>,
    pub journal: Journal,
    pub released: Arc<Mutex<bool>>,
    program: Option<Arc<dyn Program>>,
}

impl MockRenderer {
    pub fn new(kind: RendererKind, name: &str, journal: &Journal) -> Self {
        Self {
            kind,
            name: name.to_string(),
            active: true,
            fail: false,
            draw_label: None,
            journal: journal.clone(),
            released: Arc::new(Mutex::new(false)),
            program: None,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Draw a full-screen pass labelled `label` on every render
    pub fn drawing(mut self, label: &str) -> Self {
        self.draw_label = Some(label.to_string());
        self
    }

    pub fn boxed(self) -> Box<dyn Renderer> {
        Box::new(self)
    }
}

impl Renderer for MockRenderer {
    fn kind(&self) -> RendererKind {
        self.kind
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn render(&mut self, ctx: &mut RenderContext) -> Result<()> {
        self.journal.lock().unwrap().push(self.name.clone());
        if self.fail {
            engine_bail!(DeviceResourceError, "lumen3d::MockRenderer", "'{}' failed", self.name);
        }
        if let Some(label) = &self.draw_label {
            if self.program.is_none() {
                self.program = Some(ctx.device.create_program(&ProgramDesc {
                    label: label.clone(),
                    vertex_source: String::new(),
                    fragment_source: String::new(),
                })?);
            }
            if let Some(program) = &self.program {
                ctx.device.draw_fullscreen(program, &[], &[])?;
            }
        }
        Ok(())
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if let Some(program) = self.program.take() {
            device.destroy_program(&program);
        }
        *self.released.lock().unwrap() = true;
        self.journal.lock().unwrap().push(format!("release {}", self.name));
        Ok(())
    }
}
