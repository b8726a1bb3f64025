/// Shader program trait and descriptor

/// Descriptor for compiling a program from source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDesc {
    /// Debug label (e.g. "gamma_correction")
    pub label: String,
    /// Vertex stage source
    pub vertex_source: String,
    /// Fragment stage source
    pub fragment_source: String,
}

impl ProgramDesc {
    /// Approximate device footprint of the compiled program
    pub fn source_size(&self) -> u64 {
        (self.vertex_source.len() + self.fragment_source.len()) as u64
    }
}

/// Compiled, linked program on the device
pub trait Program: Send + Sync {
    /// Device-assigned handle
    fn handle(&self) -> u64;

    /// Debug label given at compile time
    fn label(&self) -> &str;

    /// Returns false once the underlying device object is lost
    fn is_valid(&self) -> bool;
}
