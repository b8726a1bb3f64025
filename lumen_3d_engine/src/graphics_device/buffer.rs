/// Buffer trait and buffer descriptor

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex buffer
    Vertex,
    /// Index buffer
    Index,
    /// Uniform/constant buffer
    Uniform,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
    /// Optional initial contents (must be `size` bytes long)
    pub data: Option<Vec<u8>>,
}

/// Device buffer handle
pub trait Buffer: Send + Sync {
    /// Device-assigned handle
    fn handle(&self) -> u64;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Buffer usage
    fn usage(&self) -> BufferUsage;
}
