/// Graphics device module - abstract device binding types and traits

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod buffer;
pub mod program;
pub mod frame_buffer;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use buffer::*;
pub use program::*;
pub use frame_buffer::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
