/// Graphics device module - the narrow GPU backend surface
///
/// The engine consumes the GPU through these traits only: object
/// creation (textures, render passes, framebuffers, command lists)
/// and command submission. Backend implementations (Vulkan, ...)
/// live in separate crates and implement these traits.

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod render_target;
pub mod render_pass;
pub mod frame_buffer;
pub mod command_list;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use render_target::*;
pub use render_pass::*;
pub use frame_buffer::*;
pub use command_list::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
