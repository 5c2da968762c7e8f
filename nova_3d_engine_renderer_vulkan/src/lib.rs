/*!
# Nova 3D Engine - Vulkan Renderer Backend

Vulkan implementation of the Nova 3D rendering engine.

This crate provides a Vulkan backend that implements the nova_3d_engine
`graphics_device` traits using the Ash library for Vulkan bindings and
gpu-allocator for memory management.

The device can be created headless (no window/surface), which is how
the frame graph test suite and offscreen rendering paths use it.
*/

// Vulkan implementation modules
mod vulkan;
mod vulkan_command_list;
mod vulkan_context;
mod vulkan_format;
mod vulkan_frame_buffer;
mod vulkan_render_pass;
mod vulkan_render_target;
mod vulkan_texture;

#[cfg(feature = "vulkan-validation")]
mod vulkan_debug;

pub use vulkan::VulkanGraphicsDevice;
pub use vulkan_command_list::VulkanCommandList;
pub use vulkan_texture::VulkanTexture;

#[cfg(feature = "vulkan-validation")]
pub use vulkan_debug::{get_validation_stats, ValidationStats};

// Namespace module mirroring the engine crate layout
pub mod nova3d {
    pub use crate::vulkan::VulkanGraphicsDevice;
}
