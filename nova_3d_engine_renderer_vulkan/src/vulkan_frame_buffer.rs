/// VulkanFramebuffer - Vulkan implementation of the Framebuffer trait

use ash::vk;
use nova_3d_engine::nova3d::render::Framebuffer;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan framebuffer implementation
///
/// Wraps a VkFramebuffer grouping color and depth/stencil attachments.
/// Destroyed when dropped.
pub struct VulkanFramebuffer {
    /// Vulkan framebuffer handle
    pub(crate) framebuffer: vk::Framebuffer,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Shared GPU context (for cleanup)
    context: Arc<GpuContext>,
}

impl VulkanFramebuffer {
    pub(crate) fn new(
        framebuffer: vk::Framebuffer,
        width: u32,
        height: u32,
        context: Arc<GpuContext>,
    ) -> Self {
        Self {
            framebuffer,
            width,
            height,
            context,
        }
    }
}

impl Framebuffer for VulkanFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for VulkanFramebuffer {
    fn drop(&mut self) {
        unsafe {
            self.context
                .device
                .destroy_framebuffer(self.framebuffer, None);
        }
    }
}
