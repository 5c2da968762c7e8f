/// VulkanRenderPass - Vulkan implementation of the RenderPass trait

use ash::vk;
use nova_3d_engine::nova3d::render::RenderPass;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan render pass implementation
///
/// Simple wrapper around vk::RenderPass, destroyed when dropped.
pub struct VulkanRenderPass {
    /// Vulkan render pass handle
    pub(crate) render_pass: vk::RenderPass,
    /// Shared GPU context (for cleanup)
    pub(crate) context: Arc<GpuContext>,
}

impl RenderPass for VulkanRenderPass {}

impl Drop for VulkanRenderPass {
    fn drop(&mut self) {
        unsafe {
            self.context
                .device
                .destroy_render_pass(self.render_pass, None);
        }
    }
}
