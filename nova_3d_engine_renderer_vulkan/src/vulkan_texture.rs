/// VulkanTexture - Vulkan implementation of the Texture trait

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use nova_3d_engine::nova3d::render::{Texture, TextureInfo};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan texture implementation
///
/// Owns the image, its default view, and its memory allocation; all
/// are released when the texture is dropped.
pub struct VulkanTexture {
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// Default full-resource image view
    pub(crate) view: vk::ImageView,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Shared GPU context (for cleanup)
    pub(crate) context: Arc<GpuContext>,
    /// Read-only texture properties
    pub(crate) info: TextureInfo,
}

impl Texture for VulkanTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        unsafe {
            self.context.device.destroy_image_view(self.view, None);

            if let Some(allocation) = self.allocation.take() {
                self.context.allocator.lock().unwrap().free(allocation).ok();
            }

            self.context.device.destroy_image(self.image, None);
        }
    }
}
