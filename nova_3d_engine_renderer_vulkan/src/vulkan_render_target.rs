/// VulkanRenderTarget - Vulkan implementation of the RenderTarget trait

use ash::vk;
use nova_3d_engine::nova3d::render::{RenderTarget, TextureFormat};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan render target implementation
///
/// An image view targeting one layer + mip of a texture. Owns the
/// view (destroyed on drop) but never the underlying image.
pub struct VulkanRenderTarget {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel format
    format: TextureFormat,
    /// Vulkan image view
    pub(crate) image_view: vk::ImageView,
    /// Shared GPU context (for cleanup)
    context: Arc<GpuContext>,
}

impl VulkanRenderTarget {
    pub(crate) fn new(
        width: u32,
        height: u32,
        format: TextureFormat,
        image_view: vk::ImageView,
        context: Arc<GpuContext>,
    ) -> Self {
        Self {
            width,
            height,
            format,
            image_view,
            context,
        }
    }
}

impl RenderTarget for VulkanRenderTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }
}

impl Drop for VulkanRenderTarget {
    fn drop(&mut self) {
        unsafe {
            self.context
                .device
                .destroy_image_view(self.image_view, None);
        }
    }
}
