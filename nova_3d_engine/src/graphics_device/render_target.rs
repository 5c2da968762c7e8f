/// RenderTarget trait - a renderable view of one layer + mip of a texture

use crate::graphics_device::TextureFormat;

/// Render target trait
///
/// Represents a surface a render pass can render into. Created from a
/// texture via `GraphicsDevice::create_render_target_texture()` and
/// grouped into framebuffers.
pub trait RenderTarget: Send + Sync {
    /// Get the width of the render target in pixels
    fn width(&self) -> u32;

    /// Get the height of the render target in pixels
    fn height(&self) -> u32;

    /// Get the pixel format of the render target
    fn format(&self) -> TextureFormat;
}
