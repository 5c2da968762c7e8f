/// GraphicsDevice trait - main GPU factory and submission interface

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    CommandList, Framebuffer, FramebufferDesc, RenderPass, RenderPassDesc, RenderTarget, Texture,
    TextureDesc,
};

/// Graphics device configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Nova3D Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

/// Main graphics device trait
///
/// Central factory interface for creating GPU resources and submitting
/// recorded command lists. Implemented by backend-specific devices
/// (e.g., VulkanGraphicsDevice). All returned objects release their GPU
/// handles when dropped.
pub trait GraphicsDevice: Send + Sync {
    /// Create a texture
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a render target view of one layer + mip level of a texture
    ///
    /// # Errors
    ///
    /// Returns an error if the texture usage is not render-target
    /// compatible, or if `layer` / `mip_level` are out of range.
    fn create_render_target_texture(
        &self,
        texture: &dyn Texture,
        layer: u32,
        mip_level: u32,
    ) -> Result<Arc<dyn RenderTarget>>;

    /// Create a render pass
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    /// Create a framebuffer compatible with a render pass
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Create a command list for recording rendering commands
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Submit recorded command lists to the GPU queue
    fn submit(&self, commands: &[&dyn CommandList]) -> Result<()>;

    /// Wait for all GPU operations to complete
    fn wait_idle(&self) -> Result<()>;
}
