/// Frame graph texture - bridges a virtual texture to a pooled (or
/// imported) backend texture

use std::sync::Arc;

use crate::error::Result;
use crate::frame_graph::resource_pool::{FrameGraphCache, PoolHandle};
use crate::frame_graph::{GraphResource, ResourceUsage};
use crate::graphics_device::{GraphicsDevice, Texture, TextureDesc, TextureFormat, TextureUsage};

/// Creation parameters for a frame graph texture
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FgTextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub sample_count: u32,
    pub mip_levels: u32,
    pub array_layers: u32,
}

impl Default for FgTextureDesc {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            format: TextureFormat::R8G8B8A8_UNORM,
            sample_count: 1,
            mip_levels: 1,
            array_layers: 1,
        }
    }
}

/// A texture owned (or referenced) by the frame graph.
///
/// Transient form: backed by the cache's texture pool between
/// `create` and `destroy`. Imported form: wraps an externally owned
/// backend texture and never touches the pool.
#[derive(Default)]
pub struct FgTexture {
    imported: Option<Arc<dyn Texture>>,
    pooled: Option<PoolHandle<dyn Texture>>,
}

impl FgTexture {
    /// Wrap an externally owned backend texture (e.g. the swapchain's
    /// current image)
    pub fn from_imported(texture: Arc<dyn Texture>) -> Self {
        Self {
            imported: Some(texture),
            pooled: None,
        }
    }

    /// The backend texture, if imported or currently realized
    pub fn backend_texture(&self) -> Option<&Arc<dyn Texture>> {
        self.imported
            .as_ref()
            .or_else(|| self.pooled.as_ref().map(|handle| &handle.resource))
    }

    /// Map accumulated frame graph usage onto backend creation flags
    fn texture_usage(usage: ResourceUsage) -> TextureUsage {
        if usage.contains(ResourceUsage::DEPTH_STENCIL_ATTACHMENT) {
            TextureUsage::DepthStencil
        } else if usage.contains(ResourceUsage::COLOR_ATTACHMENT)
            && usage.contains(ResourceUsage::SAMPLED)
        {
            TextureUsage::SampledAndRenderTarget
        } else if usage.contains(ResourceUsage::COLOR_ATTACHMENT)
            || usage.contains(ResourceUsage::PRESENT)
        {
            TextureUsage::RenderTarget
        } else {
            TextureUsage::Sampled
        }
    }
}

impl GraphResource for FgTexture {
    type Descriptor = FgTextureDesc;

    fn create(
        &mut self,
        desc: &FgTextureDesc,
        usage: ResourceUsage,
        device: &mut dyn GraphicsDevice,
        cache: &mut FrameGraphCache,
    ) -> Result<()> {
        debug_assert!(self.imported.is_none(), "imported texture must not be created");
        debug_assert!(self.pooled.is_none(), "texture realized twice");

        let texture_desc = TextureDesc {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            usage: Self::texture_usage(usage),
            array_layers: desc.array_layers,
            mip_levels: desc.mip_levels,
            sample_count: desc.sample_count,
        };
        self.pooled = Some(cache.textures.allocate(&texture_desc, device)?);
        Ok(())
    }

    fn destroy(&mut self, cache: &mut FrameGraphCache) {
        if let Some(handle) = self.pooled.take() {
            cache.textures.free(handle);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "fg_texture_tests.rs"]
mod tests;
