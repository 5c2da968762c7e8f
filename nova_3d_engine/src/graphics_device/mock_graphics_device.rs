/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Tracks every factory invocation and every recorded command so frame
/// graph tests can assert creation counts, pooled reuse, and the exact
/// interleaving of resource realization and pass execution.

#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use crate::error::Result;
#[cfg(test)]
use crate::graphics_device::{
    ClearValue, CommandList, Config, Framebuffer, FramebufferDesc, GraphicsDevice, Rect2D,
    RenderPass, RenderPassDesc, RenderTarget, Texture, TextureDesc, TextureInfo, TextureUsage,
    Viewport,
};
#[cfg(test)]
use crate::engine_bail;

/// Shared, ordered log of everything the mock device and its command
/// lists did. Tests interleave their own markers with device events.
#[cfg(test)]
pub type EventLog = Arc<Mutex<Vec<String>>>;

#[cfg(test)]
pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

// ============================================================================
// Mock Texture
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub name: String,
}

#[cfg(test)]
impl MockTexture {
    pub fn new(desc: &TextureDesc, name: String) -> Self {
        Self {
            info: TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage: desc.usage,
                array_layers: desc.array_layers,
                mip_levels: desc.mip_levels,
                sample_count: desc.sample_count,
            },
            name,
        }
    }
}

#[cfg(test)]
impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Mock RenderTarget
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockRenderTarget {
    pub width: u32,
    pub height: u32,
    pub format: crate::graphics_device::TextureFormat,
}

#[cfg(test)]
impl RenderTarget for MockRenderTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> crate::graphics_device::TextureFormat {
        self.format
    }
}

// ============================================================================
// Mock RenderPass
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockRenderPass {
    pub desc: RenderPassDesc,
}

#[cfg(test)]
impl RenderPass for MockRenderPass {}

// ============================================================================
// Mock Framebuffer
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockFramebuffer {
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
impl Framebuffer for MockFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockCommandList {
    pub commands: Vec<String>,
    events: Option<EventLog>,
}

#[cfg(test)]
impl MockCommandList {
    pub fn new(events: Option<EventLog>) -> Self {
        Self {
            commands: Vec::new(),
            events,
        }
    }

    fn record(&mut self, command: &str) {
        self.commands.push(command.to_string());
        if let Some(events) = &self.events {
            events.lock().unwrap().push(command.to_string());
        }
    }
}

#[cfg(test)]
impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.record("begin");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.record("end");
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        _render_pass: &Arc<dyn RenderPass>,
        _framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        self.record(&format!("begin_render_pass[{}]", clear_values.len()));
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.record("end_render_pass");
        Ok(())
    }

    fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
        self.record("set_viewport");
        Ok(())
    }

    fn set_scissor(&mut self, _scissor: Rect2D) -> Result<()> {
        self.record("set_scissor");
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.record(&format!("draw({},{})", vertex_count, first_vertex));
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock GraphicsDevice that tracks created resources without a GPU
#[cfg(test)]
#[derive(Debug)]
pub struct MockGraphicsDevice {
    /// Names of created textures (one entry per factory invocation)
    pub created_textures: Arc<Mutex<Vec<String>>>,
    /// One entry per created render pass
    pub created_render_passes: Arc<Mutex<Vec<String>>>,
    /// One entry per created framebuffer
    pub created_framebuffers: Arc<Mutex<Vec<String>>>,
    /// Ordered event log shared with command lists (optional)
    events: Option<EventLog>,
}

#[cfg(test)]
impl MockGraphicsDevice {
    /// Create a new mock device
    pub fn new() -> Self {
        Self {
            created_textures: Arc::new(Mutex::new(Vec::new())),
            created_render_passes: Arc::new(Mutex::new(Vec::new())),
            created_framebuffers: Arc::new(Mutex::new(Vec::new())),
            events: None,
        }
    }

    /// Create a mock device that also pushes every factory call and
    /// recorded command into a shared, ordered event log
    pub fn with_event_log(events: EventLog) -> Self {
        let mut device = Self::new();
        device.events = Some(events);
        device
    }

    /// Ignored by the mock, kept for signature parity with real backends
    #[allow(dead_code)]
    pub fn config() -> Config {
        Config::default()
    }

    pub fn texture_count(&self) -> usize {
        self.created_textures.lock().unwrap().len()
    }

    pub fn render_pass_count(&self) -> usize {
        self.created_render_passes.lock().unwrap().len()
    }

    pub fn framebuffer_count(&self) -> usize {
        self.created_framebuffers.lock().unwrap().len()
    }

    fn push_event(&self, event: String) {
        if let Some(events) = &self.events {
            events.lock().unwrap().push(event);
        }
    }
}

#[cfg(test)]
impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        let name = format!("texture_{}x{}_{:?}", desc.width, desc.height, desc.format);
        self.created_textures.lock().unwrap().push(name.clone());
        self.push_event(format!("create_texture:{}x{}", desc.width, desc.height));
        Ok(Arc::new(MockTexture::new(&desc, name)))
    }

    fn create_render_target_texture(
        &self,
        texture: &dyn Texture,
        layer: u32,
        mip_level: u32,
    ) -> Result<Arc<dyn RenderTarget>> {
        let info = texture.info();
        match info.usage {
            TextureUsage::RenderTarget
            | TextureUsage::SampledAndRenderTarget
            | TextureUsage::DepthStencil => {}
            _ => {
                engine_bail!(
                    "nova3d::mock",
                    "create_render_target_texture: incompatible texture usage {:?}",
                    info.usage
                );
            }
        }
        if layer >= info.array_layers {
            engine_bail!(
                "nova3d::mock",
                "create_render_target_texture: layer {} out of range (array_layers = {})",
                layer,
                info.array_layers
            );
        }
        if mip_level >= info.mip_levels {
            engine_bail!(
                "nova3d::mock",
                "create_render_target_texture: mip_level {} out of range (mip_levels = {})",
                mip_level,
                info.mip_levels
            );
        }
        let w = (info.width >> mip_level).max(1);
        let h = (info.height >> mip_level).max(1);
        Ok(Arc::new(MockRenderTarget {
            width: w,
            height: h,
            format: info.format,
        }))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        let name = format!(
            "render_pass_c{}_d{}",
            desc.color_attachments.len(),
            desc.depth_stencil_attachment.is_some() as u32
        );
        self.created_render_passes.lock().unwrap().push(name);
        self.push_event("create_render_pass".to_string());
        Ok(Arc::new(MockRenderPass { desc: desc.clone() }))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        let name = format!("framebuffer_{}x{}", desc.width, desc.height);
        self.created_framebuffers.lock().unwrap().push(name);
        self.push_event("create_framebuffer".to_string());
        Ok(Arc::new(MockFramebuffer {
            width: desc.width,
            height: desc.height,
        }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList::new(self.events.clone())))
    }

    fn submit(&self, _commands: &[&dyn CommandList]) -> Result<()> {
        self.push_event("submit".to_string());
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
