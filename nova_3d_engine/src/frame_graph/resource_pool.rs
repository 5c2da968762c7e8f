/// Pooled allocation of backend objects keyed by content hash
///
/// Backend render passes, framebuffers, and textures are expensive to
/// create, so the frame graph never destroys them directly: released
/// objects go back to a free pool and later requests with an identical
/// content hash reuse them, amortizing creation cost across frames.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHasher};

use crate::engine_trace;
use crate::error::Result;
use crate::graphics_device::{
    Framebuffer, FramebufferDesc, GraphicsDevice, RenderPass, RenderPassDesc, RenderTarget,
    Texture, TextureDesc,
};

/// Constructs backend objects for a pool and computes the content hash
/// that decides which requests are fungible.
pub trait PoolFactory {
    /// Creation parameters
    type Info;
    /// The pooled backend object
    type Resource: ?Sized;

    /// Create a new backend object (pool miss)
    fn create(
        &self,
        info: &Self::Info,
        device: &mut dyn GraphicsDevice,
    ) -> Result<Arc<Self::Resource>>;

    /// Structural hash of `info`; equal hashes are treated as fungible
    fn content_hash(&self, info: &Self::Info) -> u64;
}

/// A checked-out pool object. Must be returned with `ResourcePool::free`.
pub struct PoolHandle<R: ?Sized> {
    pub resource: Arc<R>,
    hash: u64,
}

impl<R: ?Sized> Clone for PoolHandle<R> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
            hash: self.hash,
        }
    }
}

struct PoolEntry<R: ?Sized> {
    resource: Arc<R>,
    /// Frame the object was released in. Unused by the current
    /// destroy-every-frame eviction; kept for an age-based policy.
    #[allow(dead_code)]
    frame_index: u64,
}

/// Generic pooling allocator.
///
/// Objects live in exactly one of two pools: "free" (released, waiting
/// for reuse) or "in-use" (checked out). `allocate` reuses a free
/// object with a matching content hash before asking the factory for a
/// new one; `update` advances the frame counter and destroys everything
/// still sitting in the free pool.
pub struct ResourcePool<F: PoolFactory> {
    factory: F,
    frame_index: u64,
    free: FxHashMap<u64, Vec<PoolEntry<F::Resource>>>,
    in_use: FxHashMap<u64, Vec<Arc<F::Resource>>>,
}

impl<F: PoolFactory> ResourcePool<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            frame_index: 0,
            free: FxHashMap::default(),
            in_use: FxHashMap::default(),
        }
    }

    /// Hand out an object for `info`, reusing a pooled one when the
    /// content hash matches. Only a factory failure makes this fail.
    pub fn allocate(
        &mut self,
        info: &F::Info,
        device: &mut dyn GraphicsDevice,
    ) -> Result<PoolHandle<F::Resource>> {
        let hash = self.factory.content_hash(info);

        if let Some(queue) = self.free.get_mut(&hash) {
            if let Some(entry) = queue.pop() {
                self.in_use
                    .entry(hash)
                    .or_default()
                    .push(entry.resource.clone());
                return Ok(PoolHandle {
                    resource: entry.resource,
                    hash,
                });
            }
        }

        let resource = self.factory.create(info, device)?;
        self.in_use.entry(hash).or_default().push(resource.clone());
        Ok(PoolHandle { resource, hash })
    }

    /// Return a checked-out object to the free pool.
    ///
    /// The handle must be in the in-use pool: double frees and handles
    /// from another pool are programmer errors and panic.
    pub fn free(&mut self, handle: PoolHandle<F::Resource>) {
        let queue = self
            .in_use
            .get_mut(&handle.hash)
            .expect("freed a handle with no in-use bucket");
        let position = queue
            .iter()
            .position(|resource| Arc::ptr_eq(resource, &handle.resource))
            .expect("double free or foreign pool handle");
        queue.swap_remove(position);

        self.free.entry(handle.hash).or_default().push(PoolEntry {
            resource: handle.resource,
            frame_index: self.frame_index,
        });
    }

    /// Advance the frame counter and destroy every object that was not
    /// reclaimed since the previous `update`. Conservative by design:
    /// nothing pooled survives a frame without reuse.
    pub fn update(&mut self) {
        self.frame_index += 1;
        let evicted: usize = self.free.values().map(Vec::len).sum();
        for queue in self.free.values_mut() {
            // Dropping the Arcs destroys the backend objects
            queue.clear();
        }
        if evicted > 0 {
            engine_trace!(
                "nova3d::ResourcePool",
                "evicted {} unused pooled object(s) at frame {}",
                evicted,
                self.frame_index
            );
        }
    }

    /// Number of objects currently waiting in the free pool
    pub fn free_object_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Number of objects currently checked out
    pub fn in_use_object_count(&self) -> usize {
        self.in_use.values().map(Vec::len).sum()
    }

    /// Current frame counter
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

// ============================================================================
// Factories
// ============================================================================

fn structural_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

fn ptr_hash<T: ?Sized>(hasher: &mut FxHasher, arc: &Arc<T>) {
    (Arc::as_ptr(arc) as *const () as usize).hash(hasher);
}

/// Factory for pooled backend textures
pub struct TextureFactory;

impl PoolFactory for TextureFactory {
    type Info = TextureDesc;
    type Resource = dyn Texture;

    fn create(
        &self,
        info: &TextureDesc,
        device: &mut dyn GraphicsDevice,
    ) -> Result<Arc<dyn Texture>> {
        device.create_texture(info.clone())
    }

    fn content_hash(&self, info: &TextureDesc) -> u64 {
        structural_hash(info)
    }
}

/// Factory for pooled backend render passes
pub struct RenderPassFactory;

impl PoolFactory for RenderPassFactory {
    type Info = RenderPassDesc;
    type Resource = dyn RenderPass;

    fn create(
        &self,
        info: &RenderPassDesc,
        device: &mut dyn GraphicsDevice,
    ) -> Result<Arc<dyn RenderPass>> {
        device.create_render_pass(info)
    }

    fn content_hash(&self, info: &RenderPassDesc) -> u64 {
        structural_hash(info)
    }
}

/// Creation key for pooled framebuffers.
///
/// Keyed on the attachment textures (not the per-use render target
/// views), so a framebuffer is reused whenever the same pooled
/// textures come back with a compatible render pass.
#[derive(Clone)]
pub struct FramebufferKey {
    pub render_pass: Arc<dyn RenderPass>,
    pub attachments: Vec<Arc<dyn Texture>>,
    pub width: u32,
    pub height: u32,
}

/// Factory for pooled backend framebuffers
pub struct FramebufferFactory;

impl PoolFactory for FramebufferFactory {
    type Info = FramebufferKey;
    type Resource = dyn Framebuffer;

    fn create(
        &self,
        info: &FramebufferKey,
        device: &mut dyn GraphicsDevice,
    ) -> Result<Arc<dyn Framebuffer>> {
        let mut color_attachments: Vec<Arc<dyn RenderTarget>> = Vec::new();
        let mut depth_stencil_attachment = None;

        for texture in &info.attachments {
            let target = device.create_render_target_texture(texture.as_ref(), 0, 0)?;
            if texture.info().format.is_depth() {
                depth_stencil_attachment = Some(target);
            } else {
                color_attachments.push(target);
            }
        }

        device.create_framebuffer(&FramebufferDesc {
            render_pass: info.render_pass.clone(),
            color_attachments,
            depth_stencil_attachment,
            width: info.width,
            height: info.height,
        })
    }

    fn content_hash(&self, info: &FramebufferKey) -> u64 {
        let mut hasher = FxHasher::default();
        ptr_hash(&mut hasher, &info.render_pass);
        for texture in &info.attachments {
            ptr_hash(&mut hasher, texture);
        }
        info.width.hash(&mut hasher);
        info.height.hash(&mut hasher);
        hasher.finish()
    }
}

// ============================================================================
// FrameGraphCache
// ============================================================================

/// Per-device aggregate of the frame graph's backend object pools.
///
/// Created alongside a graphics device and shared by every frame graph
/// built for it — the pools outlive any single frame graph, which is
/// what makes cross-frame reuse possible. Not thread-safe by itself;
/// confine access to the render thread (or wrap in a mutex, as the
/// frame graph constructor expects).
pub struct FrameGraphCache {
    pub(crate) textures: ResourcePool<TextureFactory>,
    pub(crate) render_passes: ResourcePool<RenderPassFactory>,
    pub(crate) framebuffers: ResourcePool<FramebufferFactory>,
}

impl FrameGraphCache {
    pub fn new() -> Self {
        Self {
            textures: ResourcePool::new(TextureFactory),
            render_passes: ResourcePool::new(RenderPassFactory),
            framebuffers: ResourcePool::new(FramebufferFactory),
        }
    }

    /// Advance all pools by one frame, evicting unreused objects.
    /// Call once per rendered frame, after the frame graph executed.
    pub fn update(&mut self) {
        self.textures.update();
        self.render_passes.update();
        self.framebuffers.update();
    }

    /// Objects waiting for reuse across all pools
    pub fn free_object_count(&self) -> usize {
        self.textures.free_object_count()
            + self.render_passes.free_object_count()
            + self.framebuffers.free_object_count()
    }

    /// Objects currently checked out across all pools
    pub fn in_use_object_count(&self) -> usize {
        self.textures.in_use_object_count()
            + self.render_passes.in_use_object_count()
            + self.framebuffers.in_use_object_count()
    }
}

impl Default for FrameGraphCache {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "resource_pool_tests.rs"]
mod tests;
