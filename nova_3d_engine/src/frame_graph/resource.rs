/// Virtual resources - descriptions of GPU resources that may not yet
/// have a backend object
///
/// A virtual resource is created once per logical resource during
/// declaration (`create` / `import`). Transient resources are realized
/// right before their first using pass executes and released right
/// after their last using pass; imported resources wrap an externally
/// owned backend object that the frame graph never creates or destroys.

use std::any::Any;

use crate::error::Result;
use crate::frame_graph::resource_pool::FrameGraphCache;
use crate::frame_graph::ResourceUsage;
use crate::graphics_device::GraphicsDevice;

/// A resource kind the frame graph can virtualize.
///
/// Implementors bridge a descriptor to a concrete backend object,
/// typically through one of the cache's pools.
pub trait GraphResource: Default {
    /// Creation parameters for this resource kind
    type Descriptor: Clone;

    /// Create the backend object. `usage` is the union of all usages
    /// declared by passes touching this resource.
    fn create(
        &mut self,
        desc: &Self::Descriptor,
        usage: ResourceUsage,
        device: &mut dyn GraphicsDevice,
        cache: &mut FrameGraphCache,
    ) -> Result<()>;

    /// Release the backend object (back to its pool)
    fn destroy(&mut self, cache: &mut FrameGraphCache);
}

/// Type-erased virtual resource stored by the frame graph.
///
/// Tracks the liveness window (first/last using pass in declaration
/// order) and the accumulated usage mask. Usage accumulation happens at
/// declaration time, strictly before realization.
pub(crate) trait VirtualResource {
    fn name(&self) -> &str;

    fn is_imported(&self) -> bool;

    fn usage(&self) -> ResourceUsage;

    fn add_usage(&mut self, usage: ResourceUsage);

    /// First pass (declaration order) that reads or writes this resource
    fn first_pass(&self) -> Option<usize>;

    /// Last pass (declaration order) that reads or writes this resource
    fn last_pass(&self) -> Option<usize>;

    /// Extend the liveness window to cover `pass_index`
    fn mark_used_by(&mut self, pass_index: usize);

    /// Create the backend object. No-op for imported resources.
    fn realize(
        &mut self,
        device: &mut dyn GraphicsDevice,
        cache: &mut FrameGraphCache,
    ) -> Result<()>;

    /// Release the backend object. No-op for imported resources.
    fn release(&mut self, cache: &mut FrameGraphCache);

    fn as_any(&self) -> &dyn Any;
}

/// Concrete, typed virtual resource owning the resource instance and
/// its creation descriptor.
pub(crate) struct TransientResource<R: GraphResource> {
    name: String,
    imported: bool,
    usage: ResourceUsage,
    first_pass: Option<usize>,
    last_pass: Option<usize>,
    descriptor: R::Descriptor,
    resource: R,
}

impl<R: GraphResource> TransientResource<R> {
    /// A resource the frame graph will create and destroy itself
    pub(crate) fn new(name: &str, descriptor: R::Descriptor) -> Self {
        Self {
            name: name.to_string(),
            imported: false,
            usage: ResourceUsage::empty(),
            first_pass: None,
            last_pass: None,
            descriptor,
            resource: R::default(),
        }
    }

    /// A pre-existing, externally owned resource
    pub(crate) fn imported(name: &str, resource: R, descriptor: R::Descriptor) -> Self {
        Self {
            name: name.to_string(),
            imported: true,
            usage: ResourceUsage::empty(),
            first_pass: None,
            last_pass: None,
            descriptor,
            resource,
        }
    }

    pub(crate) fn descriptor(&self) -> &R::Descriptor {
        &self.descriptor
    }

    pub(crate) fn resource(&self) -> &R {
        &self.resource
    }
}

impl<R: GraphResource + 'static> VirtualResource for TransientResource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_imported(&self) -> bool {
        self.imported
    }

    fn usage(&self) -> ResourceUsage {
        self.usage
    }

    fn add_usage(&mut self, usage: ResourceUsage) {
        self.usage |= usage;
    }

    fn first_pass(&self) -> Option<usize> {
        self.first_pass
    }

    fn last_pass(&self) -> Option<usize> {
        self.last_pass
    }

    fn mark_used_by(&mut self, pass_index: usize) {
        self.first_pass = Some(match self.first_pass {
            Some(first) => first.min(pass_index),
            None => pass_index,
        });
        self.last_pass = Some(match self.last_pass {
            Some(last) => last.max(pass_index),
            None => pass_index,
        });
    }

    fn realize(
        &mut self,
        device: &mut dyn GraphicsDevice,
        cache: &mut FrameGraphCache,
    ) -> Result<()> {
        if self.imported {
            return Ok(());
        }
        self.resource
            .create(&self.descriptor, self.usage, device, cache)
    }

    fn release(&mut self, cache: &mut FrameGraphCache) {
        if self.imported {
            return;
        }
        self.resource.destroy(cache);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
