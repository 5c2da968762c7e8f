/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Shared (via `Arc`) by the device and every resource it creates, so
/// the logical device outlives all objects that still need it for
/// cleanup. The last dropped reference tears everything down in order:
/// allocator, then device, then instance.

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::Mutex;

pub(crate) struct GpuContext {
    /// Vulkan entry point (kept alive for the instance)
    #[allow(dead_code)]
    pub(crate) entry: ash::Entry,

    /// Vulkan instance
    pub(crate) instance: ash::Instance,

    /// Vulkan logical device
    pub(crate) device: ash::Device,

    /// GPU memory allocator. ManuallyDrop so it can be freed in
    /// `drop()` while the device is still alive.
    pub(crate) allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Graphics queue for command submission
    pub(crate) graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub(crate) graphics_queue_family: u32,

    /// Debug utils loader (validation builds only)
    #[cfg(feature = "vulkan-validation")]
    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    /// Debug messenger handle (validation builds only)
    #[cfg(feature = "vulkan-validation")]
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            // The allocator must release its memory blocks before the
            // device goes away
            ManuallyDrop::drop(&mut self.allocator);

            #[cfg(feature = "vulkan-validation")]
            if let (Some(loader), Some(messenger)) =
                (self.debug_utils_loader.as_ref(), self.debug_messenger)
            {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
