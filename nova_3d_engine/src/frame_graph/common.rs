/// Shared frame graph types: usage flags, pass types, execute context

use std::sync::Arc;

use bitflags::bitflags;

use crate::graphics_device::{CommandList, RenderPass};

bitflags! {
    /// How a resource is accessed by a pass.
    ///
    /// Accumulated (bitwise-or) across every pass that touches the
    /// resource; the union drives the backend creation flags when the
    /// resource is realized.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceUsage: u8 {
        const COLOR_ATTACHMENT = 0x01;
        const DEPTH_STENCIL_ATTACHMENT = 0x02;
        const SAMPLED = 0x04;
        const PRESENT = 0x20;
    }
}

bitflags! {
    /// Attachment selection mask for clear operations
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttachmentFlags: u32 {
        const COLOR0 = 0x0000_0001;
        const COLOR1 = 0x0000_0002;
        const COLOR2 = 0x0000_0004;
        const COLOR3 = 0x0000_0008;
        const COLOR4 = 0x0000_0010;
        const COLOR5 = 0x0000_0020;
        const COLOR6 = 0x0000_0040;
        const COLOR7 = 0x0000_0080;
        const COLOR_ALL = 0x0000_00ff;
        const DEPTH_STENCIL = 0x0000_0100;
        const ALL = 0x0000_01ff;
    }
}

impl AttachmentFlags {
    /// Flag for color attachment slot `index` (0..8)
    pub fn color(index: usize) -> AttachmentFlags {
        debug_assert!(index < 8, "color attachment index out of range: {}", index);
        AttachmentFlags::from_bits_truncate(1 << index)
    }
}

/// Kind of work a pass performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassType {
    Graphics,
    Compute,
}

/// Platform execution context handed to each pass's execute callback.
///
/// Supplies the command list to record into and, for graphics passes,
/// the backend render pass that is currently begun.
pub struct PassExecuteContext<'a> {
    /// Command list bound for this frame graph
    pub command_list: &'a mut dyn CommandList,
    /// Backend render pass (graphics passes with attachments only)
    pub render_pass: Option<&'a Arc<dyn RenderPass>>,
}
