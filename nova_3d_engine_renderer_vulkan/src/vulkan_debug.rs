/// Vulkan validation layer support (compiled with the
/// `vulkan-validation` feature)
///
/// Installs a debug messenger that forwards validation messages to the
/// console with colored severity and keeps per-severity counters so
/// tests and shutdown reports can check whether validation fired.

use ash::vk;
use colored::*;
use rustc_hash::FxHashMap;
use std::ffi::CStr;
use std::sync::Mutex;

/// Per-severity counters of validation messages seen so far
#[derive(Debug, Clone, Default)]
pub struct ValidationStats {
    pub counts: FxHashMap<&'static str, u64>,
}

static VALIDATION_STATS: Mutex<Option<ValidationStats>> = Mutex::new(None);

/// Snapshot of the validation message counters
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_default()
}

fn record(severity: &'static str) {
    let mut stats = VALIDATION_STATS.lock().unwrap();
    let stats = stats.get_or_insert_with(ValidationStats::default);
    *stats.counts.entry(severity).or_insert(0) += 1;
}

/// Messenger callback invoked by the validation layers
pub(crate) unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = if callback_data.is_null() || (*callback_data).p_message.is_null() {
        String::from("<no message>")
    } else {
        CStr::from_ptr((*callback_data).p_message)
            .to_string_lossy()
            .into_owned()
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            record("error");
            eprintln!("{} {}", "[vulkan:error]".red().bold(), message);
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            record("warning");
            eprintln!("{} {}", "[vulkan:warning]".yellow(), message);
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
            record("info");
            println!("{} {}", "[vulkan:info]".cyan(), message);
        }
        _ => {
            record("verbose");
        }
    }

    vk::FALSE
}

/// Build the messenger create info used at instance creation
pub(crate) fn messenger_create_info<'a>() -> vk::DebugUtilsMessengerCreateInfoEXT<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
}
