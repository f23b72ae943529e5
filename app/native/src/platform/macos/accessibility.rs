//! Accessibility trust.

use std::ffi::c_void;

use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;

use crate::platform::PermissionProbe;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXIsProcessTrustedWithOptions(options: *const c_void) -> bool;
}

const K_AX_TRUSTED_CHECK_OPTION_PROMPT: &str = "AXTrustedCheckOptionPrompt";

/// Reads the process's accessibility trust from the TCC database.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessibilityPermission;

impl PermissionProbe for AccessibilityPermission {
    fn is_trusted(&self) -> bool { unsafe { AXIsProcessTrusted() } }

    /// Shows the system prompt when not trusted. A grant made from the
    /// prompt usually takes effect only after the process restarts.
    fn request(&self) -> bool {
        let key = CFString::new(K_AX_TRUSTED_CHECK_OPTION_PROMPT);
        let value = CFBoolean::true_value();
        let pairs = [(key.as_CFType(), value.as_CFType())];
        let options = CFDictionary::from_CFType_pairs(&pairs);

        unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef().cast()) }
    }
}
