//! Active display enumeration through CoreGraphics.

use core_foundation::base::TCFType;
use core_foundation::string::CFString;
use core_foundation_sys::base::{CFRelease, kCFAllocatorDefault};
use core_foundation_sys::uuid::{CFUUIDCreateString, CFUUIDRef};
use core_graphics::display::CGDisplay;

use crate::display::RawDisplay;
use crate::geometry::Rect;
use crate::platform::DisplayBackend;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn CGDisplayCreateUUIDFromDisplayID(display: u32) -> CFUUIDRef;
}

/// Value CoreGraphics reports when an EDID field cannot be read (`'unkn'`).
const K_DISPLAY_VALUE_UNKNOWN: u32 = 0x756E_6B6E;

/// Displays as reported by `CGGetActiveDisplayList`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreGraphicsDisplays;

impl DisplayBackend for CoreGraphicsDisplays {
    fn active_displays(&self) -> Vec<RawDisplay> {
        let ids = CGDisplay::active_displays().unwrap_or_else(|err| {
            tracing::warn!(error = err, "CGGetActiveDisplayList failed, using main display");
            vec![CGDisplay::main().id]
        });

        ids.into_iter().map(|id| describe(CGDisplay::new(id))).collect()
    }
}

fn describe(display: CGDisplay) -> RawDisplay {
    let bounds = display.bounds();
    RawDisplay {
        handle: display.id,
        bounds: Rect::new(bounds.origin.x, bounds.origin.y, bounds.size.width, bounds.size.height),
        is_primary: display.is_main(),
        is_builtin: display.is_builtin(),
        uuid: display_uuid(display.id),
        serial: known(display.serial_number()),
        vendor: known(display.vendor_number()),
        model: known(display.model_number()),
    }
}

const fn known(value: u32) -> Option<u32> {
    match value {
        0 | K_DISPLAY_VALUE_UNKNOWN | u32::MAX => None,
        value => Some(value),
    }
}

fn display_uuid(id: u32) -> Option<String> {
    unsafe {
        let uuid = CGDisplayCreateUUIDFromDisplayID(id);
        if uuid.is_null() {
            return None;
        }

        let string = CFUUIDCreateString(kCFAllocatorDefault, uuid);
        CFRelease(uuid.cast());
        if string.is_null() {
            return None;
        }

        Some(CFString::wrap_under_create_rule(string).to_string())
    }
}
