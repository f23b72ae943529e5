//! Dock orientation and on-screen frame.

use std::ffi::c_void;

use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::TCFType;
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::number::CFNumber;
use core_foundation::string::CFString;
use core_foundation_sys::base::{CFGetTypeID, CFRelease};
use core_foundation_sys::dictionary::CFDictionaryGetValue;
use core_foundation_sys::preferences::CFPreferencesCopyAppValue;
use core_foundation_sys::string::CFStringGetTypeID;
use core_graphics::geometry::{CGPoint, CGRect, CGSize};

use crate::geometry::Rect;
use crate::platform::DockProbe;
use crate::zone::DockEdge;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGWindowListCopyWindowInfo(option: u32, relative_to_window: u32) -> CFArrayRef;
    fn CGRectMakeWithDictionaryRepresentation(dict: CFDictionaryRef, rect: *mut CGRect) -> bool;
}

const K_CG_WINDOW_LIST_OPTION_ON_SCREEN_ONLY: u32 = 1 << 0;
const K_CG_NULL_WINDOW_ID: u32 = 0;
/// `kCGDockWindowLevel`.
const K_CG_DOCK_WINDOW_LEVEL: i32 = 20;

const DOCK_DOMAIN: &str = "com.apple.dock";
const DOCK_OWNER: &str = "Dock";

/// Reads the Dock from user defaults and the window server.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowServerDock;

impl DockProbe for WindowServerDock {
    fn orientation(&self) -> DockEdge { DockEdge::from_orientation(read_orientation().as_deref()) }

    fn dock_frame(&self) -> Option<Rect> {
        let frame = find_dock_window();
        if frame.is_none() {
            tracing::debug!("Dock window not found in on-screen window list");
        }
        frame
    }
}

fn read_orientation() -> Option<String> {
    let key = CFString::from_static_string("orientation");
    let domain = CFString::from_static_string(DOCK_DOMAIN);

    unsafe {
        let value = CFPreferencesCopyAppValue(key.as_concrete_TypeRef(), domain.as_concrete_TypeRef());
        if value.is_null() {
            return None;
        }
        if CFGetTypeID(value) != CFStringGetTypeID() {
            CFRelease(value);
            return None;
        }
        Some(CFString::wrap_under_create_rule(value.cast()).to_string())
    }
}

/// The largest on-screen window owned by the Dock at the Dock level.
fn find_dock_window() -> Option<Rect> {
    let windows = unsafe {
        let list = CGWindowListCopyWindowInfo(K_CG_WINDOW_LIST_OPTION_ON_SCREEN_ONLY, K_CG_NULL_WINDOW_ID);
        if list.is_null() {
            return None;
        }
        CFArray::<CFDictionary>::wrap_under_create_rule(list)
    };

    let owner_key = CFString::from_static_string("kCGWindowOwnerName");
    let layer_key = CFString::from_static_string("kCGWindowLayer");
    let bounds_key = CFString::from_static_string("kCGWindowBounds");

    windows
        .iter()
        .filter_map(|info| {
            let dict = info.as_concrete_TypeRef();
            let owner = lookup(dict, &owner_key)?;
            let owner = unsafe { CFString::wrap_under_get_rule(owner.cast()) };
            if owner.to_string() != DOCK_OWNER {
                return None;
            }

            let layer = lookup(dict, &layer_key)?;
            let layer = unsafe { CFNumber::wrap_under_get_rule(layer.cast()) }.to_i32()?;
            if layer != K_CG_DOCK_WINDOW_LEVEL {
                return None;
            }

            let bounds = lookup(dict, &bounds_key)?;
            let mut rect = CGRect::new(&CGPoint::new(0.0, 0.0), &CGSize::new(0.0, 0.0));
            let ok = unsafe { CGRectMakeWithDictionaryRepresentation(bounds.cast(), &raw mut rect) };
            ok.then(|| Rect::new(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height))
        })
        .filter(|rect| rect.width > 0.0 && rect.height > 0.0)
        .max_by(|a, b| (a.width * a.height).total_cmp(&(b.width * b.height)))
}

fn lookup(dict: CFDictionaryRef, key: &CFString) -> Option<*const c_void> {
    let value = unsafe { CFDictionaryGetValue(dict, key.as_concrete_TypeRef().cast()) };
    (!value.is_null()).then_some(value)
}
