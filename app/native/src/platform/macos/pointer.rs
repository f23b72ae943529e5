//! Cursor warping and synthetic motion.

use core_graphics::display::CGDisplay;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton, EventField};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use crate::geometry::Point;
use crate::platform::PointerDriver;

/// Drives the real cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreGraphicsPointer;

impl PointerDriver for CoreGraphicsPointer {
    fn location(&self) -> Option<Point> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).ok()?;
        let event = CGEvent::new(source).ok()?;
        let location = event.location();
        Some(Point::new(location.x, location.y))
    }

    fn warp(&self, to: Point) {
        if let Err(err) = CGDisplay::warp_mouse_cursor_position(CGPoint::new(to.x, to.y)) {
            tracing::warn!(error = err, x = to.x, y = to.y, "cursor warp failed");
        }
        // A warp freezes hardware motion for a short interval unless the
        // mouse is re-associated with the cursor.
        let _ = CGDisplay::associate_mouse_and_mouse_cursor_position(true);
    }

    fn post_move(&self, to: Point, marker: i64) {
        let Ok(source) = CGEventSource::new(CGEventSourceStateID::HIDSystemState) else {
            tracing::warn!("failed to create event source");
            return;
        };
        let Ok(event) = CGEvent::new_mouse_event(
            source,
            CGEventType::MouseMoved,
            CGPoint::new(to.x, to.y),
            CGMouseButton::Left,
        ) else {
            tracing::warn!("failed to create synthetic mouse event");
            return;
        };

        event.set_integer_value_field(EventField::EVENT_SOURCE_USER_DATA, marker);
        event.post(CGEventTapLocation::HID);
    }

    fn set_cursor_visible(&self, visible: bool) {
        let display = CGDisplay::main();
        let result = if visible { display.show_cursor() } else { display.hide_cursor() };
        if let Err(err) = result {
            tracing::warn!(error = err, visible, "failed to change cursor visibility");
        }
    }
}
