//! Popover placement.
//!
//! Pure geometry: given the selection anchor, the viewport and the
//! device class, compute a top-left corner for the explanation
//! popover that stays on screen. The popover footprint is assumed
//! fixed (320×280 on desktop, width shrunk to fit on narrow screens);
//! the real box may be shorter, which only ever leaves slack.

use crate::gesture::DeviceClass;
use crate::select::Point;

const POPOVER_WIDTH: f32 = 320.0;
const POPOVER_HEIGHT: f32 = 280.0;
const EDGE_PADDING: f32 = 16.0;

/// Viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Compute the popover's top-left corner.
///
/// Desktop: open just below the anchor, clamp horizontally, flip above
/// the anchor when the bottom edge would overflow. Mobile: center
/// horizontally, prefer below the anchor, then above, then vertical
/// center when neither side has room.
pub fn place(anchor: Point, viewport: Viewport, device: DeviceClass) -> Point {
    match device {
        DeviceClass::Desktop => place_desktop(anchor, viewport),
        DeviceClass::Mobile => place_mobile(anchor, viewport),
    }
}

fn place_desktop(anchor: Point, viewport: Viewport) -> Point {
    let mut x = anchor.x;
    let mut y = anchor.y + 10.0;

    if x + POPOVER_WIDTH > viewport.width - EDGE_PADDING {
        x = viewport.width - POPOVER_WIDTH - EDGE_PADDING;
    }
    // Left clamp last, so it wins on impossibly narrow viewports.
    if x < EDGE_PADDING {
        x = EDGE_PADDING;
    }

    if y + POPOVER_HEIGHT > viewport.height - EDGE_PADDING {
        y = anchor.y - POPOVER_HEIGHT - 10.0;
    }

    Point { x, y }
}

fn place_mobile(anchor: Point, viewport: Viewport) -> Point {
    let width = (viewport.width - EDGE_PADDING).min(POPOVER_WIDTH);
    let x = (viewport.width - width) / 2.0;

    let space_below = viewport.height - anchor.y;
    let space_above = anchor.y;

    let y = if space_below > POPOVER_HEIGHT + 60.0 {
        anchor.y + 40.0
    } else if space_above > POPOVER_HEIGHT + 60.0 {
        anchor.y - POPOVER_HEIGHT - 40.0
    } else {
        (viewport.height - POPOVER_HEIGHT) / 2.0
    };

    Point { x, y }
}
