//! Pointer/touch gesture disambiguation.
//!
//! Converts raw mouse and touch events into selection-extraction
//! requests. Exactly one input path is live at a time: mouse handlers
//! are no-ops in mobile mode and touch handlers are no-ops on desktop.
//! The machine never runs the extractor itself; it emits
//! [`GestureAction`]s for the host loop to execute, so the timing
//! logic stays testable without a rendering surface.

use std::time::{Duration, Instant};

/// Viewport width below which the device counts as mobile.
const MOBILE_BREAKPOINT: f32 = 768.0;

/// Hold duration that turns a touch into a long-press.
const LONG_PRESS_MS: u64 = 500;

/// Settle delay after a double-click, letting the platform's automatic
/// word selection land before the extractor reads it.
const DOUBLE_CLICK_SETTLE_MS: u64 = 10;

/// Settle delay after a short tap on touch devices.
const TAP_SETTLE_MS: u64 = 50;

/// Input mode, re-evaluated on every viewport resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    /// Mobile when the viewport is narrow or the device has touch.
    pub fn classify(viewport_width: f32, has_touch: bool) -> Self {
        if viewport_width < MOBILE_BREAKPOINT || has_touch {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// What the host loop should do in response to an input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    /// Run the extractor against the current native selection.
    /// `clear_selection` is true on desktop (the highlight is removed
    /// once a candidate exists) and false on mobile (the reader keeps
    /// seeing the platform highlight).
    Extract { clear_selection: bool },
    /// Same, but only after `delay_ms` so the platform selection can
    /// settle first.
    ExtractAfter { delay_ms: u64, clear_selection: bool },
    /// Long-press: select the word at this point (see
    /// [`crate::select::surface::word_span_at`]), then extract.
    SelectWordAt { x: f32, y: f32 },
    None,
}

/// One pending touch, armed at touch-start.
#[derive(Debug, Clone, Copy)]
struct PendingTouch {
    x: f32,
    y: f32,
    started: Instant,
    long_press_fired: bool,
}

/// Per-device gesture state machine.
///
/// Touch path: `touch_start` arms the 500 ms timer; `poll_long_press`
/// (called from the host's update loop) fires the long-press once the
/// timer elapses; `touch_end` before that point is a short tap.
/// A new touch always cancels the previous pending timer.
pub struct GestureRecognizer {
    device: DeviceClass,
    pending: Option<PendingTouch>,
}

impl GestureRecognizer {
    pub fn new(device: DeviceClass) -> Self {
        Self {
            device,
            pending: None,
        }
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Re-classify on resize. Switching device class drops any pending
    /// touch so a stale timer cannot fire in the wrong mode.
    pub fn set_viewport(&mut self, viewport_width: f32, has_touch: bool) {
        let device = DeviceClass::classify(viewport_width, has_touch);
        if device != self.device {
            log::debug!("device class changed: {:?} -> {:?}", self.device, device);
            self.device = device;
            self.pending = None;
        }
    }

    /// Mouse button released over the reading surface.
    pub fn mouse_up(&mut self) -> GestureAction {
        match self.device {
            DeviceClass::Desktop => GestureAction::Extract {
                clear_selection: true,
            },
            DeviceClass::Mobile => GestureAction::None,
        }
    }

    /// Double-click: the platform selects the word itself; check the
    /// selection after a short settle delay.
    pub fn double_click(&mut self) -> GestureAction {
        match self.device {
            DeviceClass::Desktop => GestureAction::ExtractAfter {
                delay_ms: DOUBLE_CLICK_SETTLE_MS,
                clear_selection: true,
            },
            DeviceClass::Mobile => GestureAction::None,
        }
    }

    /// Finger down. Arms the long-press timer, cancelling any previous
    /// pending touch.
    pub fn touch_start(&mut self, x: f32, y: f32, now: Instant) -> GestureAction {
        if self.device != DeviceClass::Mobile {
            return GestureAction::None;
        }
        self.pending = Some(PendingTouch {
            x,
            y,
            started: now,
            long_press_fired: false,
        });
        GestureAction::None
    }

    /// Poll the long-press timer from the host update loop. Fires at
    /// most once per touch.
    pub fn poll_long_press(&mut self, now: Instant) -> GestureAction {
        if self.device != DeviceClass::Mobile {
            return GestureAction::None;
        }
        if let Some(pending) = self.pending.as_mut() {
            if !pending.long_press_fired
                && now.duration_since(pending.started) >= Duration::from_millis(LONG_PRESS_MS)
            {
                pending.long_press_fired = true;
                return GestureAction::SelectWordAt {
                    x: pending.x,
                    y: pending.y,
                };
            }
        }
        GestureAction::None
    }

    /// Finger up. A release before the long-press threshold is a short
    /// tap: check the (possibly platform-produced) selection after a
    /// settle delay, keeping the native highlight visible.
    pub fn touch_end(&mut self, now: Instant) -> GestureAction {
        if self.device != DeviceClass::Mobile {
            return GestureAction::None;
        }
        let pending = match self.pending.take() {
            Some(p) => p,
            None => return GestureAction::None,
        };
        if pending.long_press_fired {
            // The long-press already ran; the release is inert.
            return GestureAction::None;
        }
        if now.duration_since(pending.started) < Duration::from_millis(LONG_PRESS_MS) {
            GestureAction::ExtractAfter {
                delay_ms: TAP_SETTLE_MS,
                clear_selection: false,
            }
        } else {
            // Threshold elapsed but the poll never observed it (e.g. a
            // stalled loop); treat as a long-press at the touch point.
            GestureAction::SelectWordAt {
                x: pending.x,
                y: pending.y,
            }
        }
    }
}
