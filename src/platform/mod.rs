//! Platform abstraction layer
//!
//! The game consumes two distinct clocks:
//! - a monotonic frame clock for deltas and scheduled delays
//! - a wall clock for booster expiry, which must keep running while a
//!   background tab receives no frames
//!
//! It also owns the pointer gesture logic shared by mouse and touch input.

use glam::Vec2;

use crate::game::InputEvent;

/// Time source for the frame driver
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin
    fn frame_ms(&self) -> f64;
    /// Milliseconds since the Unix epoch
    fn wall_ms(&self) -> f64;
}

/// `performance.now()` and `Date.now()`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClock;

#[cfg(target_arch = "wasm32")]
impl Clock for BrowserClock {
    fn frame_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn wall_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// `Instant` and `SystemTime`
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn frame_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn wall_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Hand-driven clock for headless runs and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualClock {
    pub frame: f64,
    pub wall: f64,
}

impl ManualClock {
    pub fn new(wall: f64) -> Self {
        Self { frame: 0.0, wall }
    }

    /// Move both clocks forward together
    pub fn advance(&mut self, ms: f64) {
        self.frame += ms;
        self.wall += ms;
    }
}

impl Clock for ManualClock {
    fn frame_ms(&self) -> f64 {
        self.frame
    }

    fn wall_ms(&self) -> f64 {
        self.wall
    }
}

/// Pointer travel (px) before a press counts as a drag instead of a tap
pub const DRAG_THRESHOLD: f32 = 5.0;

/// Turns raw press/move/release pointer events into game input
///
/// Only a press that started on the canvas can become a tap or a drag;
/// releases elsewhere on the page (buttons, outside the window) are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerGesture {
    /// Last pointer position while a map press is held
    press: Option<Vec2>,
    dragged: bool,
}

impl PointerGesture {
    pub fn press(&mut self, pos: Vec2, in_flight: bool) -> Option<InputEvent> {
        if in_flight {
            return Some(InputEvent::PointerDown(pos));
        }
        self.press = Some(pos);
        self.dragged = false;
        None
    }

    pub fn moved(&mut self, pos: Vec2) -> Option<InputEvent> {
        let from = self.press?;
        let delta = pos - from;
        if self.dragged || delta.length() > DRAG_THRESHOLD {
            self.dragged = true;
            self.press = Some(pos);
            return Some(InputEvent::Drag(delta));
        }
        None
    }

    pub fn release(&mut self, pos: Option<Vec2>, in_flight: bool) -> Option<InputEvent> {
        if in_flight {
            self.press = None;
            return Some(InputEvent::PointerUp);
        }
        let pressed = self.press.take()?;
        if self.dragged {
            return None;
        }
        Some(InputEvent::Tap(pos.unwrap_or(pressed)))
    }
}
