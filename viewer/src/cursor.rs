//! Mouse-look cursor plumbing
//!
//! The camera reads the cursor relative to the window centre and warps it
//! back every frame. Not every platform can warp the pointer, so positions
//! are tracked as accumulated motion since the last warp rather than taken
//! as absolute coordinates.

use glam::Vec2;
use terrain_core::CursorSource;
use winit::dpi::PhysicalPosition;
use winit::window::Window;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CursorTracker {
    /// Last reported pointer position
    last: Option<Vec2>,
    /// Motion since the last warp
    offset: Vec2,
    center: Vec2,
    warp_warned: bool,
}

impl CursorTracker {
    pub fn new(center: Vec2) -> Self {
        Self {
            center,
            ..Default::default()
        }
    }

    /// Record a `CursorMoved` event
    pub fn moved(&mut self, position: Vec2) {
        if let Some(last) = self.last {
            self.offset += position - last;
        }
        self.last = Some(position);
    }

    /// Window resized; the rest position moves with the centre
    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
        self.offset = Vec2::ZERO;
    }

    /// Forget motion, e.g. across a focus change
    pub fn reset(&mut self) {
        self.last = None;
        self.offset = Vec2::ZERO;
    }

    pub fn position(&self) -> Vec2 {
        self.center + self.offset
    }

    /// The pointer was sent back to `center`. When the platform really moved
    /// it, the next report is measured from there.
    pub fn recentered(&mut self, center: Vec2, warped: bool) {
        self.center = center;
        self.offset = Vec2::ZERO;
        if warped {
            self.last = Some(center);
        }
    }
}

/// [`CursorSource`] backed by a winit window
pub struct WindowCursor<'a> {
    window: &'a Window,
    tracker: &'a mut CursorTracker,
    focused: bool,
}

impl<'a> WindowCursor<'a> {
    pub fn new(window: &'a Window, tracker: &'a mut CursorTracker, focused: bool) -> Self {
        Self {
            window,
            tracker,
            focused,
        }
    }
}

impl CursorSource for WindowCursor<'_> {
    fn cursor_position(&self) -> Vec2 {
        self.tracker.position()
    }

    fn warp_cursor(&mut self, position: Vec2) {
        // Motion is discarded even when unfocused so refocusing does not jump
        let warped = self.focused
            && match self
                .window
                .set_cursor_position(PhysicalPosition::new(position.x as f64, position.y as f64))
            {
                Ok(()) => true,
                Err(e) => {
                    if !self.tracker.warp_warned {
                        tracing::warn!("Cannot warp cursor ({}), using relative motion", e);
                        self.tracker.warp_warned = true;
                    }
                    false
                }
            };
        self.tracker.recentered(position, warped);
    }
}
