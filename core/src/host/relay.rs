//! Host-side input relay
//!
//! Turns native pointer and key activity into [`InputEvent`]s in module
//! space. The execution thread applies them to its input state on arrival.

use easel_shared::{InputEvent, KeyCode, Viewport};
use glam::DVec2;

#[derive(Debug, Default)]
pub struct InputRelay {
    /// Last pointer position in pixels; movement is measured from here
    last: Option<DVec2>,
}

impl InputRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer moved to `pixel`. The first move after creation or
    /// [`InputRelay::reset`] reports no movement.
    pub fn pointer_moved(&mut self, viewport: &Viewport, pixel: DVec2) -> InputEvent {
        let delta = self.last.map_or(DVec2::ZERO, |last| pixel - last);
        self.last = Some(pixel);
        InputEvent::PointerMove {
            position: viewport.to_normalized(pixel),
            movement: viewport.delta_to_normalized(delta),
        }
    }

    pub fn pointer_down(&self) -> InputEvent {
        InputEvent::PointerDown
    }

    pub fn pointer_up(&self) -> InputEvent {
        InputEvent::PointerUp
    }

    pub fn key_down(&self, key: KeyCode) -> InputEvent {
        InputEvent::KeyDown { key }
    }

    pub fn key_up(&self, key: KeyCode) -> InputEvent {
        InputEvent::KeyUp { key }
    }

    /// Forget the last position, e.g. when the pointer leaves the surface
    pub fn reset(&mut self) {
        self.last = None;
    }
}
