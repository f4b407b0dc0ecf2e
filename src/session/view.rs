//! Viewport state
//!
//! Page position, zoom and rotation for the currently displayed version.
//! Exists only relative to the active version's page space and resets to
//! defaults whenever that version changes.

use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 2.5;
pub const SCALE_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// 1-based page number.
    pub page: u32,
    pub scale: f32,
    /// Degrees clockwise, one of 0/90/180/270.
    pub rotation: u16,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            page: 1,
            scale: 1.0,
            rotation: 0,
        }
    }
}

impl ViewState {
    pub fn reset(&mut self) {
        *self = ViewState::default();
    }

    pub(crate) fn clamp_page(&mut self, page_count: u32) {
        self.page = self.page.clamp(1, page_count.max(1));
    }

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale + SCALE_STEP).min(MAX_SCALE);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - SCALE_STEP).max(MIN_SCALE);
    }

    pub fn rotate_clockwise(&mut self) {
        self.rotation = (self.rotation + 90) % 360;
    }
}
