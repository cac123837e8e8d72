//! Interactive crop selection in normalized image space.

use crate::geometry::{CropRect, NormalizedPoint};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropPhase {
    #[default]
    Inactive,
    Selecting,
    RectReady,
}

/// Rubber-band selection. Pointer input is clamped to `[0, 1]` and the live
/// rectangle always spans from the anchor to the latest pointer position.
#[derive(Debug, Clone, Default)]
pub struct CropSession {
    active: bool,
    anchor: Option<NormalizedPoint>,
    dragging: bool,
    selection: Option<CropRect>,
}

impl CropSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CropPhase {
        if !self.active {
            CropPhase::Inactive
        } else if self.selection.is_some() {
            CropPhase::RectReady
        } else {
            CropPhase::Selecting
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Starts a fresh selection, dropping any previous rectangle.
    pub fn begin(&mut self) {
        *self = Self {
            active: true,
            ..Self::default()
        };
    }

    /// Marks the anchor corner. Returns `false` when no session is active.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        if !self.active {
            return false;
        }
        self.anchor = Some(NormalizedPoint::clamped(x, y));
        self.dragging = true;
        self.selection = None;
        true
    }

    /// Recomputes the live rectangle while the pointer is held and returns it.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<CropRect> {
        if !self.active || !self.dragging {
            return self.selection;
        }
        let anchor = self.anchor?;
        let rect = CropRect::from_corners(anchor, NormalizedPoint::clamped(x, y));
        self.selection = (!rect.is_degenerate()).then_some(rect);
        self.selection
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Live rectangle for preview overlays.
    pub fn preview(&self) -> Option<CropRect> {
        self.selection
    }

    pub fn anchor(&self) -> Option<NormalizedPoint> {
        self.anchor
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}
