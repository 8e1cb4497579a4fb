//! Side effects requested by the gallery core.
//!
//! Handlers never touch the window, the GPU or the audio device. They return
//! effects and the application shell applies them in order.

use super::lightbox::{OverlayId, OverlaySpec};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Enable or disable orbit-camera input.
    SetCameraInput(bool),
    /// Build and show the lightbox overlay.
    ShowOverlay(OverlaySpec),
    /// Tear down the overlay and its dismissal triggers.
    RemoveOverlay(OverlayId),
    /// Stop (true) or restore (false) scroll/wheel delivery to the page.
    SetScrollLocked(bool),
    /// Resize the render surface to match the viewport.
    ResizeSurface { width: u32, height: u32 },
    /// Ask the audio gate to start the background track if it is paused.
    StartBackgroundAudio,
}
