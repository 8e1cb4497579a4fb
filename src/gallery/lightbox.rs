//! Lightbox state machine.
//!
//! `Closed --open(image)--> Open --close()--> Closed`, both transitions
//! guarded so that a repeated call is a silent no-op. Each transition returns
//! the full list of effects for its side of the modal, so an overlay and its
//! dismissal triggers are created and destroyed together.

use super::effect::Effect;

pub type OverlayId = u64;

/// Ways an open overlay can dismiss itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    /// A click on the dark backdrop, not on the image or the close button.
    Backdrop,
    /// Activation of the close button.
    CloseButton,
}

/// What a point on the overlay lands on, topmost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTarget {
    CloseButton,
    Image,
    Backdrop,
}

/// Screen-space rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Rect {
    pub fn from_center(center: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            min: [center[0] - size[0] / 2.0, center[1] - size[1] / 2.0],
            max: [center[0] + size[0] / 2.0, center[1] + size[1] / 2.0],
        }
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    pub fn expanded(&self, by: f32) -> Self {
        Self {
            min: [self.min[0] - by, self.min[1] - by],
            max: [self.max[0] + by, self.max[1] + by],
        }
    }

    pub fn translated(&self, offset: [f32; 2]) -> Self {
        Self {
            min: [self.min[0] + offset[0], self.min[1] + offset[1]],
            max: [self.max[0] + offset[0], self.max[1] + offset[1]],
        }
    }

    pub fn contains(&self, point: [f32; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

/// Visual treatment of the overlay. Colours are linear RGBA in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub backdrop_color: [f32; 4],
    /// Largest share of the viewport the image may cover on each axis.
    pub max_fraction: f32,
    pub border_width: f32,
    pub border_color: [f32; 4],
    pub shadow_offset: [f32; 2],
    pub shadow_blur: f32,
    pub shadow_color: [f32; 4],
    pub close_button_size: f32,
    /// Distance of the close button from the top and right edges.
    pub close_button_margin: f32,
    pub close_button_color: [f32; 4],
    pub close_glyph_color: [f32; 4],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            backdrop_color: [0.0, 0.0, 0.0, 0.9],
            max_fraction: 0.92,
            border_width: 6.0,
            border_color: [1.0, 1.0, 1.0, 1.0],
            shadow_offset: [0.0, 20.0],
            shadow_blur: 50.0,
            shadow_color: [0.0, 0.0, 0.0, 0.6],
            close_button_size: 40.0,
            close_button_margin: 20.0,
            close_button_color: [1.0, 1.0, 1.0, 1.0],
            close_glyph_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl OverlayStyle {
    /// Pixel measures multiplied by the display scale factor; colours untouched.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            border_width: self.border_width * factor,
            shadow_offset: [self.shadow_offset[0] * factor, self.shadow_offset[1] * factor],
            shadow_blur: self.shadow_blur * factor,
            close_button_size: self.close_button_size * factor,
            close_button_margin: self.close_button_margin * factor,
            ..self
        }
    }
}

/// Scales `natural` down (never up) to fit `fraction` of `viewport`, keeping aspect.
pub fn fit_within(natural: [f32; 2], viewport: [f32; 2], fraction: f32) -> [f32; 2] {
    if natural[0] <= 0.0 || natural[1] <= 0.0 {
        return [0.0, 0.0];
    }
    let scale = (viewport[0] * fraction / natural[0])
        .min(viewport[1] * fraction / natural[1])
        .min(1.0)
        .max(0.0);
    [natural[0] * scale, natural[1] * scale]
}

/// Everything the presentation surface needs to build one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub id: OverlayId,
    pub image: String,
    pub style: OverlayStyle,
    pub triggers: Vec<DismissTrigger>,
}

impl OverlaySpec {
    /// Image content rectangle, centred, excluding the border.
    pub fn image_rect(&self, natural: [f32; 2], viewport: [f32; 2]) -> Rect {
        let size = fit_within(natural, viewport, self.style.max_fraction);
        Rect::from_center([viewport[0] / 2.0, viewport[1] / 2.0], size)
    }

    /// Image rectangle including its border; clicks here do not dismiss.
    pub fn framed_image_rect(&self, natural: [f32; 2], viewport: [f32; 2]) -> Rect {
        self.image_rect(natural, viewport)
            .expanded(self.style.border_width)
    }

    pub fn close_button_rect(&self, viewport: [f32; 2]) -> Rect {
        let size = self.style.close_button_size;
        let margin = self.style.close_button_margin;
        Rect {
            min: [viewport[0] - margin - size, margin],
            max: [viewport[0] - margin, margin + size],
        }
    }

    pub fn hit_test(&self, point: [f32; 2], natural: [f32; 2], viewport: [f32; 2]) -> OverlayTarget {
        if self.close_button_rect(viewport).contains(point) {
            OverlayTarget::CloseButton
        } else if self.framed_image_rect(natural, viewport).contains(point) {
            OverlayTarget::Image
        } else {
            OverlayTarget::Backdrop
        }
    }

    /// The registered trigger fired by a click on `target`, if any.
    pub fn dismissal_for(&self, target: OverlayTarget) -> Option<DismissTrigger> {
        let trigger = match target {
            OverlayTarget::CloseButton => DismissTrigger::CloseButton,
            OverlayTarget::Backdrop => DismissTrigger::Backdrop,
            OverlayTarget::Image => return None,
        };
        self.triggers.contains(&trigger).then_some(trigger)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open {
        image: String,
        overlay: OverlayId,
    },
}

#[derive(Debug, Default)]
pub struct Lightbox {
    state: LightboxState,
    style: OverlayStyle,
    next_overlay: OverlayId,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    pub fn current_image(&self) -> Option<&str> {
        match &self.state {
            LightboxState::Open { image, .. } => Some(image),
            LightboxState::Closed => None,
        }
    }

    pub fn current_overlay(&self) -> Option<OverlayId> {
        match self.state {
            LightboxState::Open { overlay, .. } => Some(overlay),
            LightboxState::Closed => None,
        }
    }

    /// Opens the overlay on `image`; a no-op while already open.
    pub fn open(&mut self, image: &str) -> Vec<Effect> {
        if self.is_open() {
            log::debug!("Lightbox already open, ignoring open({image})");
            return Vec::new();
        }

        self.next_overlay += 1;
        let overlay = self.next_overlay;
        self.state = LightboxState::Open {
            image: image.to_string(),
            overlay,
        };
        log::info!("Lightbox opened on {image}");

        vec![
            Effect::SetCameraInput(false),
            Effect::ShowOverlay(OverlaySpec {
                id: overlay,
                image: image.to_string(),
                style: self.style,
                triggers: vec![DismissTrigger::Backdrop, DismissTrigger::CloseButton],
            }),
            Effect::SetScrollLocked(true),
        ]
    }

    /// Closes the overlay; a no-op while already closed.
    pub fn close(&mut self) -> Vec<Effect> {
        let LightboxState::Open { overlay, .. } = std::mem::take(&mut self.state) else {
            log::debug!("Lightbox already closed, ignoring close()");
            return Vec::new();
        };
        log::info!("Lightbox closed");

        vec![
            Effect::SetCameraInput(true),
            Effect::RemoveOverlay(overlay),
            Effect::SetScrollLocked(false),
        ]
    }
}
