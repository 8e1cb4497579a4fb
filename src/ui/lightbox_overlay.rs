//! Draws the lightbox on ImGui's foreground draw list and reports dismissals.

use imgui::{MouseButton, MouseCursor, TextureId};

use crate::gallery::lightbox::{DismissTrigger, OverlayId, OverlaySpec, OverlayTarget, Rect};

const SHADOW_STEPS: usize = 10;

/// One live overlay with its uploaded image.
pub struct LightboxOverlay {
    spec: OverlaySpec,
    texture: TextureId,
    natural: [f32; 2],
    /// False until the button has been seen up since the overlay appeared.
    armed: bool,
    pressed_on: Option<OverlayTarget>,
}

impl LightboxOverlay {
    /// `scale` is the window's DPI factor; style measures are in logical pixels.
    pub fn new(spec: OverlaySpec, texture: TextureId, natural: [f32; 2], scale: f32) -> Self {
        let spec = OverlaySpec {
            style: spec.style.scaled(scale),
            ..spec
        };
        Self {
            spec,
            texture,
            natural,
            armed: false,
            pressed_on: None,
        }
    }

    pub fn id(&self) -> OverlayId {
        self.spec.id
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Draws the overlay and returns the trigger fired by a completed click.
    pub fn draw(&mut self, ui: &imgui::Ui) -> Option<DismissTrigger> {
        let viewport = ui.io().display_size;
        let style = self.spec.style;
        let image = self.spec.image_rect(self.natural, viewport);
        let frame = image.expanded(style.border_width);
        let button = self.spec.close_button_rect(viewport);

        let draw_list = ui.get_foreground_draw_list();
        draw_list
            .add_rect([0.0, 0.0], viewport, style.backdrop_color)
            .filled(true)
            .build();
        for layer in shadow_layers(frame, style.shadow_offset, style.shadow_blur, style.shadow_color) {
            draw_list
                .add_rect(layer.rect.min, layer.rect.max, layer.color)
                .filled(true)
                .rounding(layer.spread)
                .build();
        }
        draw_list
            .add_rect(frame.min, frame.max, style.border_color)
            .filled(true)
            .build();
        draw_list.add_image(self.texture, image.min, image.max).build();

        let center = [
            (button.min[0] + button.max[0]) / 2.0,
            (button.min[1] + button.max[1]) / 2.0,
        ];
        let radius = button.width() / 2.0;
        draw_list
            .add_circle(center, radius, style.close_button_color)
            .filled(true)
            .build();
        let arm = radius * 0.4;
        let thickness = (radius * 0.12).max(1.0);
        draw_list
            .add_line(
                [center[0] - arm, center[1] - arm],
                [center[0] + arm, center[1] + arm],
                style.close_glyph_color,
            )
            .thickness(thickness)
            .build();
        draw_list
            .add_line(
                [center[0] + arm, center[1] - arm],
                [center[0] - arm, center[1] + arm],
                style.close_glyph_color,
            )
            .thickness(thickness)
            .build();

        let target = self.spec.hit_test(ui.io().mouse_pos, self.natural, viewport);
        if target != OverlayTarget::Image {
            ui.set_mouse_cursor(Some(MouseCursor::Hand));
        }

        self.track_click(
            target,
            ui.is_mouse_down(MouseButton::Left),
            ui.is_mouse_clicked(MouseButton::Left),
            ui.is_mouse_released(MouseButton::Left),
        )
    }

    /// A click counts only when press and release land on the same target.
    ///
    /// Input is ignored until the button is first seen up: the press that
    /// opened the overlay is still held, or just released, in its first frames.
    fn track_click(
        &mut self,
        target: OverlayTarget,
        down: bool,
        pressed: bool,
        released: bool,
    ) -> Option<DismissTrigger> {
        if !self.armed {
            self.armed = !down;
            return None;
        }
        if pressed {
            self.pressed_on = Some(target);
        }
        if !released {
            return None;
        }
        let pressed_on = self.pressed_on.take()?;
        if pressed_on != target {
            return None;
        }
        self.spec.dismissal_for(target)
    }
}

struct ShadowLayer {
    rect: Rect,
    color: [f32; 4],
    /// Distance past the frame edge, also used as corner rounding.
    spread: f32,
}

/// Stacked translucent rectangles approximating a blurred drop shadow,
/// outermost first.
fn shadow_layers(frame: Rect, offset: [f32; 2], blur: f32, color: [f32; 4]) -> Vec<ShadowLayer> {
    let base = frame.translated(offset);
    let alpha = color[3] / SHADOW_STEPS as f32;
    (0..SHADOW_STEPS)
        .rev()
        .map(|step| {
            let spread = blur * (step as f32 + 1.0) / SHADOW_STEPS as f32 / 2.0;
            ShadowLayer {
                rect: base.expanded(spread),
                color: [color[0], color[1], color[2], alpha],
                spread,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::lightbox::OverlayStyle;

    fn overlay() -> LightboxOverlay {
        let spec = OverlaySpec {
            id: 7,
            image: "/art1.jpeg".to_string(),
            style: OverlayStyle::default(),
            triggers: vec![DismissTrigger::Backdrop, DismissTrigger::CloseButton],
        };
        LightboxOverlay::new(spec, TextureId::new(1), [400.0, 300.0], 2.0)
    }

    #[test]
    fn test_new_scales_style() {
        let overlay = overlay();
        assert_eq!(overlay.id(), 7);
        assert_eq!(overlay.spec.style.border_width, 12.0);
        assert_eq!(overlay.spec.style.close_button_size, 80.0);
    }

    /// An overlay that has already seen the button up.
    fn armed_overlay() -> LightboxOverlay {
        let mut overlay = overlay();
        assert_eq!(overlay.track_click(OverlayTarget::Image, false, false, false), None);
        overlay
    }

    fn draw_frame(
        context: &mut imgui::Context,
        overlay: &mut LightboxOverlay,
    ) -> Option<DismissTrigger> {
        let trigger = overlay.draw(context.frame());
        context.render();
        trigger
    }

    #[test]
    fn test_opening_click_does_not_dismiss() {
        let mut context = imgui::Context::create();
        context.set_ini_filename(None);
        context.io_mut().display_size = [1000.0, 800.0];
        context.fonts().build_rgba32_texture();

        // The click that opened the overlay, over what becomes backdrop.
        context.io_mut().add_mouse_pos_event([100.0, 100.0]);
        context.io_mut().add_mouse_button_event(MouseButton::Left, true);
        let mut overlay = overlay();
        assert_eq!(draw_frame(&mut context, &mut overlay), None);
        context.io_mut().add_mouse_button_event(MouseButton::Left, false);
        assert_eq!(draw_frame(&mut context, &mut overlay), None);

        // A fresh click on the backdrop dismisses.
        context.io_mut().add_mouse_button_event(MouseButton::Left, true);
        assert_eq!(draw_frame(&mut context, &mut overlay), None);
        context.io_mut().add_mouse_button_event(MouseButton::Left, false);
        assert_eq!(
            draw_frame(&mut context, &mut overlay),
            Some(DismissTrigger::Backdrop)
        );
    }

    #[test]
    fn test_input_ignored_until_button_seen_up() {
        let mut overlay = overlay();
        assert_eq!(overlay.track_click(OverlayTarget::Backdrop, true, true, false), None);
        assert_eq!(overlay.track_click(OverlayTarget::Backdrop, false, false, true), None);
        assert_eq!(overlay.track_click(OverlayTarget::Backdrop, true, true, false), None);
        assert_eq!(
            overlay.track_click(OverlayTarget::Backdrop, false, false, true),
            Some(DismissTrigger::Backdrop)
        );
    }

    #[test]
    fn test_release_without_press_does_not_dismiss() {
        let mut overlay = armed_overlay();
        assert_eq!(overlay.track_click(OverlayTarget::Backdrop, false, false, true), None);
    }

    #[test]
    fn test_press_and_release_in_one_frame_dismisses() {
        let mut overlay = armed_overlay();
        assert_eq!(
            overlay.track_click(OverlayTarget::CloseButton, false, true, true),
            Some(DismissTrigger::CloseButton)
        );
    }

    #[test]
    fn test_drag_between_targets_is_not_a_click() {
        let mut overlay = armed_overlay();
        overlay.track_click(OverlayTarget::Image, true, true, false);
        assert_eq!(overlay.track_click(OverlayTarget::Backdrop, false, false, true), None);
        overlay.track_click(OverlayTarget::Image, true, true, false);
        assert_eq!(overlay.track_click(OverlayTarget::Image, false, false, true), None);
    }

    #[test]
    fn test_shadow_layers_grow_outward_and_sum_to_shadow_alpha() {
        let frame = Rect {
            min: [100.0, 100.0],
            max: [200.0, 200.0],
        };
        let layers = shadow_layers(frame, [0.0, 20.0], 50.0, [0.0, 0.0, 0.0, 0.6]);

        assert_eq!(layers.len(), SHADOW_STEPS);
        let total: f32 = layers.iter().map(|layer| layer.color[3]).sum();
        assert!((total - 0.6).abs() < 1e-5);
        assert!(layers
            .windows(2)
            .all(|pair| pair[0].rect.width() > pair[1].rect.width()));
        let innermost = &layers[SHADOW_STEPS - 1];
        assert_eq!(innermost.spread, 2.5);
        assert!(innermost.rect.min[1] > frame.min[1]);
    }
}
