//! ImGui integration with wgpu and winit
//!
//! Owns the ImGui context, the winit platform glue and the wgpu renderer, and
//! manages the textures the overlay draws.

use imgui::{Context, FontConfig, FontSource, MouseCursor, TextureId};
use imgui_wgpu::{Renderer, RendererConfig, Texture, TextureConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

use crate::gfx::color::ColorPipeline;
use crate::gfx::resources::texture_resource::{DecodedImage, TextureResource};

/// ImGui UI manager
///
/// Coordinates are physical pixels: the platform is attached with a locked
/// DPI factor of 1 and callers scale their own measures.
pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Creates a new UI manager
    ///
    /// # Arguments
    /// * `output_color_format` - Target texture format for rendering
    /// * `color` - Whether the target encodes sRGB itself or the shader must
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        color: ColorPipeline,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        let font_size = (16.0 * window.scale_factor()) as f32;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        let base = match color {
            ColorPipeline::NativeSrgb => RendererConfig::new(),
            ColorPipeline::ShaderEncoded => RendererConfig::new_srgb(),
        };
        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..base
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Updates ImGui's display size to match the render target
    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Feeds a window event to ImGui and returns whether ImGui wants it
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        match event {
            Event::WindowEvent {
                event: window_event,
                ..
            } => match window_event {
                WindowEvent::CursorMoved { .. }
                | WindowEvent::MouseInput { .. }
                | WindowEvent::MouseWheel { .. }
                | WindowEvent::KeyboardInput { .. }
                | WindowEvent::Focused(_) => {
                    self.platform
                        .handle_event(self.context.io_mut(), window, event);

                    let io = self.context.io();
                    io.want_capture_mouse || io.want_capture_keyboard
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Uploads decoded pixels as an ImGui texture.
    pub fn upload_texture(
        &mut self,
        device: &Device,
        queue: &Queue,
        image: &DecodedImage,
        label: &str,
    ) -> TextureId {
        let config = TextureConfig {
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            label: Some(label),
            format: Some(TextureResource::IMAGE_FORMAT),
            ..Default::default()
        };
        let texture = Texture::new(device, &self.renderer, config);
        texture.write(queue, &image.pixels, image.width, image.height);
        self.renderer.textures.insert(texture)
    }

    pub fn release_texture(&mut self, id: TextureId) {
        if self.renderer.textures.remove(id).is_none() {
            log::debug!("Texture {:?} was already released", id);
        }
    }

    /// Builds one ImGui frame with `run_ui` and returns its result
    pub fn update_logic<F, R>(&mut self, window: &Window, run_ui: F) -> R
    where
        F: FnOnce(&imgui::Ui) -> R,
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("Failed to prepare UI frame: {e}");
        }

        let ui = self.context.frame();
        let result = run_ui(ui);

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        result
    }

    /// Renders the UI built in the last `update_logic()` call on top of the scene
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        let draw_data = self.context.render();

        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // Preserve 3D scene
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            log::error!("Failed to render UI: {e}");
        }
    }

    /// `update_logic()` followed by `render_display_only()`
    pub fn draw<F, R>(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        color_attachment: &TextureView,
        run_ui: F,
    ) -> R
    where
        F: FnOnce(&imgui::Ui) -> R,
    {
        let result = self.update_logic(window, run_ui);
        self.render_display_only(device, queue, encoder, color_attachment);
        result
    }
}
