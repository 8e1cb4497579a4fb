use std::collections::HashMap;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};
use crate::gallery::{
    audio::{AudioGate, BackgroundTrack},
    controller::{GalleryController, GalleryEvent, Key},
    effect::Effect,
    lightbox::OverlaySpec,
};
use crate::gfx::{resources::DecodedImage, RenderEngine};
use crate::ui::{LightboxOverlay, UiManager};

pub struct GalleryApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: GalleryConfig,
    images: HashMap<String, DecodedImage>,
    controller: GalleryController,
    audio: AudioGate<Box<dyn BackgroundTrack>>,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    overlay: Option<LightboxOverlay>,
    scroll_locked: bool,
    cursor: [f32; 2],
    startup_error: Option<GalleryError>,
}

impl GalleryApp {
    /// Decodes every artwork and builds the scene; the window opens in `run`.
    pub fn new(config: GalleryConfig) -> Result<Self> {
        config.validate()?;
        let event_loop = EventLoop::new()?;

        let mut images = HashMap::new();
        for identifier in &config.images {
            if !images.contains_key(identifier) {
                let image = DecodedImage::load_or_placeholder(&config.resolve_asset(identifier));
                images.insert(identifier.clone(), image);
            }
        }
        let placeholders = images.values().filter(|image| image.placeholder).count();
        log::info!(
            "Loaded {} artworks ({} placeholders)",
            images.len(),
            placeholders
        );

        let controller =
            GalleryController::new(&config, config.window.width, config.window.height);
        log::info!(
            "Gallery scene built with {} panels",
            controller.scene().objects().len()
        );
        let audio = AudioGate::new(background_track(&config));

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                images,
                controller,
                audio,
                window: None,
                render_engine: None,
                ui_manager: None,
                overlay: None,
                scroll_locked: false,
                cursor: [0.0, 0.0],
                startup_error: None,
            },
        })
    }

    /// Runs the event loop until the window closes.
    ///
    /// GPU start-up failures inside the loop are returned here.
    pub fn run(mut self) -> Result<()> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "audio")]
fn background_track(config: &GalleryConfig) -> Box<dyn BackgroundTrack> {
    Box::new(crate::gallery::audio::RodioTrack::new(
        config.resolve_asset(&config.audio.track),
        config.audio.volume,
    ))
}

#[cfg(not(feature = "audio"))]
fn background_track(_config: &GalleryConfig) -> Box<dyn BackgroundTrack> {
    Box::new(crate::gallery::audio::SilentTrack)
}

impl AppState {
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);
        log::info!("Window created with scale factor {}", window.scale_factor());

        let PhysicalSize { width, height } = window.inner_size();
        let mut renderer = pollster::block_on(RenderEngine::new(window.clone(), width, height))?;
        renderer.upload_gallery(
            self.controller.scene(),
            &self.config.panel,
            &self.images,
        );

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            renderer.color_pipeline(),
            &window,
        );
        ui_manager.update_display_size(width, height);

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);

        // The configured size is logical; re-sync the camera with the real surface.
        let effects = self.controller.handle(GalleryEvent::Resized { width, height });
        self.apply_effects(effects);
        Ok(())
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ShowOverlay(spec) => self.show_overlay(spec),
                Effect::RemoveOverlay(id) => {
                    if self.overlay.as_ref().map(LightboxOverlay::id) == Some(id) {
                        self.remove_overlay();
                    }
                }
                Effect::SetScrollLocked(locked) => self.scroll_locked = locked,
                Effect::ResizeSurface { width, height } => {
                    if let Some(render_engine) = self.render_engine.as_mut() {
                        render_engine.resize(width, height);
                    }
                    if let Some(ui_manager) = self.ui_manager.as_mut() {
                        ui_manager.update_display_size(width, height);
                    }
                }
                Effect::StartBackgroundAudio => {
                    self.audio.on_click();
                }
                // The controller applies camera input changes itself.
                Effect::SetCameraInput(_) => {}
            }
        }
    }

    fn show_overlay(&mut self, spec: OverlaySpec) {
        if self.overlay.is_some() {
            self.remove_overlay();
        }
        let (Some(render_engine), Some(ui_manager), Some(window)) = (
            self.render_engine.as_ref(),
            self.ui_manager.as_mut(),
            self.window.as_ref(),
        ) else {
            log::warn!("No renderer yet; cannot show {}", spec.image);
            return;
        };

        let image = match self.images.get(&spec.image) {
            Some(image) => image.clone(),
            None => DecodedImage::placeholder(),
        };
        let natural = image.size();
        let image = image.limited_to(render_engine.max_texture_dimension());
        let texture = ui_manager.upload_texture(
            render_engine.device(),
            render_engine.queue(),
            &image,
            &spec.image,
        );
        self.overlay = Some(LightboxOverlay::new(
            spec,
            texture,
            natural,
            window.scale_factor() as f32,
        ));
    }

    fn remove_overlay(&mut self) {
        let Some(overlay) = self.overlay.take() else {
            return;
        };
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            ui_manager.release_texture(overlay.texture());
        }
    }

    fn dispatch(&mut self, event: GalleryEvent) {
        let effects = self.controller.handle(event);
        self.apply_effects(effects);
    }

    fn redraw(&mut self) {
        self.controller.tick();

        let (Some(render_engine), Some(ui_manager), Some(window)) = (
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
            self.window.clone(),
        ) else {
            return;
        };
        render_engine.sync_transforms(self.controller.scene());
        render_engine.update(self.controller.camera().camera.uniform);

        let overlay = &mut self.overlay;
        let mut dismissed = None;
        render_engine.render_frame(|device, queue, encoder, color_attachment| {
            dismissed = ui_manager.draw(
                device,
                queue,
                encoder,
                &window,
                color_attachment,
                |ui| {
                    overlay
                        .as_mut()
                        .and_then(|overlay| overlay.draw(ui).map(|trigger| (overlay.id(), trigger)))
                },
            );
        });

        if let Some((overlay, trigger)) = dismissed {
            self.dispatch(GalleryEvent::OverlayClicked { overlay, trigger });
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_window(event_loop) {
            log::error!("Failed to start gallery: {err}");
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.dispatch(GalleryEvent::Resized { width, height });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = [position.x as f32, position.y as f32];
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                // The overlay is modal and hit-tests its own clicks.
                ElementState::Pressed if self.overlay.is_none() => {
                    let [x, y] = self.cursor;
                    self.dispatch(GalleryEvent::PointerDown { x, y });
                }
                ElementState::Pressed => {}
                ElementState::Released => self.dispatch(GalleryEvent::Click),
            },
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let key = match key_code {
                    KeyCode::Escape => Key::Escape,
                    _ => Key::Other,
                };
                self.dispatch(GalleryEvent::KeyDown(key));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if self.scroll_locked && matches!(event, DeviceEvent::MouseWheel { .. }) {
            return;
        }

        // Check if UI wants to capture input before processing camera events
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            let io = ui_manager.context.io();
            if io.want_capture_mouse || io.want_capture_keyboard {
                return;
            }
        }

        self.controller.camera_mut().process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
