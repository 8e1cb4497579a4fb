//! WGPU-based renderer for the gallery
//!
//! One pass per frame: clear to white, draw every panel textured with its
//! artwork, then draw the black outlines on top with depth testing. UI is
//! composited afterwards by the caller-supplied callback.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::config::PanelSize;
use crate::error::{GalleryError, Result};
use crate::gallery::registry::GalleryScene;
use crate::gfx::{
    camera::camera_utils::{convert_matrix4_to_array, CameraUniform},
    color::{self, ColorPipeline, RenderCapabilities},
    geometry::{generate_box_edges, generate_panel, to_line_vertices},
    resources::texture_resource::{DecodedImage, TextureResource},
};
use crate::wgpu_utils::{binding_types, UniformBuffer};

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::vertex::{LineVertex, PanelVertex};

const PANEL_PIPELINE: &str = "Panel";
const OUTLINE_PIPELINE: &str = "Outline";

/// Per-frame values shared by both pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    /// x: 1 when the fragment shader must encode sRGB itself.
    pub options: [u32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
}

struct PanelResources {
    transform: UniformBuffer<TransformUniform>,
    transform_bind_group: wgpu::BindGroup,
    outline_transform: UniformBuffer<TransformUniform>,
    outline_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    _texture: TextureResource,
}

struct PanelMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    edges: wgpu::Buffer,
    edge_vertex_count: u32,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    capabilities: RenderCapabilities,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,
    globals: UniformBuffer<GlobalUniform>,
    globals_bind_group: wgpu::BindGroup,
    transform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    max_texture_dimension: u32,
    mesh: Option<PanelMesh>,
    panels: Vec<PanelResources>,
}

impl RenderEngine {
    /// Creates a renderer for the given window
    ///
    /// Negotiates the surface format and anisotropy once, then builds the
    /// panel and outline pipelines. Fails if no adapter, device or surface
    /// format is available.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GalleryError::Adapter(e.to_string()))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let max_texture_dimension = adapter.limits().max_texture_dimension_2d;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: max_texture_dimension,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let capabilities = color::negotiate(
            &surface_capabilities.formats,
            adapter.get_downlevel_capabilities().flags,
        )
        .ok_or(GalleryError::NoSurfaceFormat)?;
        log::info!(
            "Surface format {:?}, colour pipeline {:?}, anisotropy x{}",
            capabilities.surface_format,
            capabilities.color,
            capabilities.max_anisotropy
        );

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: capabilities.surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, config.width, config.height, "depth_texture");

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[binding_types::entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                binding_types::uniform(),
            )],
        });
        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transform Layout"),
            entries: &[binding_types::entry(
                0,
                wgpu::ShaderStages::VERTEX,
                binding_types::uniform(),
            )],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Artwork Layout"),
            entries: &[
                binding_types::entry(0, wgpu::ShaderStages::FRAGMENT, binding_types::texture_2d()),
                binding_types::entry(
                    1,
                    wgpu::ShaderStages::FRAGMENT,
                    binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                ),
            ],
        });

        let globals = UniformBuffer::new_with_data(
            &device,
            &GlobalUniform {
                view_proj: CameraUniform::default().view_proj,
                options: [capabilities.color.shader_flag(), 0, 0, 0],
            },
        );
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.binding_resource(),
            }],
        });

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("panel", include_str!("panel.wgsl"));
        pipeline_manager.load_shader("outline", include_str!("outline.wgsl"));

        pipeline_manager.register_pipeline(
            PANEL_PIPELINE,
            PipelineConfig::default()
                .with_label("PANEL")
                .with_shader("panel")
                .with_vertex_layouts(vec![PanelVertex::desc()])
                .with_depth(TextureResource::DEPTH_FORMAT, true)
                .with_color_format(capabilities.surface_format)
                .with_bind_group_layouts(vec![
                    globals_layout.clone(),
                    transform_layout.clone(),
                    texture_layout.clone(),
                ]),
        );
        pipeline_manager.register_pipeline(
            OUTLINE_PIPELINE,
            PipelineConfig::default()
                .with_label("OUTLINE")
                .with_shader("outline")
                .with_vertex_layouts(vec![LineVertex::desc()])
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_cull_mode(None)
                .with_depth(TextureResource::DEPTH_FORMAT, false)
                .with_color_format(capabilities.surface_format)
                .with_bind_group_layouts(vec![globals_layout, transform_layout.clone()]),
        );
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{error}");
            }
        }

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            capabilities,
            depth_texture,
            pipeline_manager,
            globals,
            globals_bind_group,
            transform_layout,
            texture_layout,
            max_texture_dimension,
            mesh: None,
            panels: Vec::new(),
        })
    }

    /// Creates the shared panel mesh and per-panel textures and transforms.
    ///
    /// Identifiers missing from `images` get the placeholder texture.
    pub fn upload_gallery(
        &mut self,
        scene: &GalleryScene,
        panel: &PanelSize,
        images: &HashMap<String, DecodedImage>,
    ) {
        let geometry = generate_panel(panel.width, panel.height, panel.depth);
        let edges = to_line_vertices(&generate_box_edges(panel.width, panel.height, panel.depth));

        self.mesh = Some(PanelMesh {
            vertices: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Panel Vertices"),
                contents: bytemuck::cast_slice(&geometry.to_panel_vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            indices: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Panel Indices"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: geometry.indices.len() as u32,
            edges: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Panel Edges"),
                contents: bytemuck::cast_slice(&edges),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            edge_vertex_count: edges.len() as u32,
        });

        let placeholder = DecodedImage::placeholder();
        self.panels = scene
            .objects()
            .iter()
            .map(|object| {
                let image = images.get(&object.image).unwrap_or(&placeholder);
                let image = image.clone().limited_to(self.max_texture_dimension);
                self.create_panel_resources(&object.image, &image)
            })
            .collect();
        self.sync_transforms(scene);

        log::info!("Uploaded {} panel textures", self.panels.len());
    }

    fn create_panel_resources(&self, label: &str, image: &DecodedImage) -> PanelResources {
        let texture = TextureResource::from_image(
            &self.device,
            &self.queue,
            image,
            label,
            self.capabilities.max_anisotropy,
        );
        let texture_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        let identity = TransformUniform {
            model: convert_matrix4_to_array(Matrix4::identity()),
        };
        let transform = UniformBuffer::new_with_data(&self.device, &identity);
        let outline_transform = UniformBuffer::new_with_data(&self.device, &identity);
        let transform_bind_group = self.transform_bind_group(&transform);
        let outline_bind_group = self.transform_bind_group(&outline_transform);

        PanelResources {
            transform,
            transform_bind_group,
            outline_transform,
            outline_bind_group,
            texture_bind_group,
            _texture: texture,
        }
    }

    fn transform_bind_group(&self, buffer: &UniformBuffer<TransformUniform>) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout: &self.transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.binding_resource(),
            }],
        })
    }

    /// Copies every panel's and outline's world transform to the GPU.
    pub fn sync_transforms(&mut self, scene: &GalleryScene) {
        for (object, resources) in scene.objects().iter().zip(self.panels.iter_mut()) {
            let panel = scene.graph.world_transform(object.node);
            let outline = scene.graph.world_transform(object.outline);
            resources.transform.update_content(
                &self.queue,
                TransformUniform {
                    model: convert_matrix4_to_array(panel),
                },
            );
            resources.outline_transform.update_content(
                &self.queue,
                TransformUniform {
                    model: convert_matrix4_to_array(outline),
                },
            );
        }
    }

    /// Updates the camera matrix for the next frame
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        self.globals.update_content(
            &self.queue,
            GlobalUniform {
                view_proj: camera_uniform.view_proj,
                options: [self.capabilities.color.shader_flag(), 0, 0, 0],
            },
        );
    }

    /// Renders a frame and composites the UI callback on top
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(&mut self, ui_callback: F)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Surface acquire timed out; skipping frame");
                return;
            }
            Err(e) => {
                log::error!("Failed to acquire surface texture: {e}");
                return;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Gallery Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(mesh) = &self.mesh {
                render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

                if let Some(pipeline) = self.pipeline_manager.get_pipeline(PANEL_PIPELINE) {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                    render_pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                    for panel in &self.panels {
                        render_pass.set_bind_group(1, &panel.transform_bind_group, &[]);
                        render_pass.set_bind_group(2, &panel.texture_bind_group, &[]);
                        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                    }
                }

                if let Some(pipeline) = self.pipeline_manager.get_pipeline(OUTLINE_PIPELINE) {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_vertex_buffer(0, mesh.edges.slice(..));
                    for panel in &self.panels {
                        render_pass.set_bind_group(1, &panel.outline_bind_group, &[]);
                        render_pass.draw(0..mesh.edge_vertex_count, 0..1);
                    }
                }
            }
        }

        ui_callback(
            &self.device,
            &self.queue,
            &mut encoder,
            &surface_texture_view,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, width, height, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.capabilities.surface_format
    }

    pub fn color_pipeline(&self) -> ColorPipeline {
        self.capabilities.color
    }

    /// Largest texture side the device accepts.
    pub fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }
}
