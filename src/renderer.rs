// wgpu renderer: instanced decorations plus textured photo planes, with the
// HUD composited on top.
//
// Frame layout:
//   1. Collect instances from the ECS, grouped by ShapeKind
//   2. One instanced draw per non-empty mesh kind
//   3. One draw for every photo frame, then one per photo texture
//   4. egui HUD pass (load, no depth)

use std::sync::Arc;

use anyhow::Context;
use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::engine::camera::OrbitCamera;
use crate::engine::debug_overlay::{HudOverlay, HudStats};
use crate::engine::mesh::{
    extruded_star, gift_box, octahedron, triangulate_smooth, uv_sphere, GpuVertex, PhotoVertex,
    RenderMesh, PHOTO_QUAD_INDICES, PHOTO_QUAD_VERTICES,
};
use crate::engine::{Color, PhotoCard, ShapeKind, Transform};
use crate::photos::PhotoImage;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.008, g: 0.012, b: 0.035, a: 1.0 };
const LIGHT_DIR: Vec3 = Vec3::new(-0.4, -1.0, -0.6);
const FRAME_TINT: [f32; 4] = [0.97, 0.95, 0.90, 1.0];
/// Frame border, as a fraction of the photo's half-height.
const FRAME_BORDER: f32 = 0.08;
const INITIAL_INSTANCES: usize = 4096;
const INITIAL_PHOTO_INSTANCES: usize = 64;

// ============================================================================
// INSTANCE + UNIFORM DATA
// ============================================================================

/// Per-instance data shared by both pipelines. `color.a` is the emissive
/// factor for meshes and plain alpha for photos.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl InstanceData {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4
    ];

    fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self { model: model.to_cols_array_2d(), color }
    }

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    /// xyz = camera eye, w = elapsed seconds
    eye_time:  [f32; 4],
    /// xyz = direction the light travels
    light_dir: [f32; 4],
}

// ============================================================================
// GPU RESOURCES
// ============================================================================

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer:  wgpu::Buffer,
    index_count:   u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, mesh: &RenderMesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self { vertex_buffer, index_buffer, index_count: mesh.index_count() as u32 }
    }
}

/// Texture kept alive alongside the bind group that samples it.
struct PhotoTexture {
    _texture:   wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Growable instance buffer.
struct InstanceBuffer {
    buffer:   wgpu::Buffer,
    capacity: usize,
    label:    &'static str,
}

impl InstanceBuffer {
    fn new(device: &wgpu::Device, capacity: usize, label: &'static str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, capacity, label }
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[InstanceData]) {
        if data.len() > self.capacity {
            let capacity = data.len().next_power_of_two();
            log::debug!("{}: growing to {} instances", self.label, capacity);
            *self = Self::new(device, capacity, self.label);
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
    }
}

// ============================================================================
// RENDERER
// ============================================================================

pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_view: wgpu::TextureView,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    mesh_pipeline: wgpu::RenderPipeline,
    /// Indexed by `ShapeKind::index()`.
    meshes: Vec<GpuMesh>,
    instances: InstanceBuffer,

    photo_pipeline: wgpu::RenderPipeline,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    photo_instances: InstanceBuffer,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Indexed by photo slot.
    photo_textures: Vec<PhotoTexture>,
    frame_texture: PhotoTexture,

    pub hud: HudOverlay,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;
        log::info!("GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("requesting GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        // ── Uniforms ────────────────────────────────────────────────────────
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                eye_time: [0.0; 4],
                light_dir: LIGHT_DIR.normalize().extend(0.0).to_array(),
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("uniform_bind_group_layout"),
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        // ── Instanced mesh pipeline ─────────────────────────────────────────
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Instanced Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_instanced.wgsl").into()),
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = create_pipeline(
            &device,
            "Mesh Pipeline",
            &mesh_layout,
            &mesh_shader,
            &[GpuVertex::desc(), InstanceData::desc()],
            config.format,
            Some(wgpu::Face::Back),
        );

        let meshes = ShapeKind::ALL
            .iter()
            .map(|kind| {
                let poly = match kind {
                    ShapeKind::Bauble => uv_sphere(12, 18),
                    ShapeKind::Gift   => gift_box(Vec3::new(1.0, 0.85, 1.0)),
                    ShapeKind::Star   => extruded_star(0.45, 0.35),
                    ShapeKind::Spark  => octahedron(),
                };
                GpuMesh::upload(&device, &triangulate_smooth(&poly), &format!("{kind:?} mesh"))
            })
            .collect();

        // ── Photo pipeline ──────────────────────────────────────────────────
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("photo_texture_layout"),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Photo Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let photo_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Photo Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_photo.wgsl").into()),
        });

        let photo_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Photo Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        // Billboards can be seen edge-on while turning, so no culling.
        let photo_pipeline = create_pipeline(
            &device,
            "Photo Pipeline",
            &photo_layout,
            &photo_shader,
            &[PhotoVertex::desc(), InstanceData::desc()],
            config.format,
            None,
        );

        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Photo Quad Vertices"),
            contents: bytemuck::cast_slice(PHOTO_QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Photo Quad Indices"),
            contents: bytemuck::cast_slice(PHOTO_QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let frame_texture = create_photo_texture(
            &device, &queue, &texture_layout, &sampler, 1, 1, &[255, 255, 255, 255], "Frame Texture",
        );

        let instances = InstanceBuffer::new(&device, INITIAL_INSTANCES, "Instance Buffer");
        let photo_instances =
            InstanceBuffer::new(&device, INITIAL_PHOTO_INSTANCES, "Photo Instance Buffer");

        let hud = HudOverlay::new(&window, &device, config.format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth_view,
            uniform_buffer,
            uniform_bind_group,
            mesh_pipeline,
            meshes,
            instances,
            photo_pipeline,
            quad_vertex_buffer,
            quad_index_buffer,
            photo_instances,
            texture_layout,
            sampler,
            photo_textures: Vec::new(),
            frame_texture,
            hud,
        })
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn aspect(&self) -> f32 {
        self.size.width.max(1) as f32 / self.size.height.max(1) as f32
    }

    /// Largest photo side the device can hold as one texture.
    pub fn max_texture_side(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    /// Upload a decoded photo. Returns its texture slot, which matches the
    /// library slot as long as both are appended and cleared together.
    pub fn add_photo_texture(&mut self, photo: &PhotoImage) -> usize {
        let label = format!("Photo {}", self.photo_textures.len());
        let texture = create_photo_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            photo.width,
            photo.height,
            &photo.rgba,
            &label,
        );
        self.photo_textures.push(texture);
        self.photo_textures.len() - 1
    }

    pub fn clear_photo_textures(&mut self) {
        self.photo_textures.clear();
    }

    /// Draw one frame. Fills `stats.draw_calls` before the HUD is drawn.
    pub fn render(
        &mut self,
        world: &mut World,
        camera: &OrbitCamera,
        elapsed: f32,
        stats: &mut HudStats,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // ── Collect instances from ECS BEFORE creating render passes ────────
        let mut by_kind: [Vec<InstanceData>; 4] = Default::default();
        let mut query = world.query::<(&Transform, &Color, &ShapeKind)>();
        for (transform, color, kind) in query.iter(world) {
            by_kind[kind.index()].push(InstanceData::new(transform.matrix(), color.to_array()));
        }

        let mut mesh_ranges: [std::ops::Range<u32>; 4] = Default::default();
        let mut mesh_instances = Vec::with_capacity(by_kind.iter().map(Vec::len).sum());
        for (i, group) in by_kind.iter().enumerate() {
            let start = mesh_instances.len() as u32;
            mesh_instances.extend_from_slice(group);
            mesh_ranges[i] = start..mesh_instances.len() as u32;
        }

        // Frames first (one draw), then photos (one draw per texture).
        let mut frames = Vec::new();
        let mut photos = Vec::new();
        let mut photo_query = world.query::<(&Transform, &PhotoCard)>();
        for (transform, card) in photo_query.iter(world) {
            if card.slot >= self.photo_textures.len() {
                continue;
            }
            let model = transform.matrix();
            let border = Vec3::new(1.0 + FRAME_BORDER / card.aspect.max(0.05), 1.0 + FRAME_BORDER, 1.0);
            let frame = model
                * Mat4::from_translation(Vec3::new(0.0, 0.0, -0.02))
                * Mat4::from_scale(border);
            frames.push(InstanceData::new(frame, FRAME_TINT));
            photos.push((card.slot, InstanceData::new(model, [1.0; 4])));
        }
        let frame_count = frames.len() as u32;
        let mut photo_data = frames;
        photo_data.extend(photos.iter().map(|(_, data)| *data));

        self.instances.write(&self.device, &self.queue, &mesh_instances);
        self.photo_instances.write(&self.device, &self.queue, &photo_data);

        let uniforms = Uniforms {
            view_proj: camera.view_projection(self.aspect()).to_cols_array_2d(),
            eye_time: camera.eye().extend(elapsed).to_array(),
            light_dir: LIGHT_DIR.normalize().extend(0.0).to_array(),
        };
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let mut draw_calls = 0u32;
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instances.buffer.slice(..));
            for (mesh, range) in self.meshes.iter().zip(mesh_ranges.iter()) {
                if range.is_empty() {
                    continue;
                }
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, range.clone());
                draw_calls += 1;
            }

            if frame_count > 0 {
                let quad_indices = PHOTO_QUAD_INDICES.len() as u32;
                render_pass.set_pipeline(&self.photo_pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.photo_instances.buffer.slice(..));
                render_pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);

                render_pass.set_bind_group(1, &self.frame_texture.bind_group, &[]);
                render_pass.draw_indexed(0..quad_indices, 0, 0..frame_count);
                draw_calls += 1;

                for (i, (slot, _)) in photos.iter().enumerate() {
                    let instance = frame_count + i as u32;
                    render_pass.set_bind_group(1, &self.photo_textures[*slot].bind_group, &[]);
                    render_pass.draw_indexed(0..quad_indices, 0, instance..instance + 1);
                    draw_calls += 1;
                }
            }
        }

        stats.draw_calls = draw_calls;
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        self.hud.render(
            &self.device,
            &self.queue,
            &mut encoder,
            &self.window,
            &view,
            &screen_descriptor,
            stats,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    format: wgpu::TextureFormat,
    cull_mode: Option<wgpu::Face>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

#[allow(clippy::too_many_arguments)]
fn create_photo_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    rgba: &[u8],
    label: &str,
) -> PhotoTexture {
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(label),
    });

    PhotoTexture { _texture: texture, bind_group }
}
