//! GPU renderer for the snow layers.
//!
//! The field positions live in one instance buffer shared by every layer.
//! Each layer has its own uniform buffer and bind group (transform, color,
//! size, sprite). Sprites are uploaded once their load resolves; until then
//! a transparent placeholder is bound. Draws directly into egui's render
//! pass via CallbackTrait.

use bytemuck::{Pod, Zeroable};
use egui_wgpu::wgpu::{self, util::DeviceExt};
use tracing::{debug, info};

use crate::core::sprite::{SpriteId, SpriteImage, SpriteStore, SPRITE_COUNT};
use crate::core::{Camera, Fog, ParticleLayer};

/// Camera uniform block (must match `Camera` in shader.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub fog_density: f32,
    pub _pad: f32,
    pub fog_color: [f32; 4],
}

impl CameraUniforms {
    /// `viewport` is the output surface size in physical pixels.
    pub fn new(camera: &Camera, fog: &Fog, viewport: [f32; 2]) -> Self {
        let [r, g, b] = fog.color;
        Self {
            view_proj: camera.view_projection().into(),
            view: camera.view().into(),
            viewport,
            fog_density: fog.density,
            _pad: 0.0,
            fog_color: [r, g, b, 1.0],
        }
    }
}

/// Per-layer uniform block (must match `Layer` in shader.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LayerUniforms {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub size: f32,
    pub use_map: f32,
    pub _pad: [f32; 2],
}

/// Everything the renderer needs about one layer for one frame.
#[derive(Clone, Copy, Debug)]
pub struct LayerFrame {
    pub uniforms: LayerUniforms,
    pub map: Option<SpriteId>,
    /// Material flagged a map change this frame
    pub rebind: bool,
}

impl From<&ParticleLayer> for LayerFrame {
    fn from(layer: &ParticleLayer) -> Self {
        let material = &layer.material;
        Self {
            uniforms: LayerUniforms {
                model: layer.rotation.matrix().into(),
                color: material.color.to_rgba(1.0),
                size: material.size,
                use_map: if material.map.is_some() { 1.0 } else { 0.0 },
                _pad: [0.0; 2],
            },
            map: material.map,
            rebind: material.needs_update,
        }
    }
}

/// What a layer's bind group currently points at.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Binding {
    map: Option<SpriteId>,
    uploaded: bool,
}

struct LayerSlot {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    binding: Binding,
}

/// GPU renderer for the snow field.
pub struct SnowRenderer {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    layer_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    placeholder: wgpu::TextureView,
    sprite_views: Vec<Option<wgpu::TextureView>>,
    sprites: SpriteStore,
    layers: Vec<LayerSlot>,
    position_buffer: wgpu::Buffer,
    point_count: u32,
}

impl SnowRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
        positions: &[[f32; 3]],
        sprites: SpriteStore,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("snow_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("snow_camera_layout"),
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
        });

        let layer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("snow_layer_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("snow_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &layer_layout],
            push_constant_ranges: &[],
        });

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Zero,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("snow_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3, // position
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Screen-space quads, 6 vertices per instance. PointList is
            // capped at 1px on most backends.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // No depth test: overlapping layers blend instead of occluding
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("snow_camera_uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("snow_camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("snow_sprite_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Unresolved sprites render as nothing
        let placeholder = device
            .create_texture_with_data(
                queue,
                &sprite_texture_descriptor("snow_sprite_placeholder", 1, 1),
                wgpu::util::TextureDataOrder::LayerMajor,
                &[0, 0, 0, 0],
            )
            .create_view(&wgpu::TextureViewDescriptor::default());

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("snow_positions"),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX,
        });

        info!(points = positions.len(), "Snow renderer created");

        Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            layer_layout,
            sampler,
            placeholder,
            sprite_views: (0..SPRITE_COUNT).map(|_| None).collect(),
            sprites,
            layers: Vec::new(),
            position_buffer,
            point_count: positions.len() as u32,
        }
    }

    /// Upload every sprite that resolved since the last call.
    fn upload_resolved_sprites(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        for id in SpriteId::ALL {
            if self.sprite_views[id.idx()].is_some() {
                continue;
            }
            if let Some(image) = self.sprites.get(id).image() {
                self.sprite_views[id.idx()] = Some(upload_sprite(device, queue, id, image));
                debug!(sprite = %id, "Sprite uploaded to GPU");
            }
        }
    }

    fn layer_bind_group(
        &self,
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        map: Option<SpriteId>,
    ) -> wgpu::BindGroup {
        let view = map
            .and_then(|id| self.sprite_views[id.idx()].as_ref())
            .unwrap_or(&self.placeholder);
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("snow_layer_bind_group"),
            layout: &self.layer_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Write this frame's uniforms, rebinding any layer whose sprite
    /// changed or finished loading.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &CameraUniforms,
        layers: &[LayerFrame],
    ) {
        self.upload_resolved_sprites(device, queue);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));

        while self.layers.len() < layers.len() {
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("snow_layer_uniforms_{}", self.layers.len())),
                size: std::mem::size_of::<LayerUniforms>() as u64,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
                mapped_at_creation: false,
            });
            let bind_group = self.layer_bind_group(device, &uniform_buffer, None);
            self.layers.push(LayerSlot {
                uniform_buffer,
                bind_group,
                binding: Binding {
                    map: None,
                    uploaded: false,
                },
            });
        }
        self.layers.truncate(layers.len());

        for (i, frame) in layers.iter().enumerate() {
            let wanted = Binding {
                map: frame.map,
                uploaded: frame
                    .map
                    .is_some_and(|id| self.sprite_views[id.idx()].is_some()),
            };
            if frame.rebind || self.layers[i].binding != wanted {
                let bind_group =
                    self.layer_bind_group(device, &self.layers[i].uniform_buffer, frame.map);
                let slot = &mut self.layers[i];
                slot.bind_group = bind_group;
                slot.binding = wanted;
            }
            queue.write_buffer(
                &self.layers[i].uniform_buffer,
                0,
                bytemuck::bytes_of(&frame.uniforms),
            );
        }
    }

    /// Draw all layers in insertion order.
    pub fn paint(&self, render_pass: &mut wgpu::RenderPass<'static>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        for slot in &self.layers {
            render_pass.set_bind_group(1, &slot.bind_group, &[]);
            render_pass.draw(0..6, 0..self.point_count);
        }
    }
}

fn sprite_texture_descriptor(label: &str, width: u32, height: u32) -> wgpu::TextureDescriptor<'_> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }
}

fn upload_sprite(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    id: SpriteId,
    image: &SpriteImage,
) -> wgpu::TextureView {
    let label = id.to_string();
    let descriptor = sprite_texture_descriptor(&label, image.width, image.height);
    let texture = device.create_texture(&descriptor);
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        descriptor.size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Callback for egui integration
pub struct SnowCallback {
    pub camera: CameraUniforms,
    pub layers: Vec<LayerFrame>,
}

impl egui_wgpu::CallbackTrait for SnowCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        _encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(renderer): Option<&mut SnowRenderer> = callback_resources.get_mut() else {
            return vec![];
        };
        renderer.prepare(device, queue, &self.camera, &self.layers);
        vec![]
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        callback_resources: &egui_wgpu::CallbackResources,
    ) {
        if let Some(renderer) = callback_resources.get::<SnowRenderer>() {
            renderer.paint(render_pass);
        }
    }
}
