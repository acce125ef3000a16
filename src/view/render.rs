use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::error::{AppError, RenderError};
use crate::model::{CameraView, Projection, World};
use crate::ui::{self, FpsCounter, HudInfo};
use crate::view::gpu_init::GpuContext;
use crate::view::mesh::{self, MeshBuffer};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 };

/// Draws the scene from a camera and presents it.
pub trait SceneRenderer {
    /// New drawable size in physical pixels. Zero sizes (minimized) are ignored.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame as seen from `view` and present it.
    fn render(&mut self, view: &CameraView) -> Result<(), RenderError>;
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

struct CameraResources {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("camera_buffer"),
        contents: bytemuck::bytes_of(&CameraUniform { view_proj: glam::Mat4::IDENTITY.to_cols_array_2d() }),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
    });

    CameraResources { buffer, bind_group_layout, bind_group }
}

/// Same shader for lines and cubes; only the topology differs.
fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[mesh::vertex_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
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
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// [`SceneRenderer`] drawing the grid, axes and cubes with wgpu, with an egui HUD on top.
pub struct WgpuRenderer {
    window: Arc<Window>,
    gpu: GpuContext,

    line_pipeline: wgpu::RenderPipeline,
    cube_pipeline: wgpu::RenderPipeline,
    camera: CameraResources,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    lines: MeshBuffer,
    cubes: MeshBuffer,
    projection: Projection,

    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    fps: FpsCounter,
    last_frame: Instant,
    cursor_captured: bool,
}

impl WgpuRenderer {
    pub async fn new(window: Arc<Window>, world: &World) -> Result<Self, AppError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::new(&instance, surface, size.width, size.height).await?;
        let device = gpu.device.clone();

        let camera = create_camera_resources(&device);
        let (depth_texture, depth_view) = create_depth_texture(&device, gpu.config.width, gpu.config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/scene.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&camera.bind_group_layout],
            push_constant_ranges: &[],
        });
        let line_pipeline = create_scene_pipeline(
            &device,
            gpu.format,
            &pipeline_layout,
            &shader,
            wgpu::PrimitiveTopology::LineList,
            "line_pipeline",
        );
        let cube_pipeline = create_scene_pipeline(
            &device,
            gpu.format,
            &pipeline_layout,
            &shader,
            wgpu::PrimitiveTopology::TriangleList,
            "cube_pipeline",
        );

        let lines = MeshBuffer::upload(&device, &world.line_mesh(), "lines");
        let cubes = MeshBuffer::upload(&device, &world.cube_mesh(), "cubes");
        info!(cubes = world.cubes.len(), line_indices = lines.index_count, "scene geometry uploaded");

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, gpu.format, egui_wgpu::RendererOptions::default());

        let projection = Projection::new(gpu.config.width, gpu.config.height);

        Ok(Self {
            window,
            gpu,
            line_pipeline,
            cube_pipeline,
            camera,
            _depth_texture: depth_texture,
            depth_view,
            lines,
            cubes,
            projection,
            egui_ctx,
            egui_state,
            egui_renderer,
            fps: FpsCounter::default(),
            last_frame: Instant::now(),
            cursor_captured: false,
        })
    }

    /// Feed a window event to the HUD. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(self.window.as_ref(), event).consumed
    }

    pub fn set_cursor_captured(&mut self, captured: bool) {
        self.cursor_captured = captured;
    }

    fn acquire_frame(&mut self) -> Result<wgpu::SurfaceTexture, RenderError> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                Ok(self.gpu.surface.get_current_texture()?)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn run_hud(&mut self, view: &CameraView) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let info = HudInfo {
            fps: self.fps.tick(dt),
            view: *view,
            cursor_captured: self.cursor_captured,
        };

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let output = self.egui_ctx.run(raw_input, |ctx| ui::build_ui(ctx, &info));
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        let primitives = self.egui_ctx.tessellate(output.shapes, output.pixels_per_point);
        (primitives, output.textures_delta)
    }
}

impl SceneRenderer for WgpuRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        if !self.gpu.resize(width, height) {
            return;
        }
        let (depth_texture, depth_view) = create_depth_texture(&self.gpu.device, width, height);
        self._depth_texture = depth_texture;
        self.depth_view = depth_view;
        self.projection.set_aspect(width, height);
    }

    fn render(&mut self, view: &CameraView) -> Result<(), RenderError> {
        let frame = self.acquire_frame()?;

        let uniform = CameraUniform { view_proj: self.projection.view_proj(view).to_cols_array_2d() };
        self.gpu.queue.write_buffer(&self.camera.buffer, 0, bytemuck::bytes_of(&uniform));

        let (primitives, textures_delta) = self.run_hud(view);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        let target = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_bind_group(0, &self.camera.bind_group, &[]);

            rp.set_pipeline(&self.line_pipeline);
            self.lines.draw(&mut rp);

            rp.set_pipeline(&self.cube_pipeline);
            self.cubes.draw(&mut rp);
        }

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
