//! Main renderer managing wgpu state and the cloud-field render stages.
//!
//! Every persistent resource (pipelines, buffers, the two procedural
//! textures) is created in [`Renderer::new`] and never reallocated; the
//! steady-state frame loop only records command buffers against these
//! read-only handles. The density and normal textures are the sole per-frame
//! mutable state and are rewritten in strict pass order each frame.

use crate::{
    camera::{DomeUniforms, SkyCamera},
    mesh::{Mesh, MeshBuffers},
    pipeline::{
        create_blit_bind_group_layout, create_blit_pipeline, create_cloud_shader,
        create_density_bind_group_layout, create_density_pipeline, create_dome_bind_group_layout,
        create_dome_pipeline, create_normal_bind_group_layout, create_normal_pipeline, validated,
        workgroup_count, WORKGROUP_SIZE,
    },
    texture::{Texture, DENSITY_FORMAT, NORMAL_FORMAT},
    vertex::FULLSCREEN_QUAD,
};
use anyhow::{anyhow, ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Sky color the final blit composites the clouds over.
const SKY_CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.25,
    g: 0.45,
    b: 0.75,
    a: 1.0,
};

/// What the blit pass presents each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Shaded skydome composited over the sky color.
    Clouds,
    /// Raw density map in greyscale (debug visualization).
    DensityMap,
}

/// Fixed parameters of the cloud field and shading, chosen at startup.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Density/normal texture width in pixels.
    pub field_width: u32,
    /// Density/normal texture height in pixels.
    pub field_height: u32,
    /// Noise octave count for the density shader.
    pub octaves: u32,
    /// Sun direction in world space.
    pub sun_direction: Vec3,
    /// Sun intensity multiplier.
    pub sun_intensity: f32,
    /// Gain applied to density before it becomes cloud alpha.
    pub alpha_gain: f32,
    /// Block until the GPU finishes each frame before starting the next.
    /// Serializes reuse of the two procedural textures at some throughput
    /// cost; the textures are not double-buffered.
    pub wait_for_gpu: bool,
}

impl RenderSettings {
    /// Reject field dimensions the dispatch math cannot cover. A zero
    /// dimension would dispatch zero workgroups and leave the density map
    /// unwritten while the rest of the chain carries on, so it is refused
    /// before any GPU resource is sized from these values.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.field_width > 0 && self.field_height > 0,
            "field resolution {}x{} must be nonzero in both dimensions",
            self.field_width,
            self.field_height,
        );
        Ok(())
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            field_width: 2048,
            field_height: 2048,
            octaves: 6,
            sun_direction: Vec3::new(0.35, 0.7, 0.25),
            sun_intensity: 1.0,
            alpha_gain: 1.4,
            wait_for_gpu: false,
        }
    }
}

/// Field shader uniform (must match clouds.wgsl FieldParams).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FieldParams {
    size: [u32; 2],
    octaves: u32,
    table_len: u32,
}

/// Blit shader uniform (must match blit.wgsl BlitParams).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct BlitParams {
    greyscale: u32,
    _pad: [u32; 3],
}

/// Per-frame failures. Initialization failures use `anyhow` instead because
/// they are fatal and carry stage context.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to acquire surface texture: {0}")]
    SurfaceAcquire(#[from] wgpu::SurfaceError),
}

/// Main renderer state.
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    // One pipeline per stage, immutable after init
    density_pipeline: wgpu::ComputePipeline,
    normal_pipeline: wgpu::ComputePipeline,
    dome_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,

    // Bind groups and layouts
    density_bind_group: wgpu::BindGroup,
    normal_bind_group: wgpu::BindGroup,
    dome_bind_group: wgpu::BindGroup,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    blit_scene_bind_group: wgpu::BindGroup,
    blit_density_bind_group: wgpu::BindGroup,

    // Persistent buffers
    dome_uniform_buffer: wgpu::Buffer,
    blit_composite_buffer: wgpu::Buffer,
    quad_buffer: wgpu::Buffer,
    dome_mesh: Mesh,

    // Persistent textures
    density_map: Texture,
    normal_map: Texture,
    scene_color: Texture,
    sampler: wgpu::Sampler,

    camera: SkyCamera,
    settings: RenderSettings,
}

impl Renderer {
    /// Create the renderer and every persistent GPU resource. Fatal on any
    /// failure: there is no degraded mode if the device or a pipeline cannot
    /// be created.
    pub async fn new(
        window: Arc<Window>,
        settings: RenderSettings,
        dome: MeshBuffers<'_>,
        noise_phases: &[f32],
    ) -> Result<Self> {
        settings.validate()?;
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        // Bilinear sampling of the R32Float density map needs this feature.
        let required_features = wgpu::Features::FLOAT32_FILTERABLE;
        if !adapter.features().contains(required_features) {
            return Err(anyhow!(
                "adapter '{}' does not support FLOAT32_FILTERABLE",
                adapter.get_info().name
            ));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features,
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Persistent procedural textures, rewritten every frame by the two
        // compute stages and read by the dome pass in the same frame.
        let density_map = Texture::create_storage(
            &device,
            settings.field_width,
            settings.field_height,
            DENSITY_FORMAT,
            "Density Map",
        );
        let normal_map = Texture::create_storage(
            &device,
            settings.field_width,
            settings.field_height,
            NORMAL_FORMAT,
            "Normal Map",
        );
        let scene_color = Texture::create_render_target(
            &device,
            config.width,
            config.height,
            config.format,
            "Scene Color",
        );
        let sampler = Texture::linear_sampler(&device, "Cloud Sampler");

        // Noise phase table: generated once on the CPU, uploaded once.
        let noise_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Noise Phase Table"),
            contents: bytemuck::cast_slice(noise_phases),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let field_params = FieldParams {
            size: [settings.field_width, settings.field_height],
            octaves: settings.octaves,
            table_len: noise_phases.len() as u32,
        };
        let field_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Field Params"),
            contents: bytemuck::cast_slice(&[field_params]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let mut camera = SkyCamera::default();
        camera.set_aspect(config.width, config.height);
        let dome_uniforms = DomeUniforms::new(
            &camera,
            settings.sun_direction,
            settings.sun_intensity,
            settings.alpha_gain,
        );
        let dome_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dome Uniform Buffer"),
            contents: bytemuck::cast_slice(&[dome_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let blit_composite_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blit Composite Params"),
            contents: bytemuck::cast_slice(&[BlitParams {
                greyscale: 0,
                _pad: [0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let blit_greyscale_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blit Greyscale Params"),
            contents: bytemuck::cast_slice(&[BlitParams {
                greyscale: 1,
                _pad: [0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        // Fullscreen quad: six vertices, two triangles, no index buffer.
        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fullscreen Quad"),
            contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let dome_mesh =
            Mesh::from_raw_parts(&device, dome).context("dome mesh contract violated")?;

        // Pipelines, each inside a validation scope so a bad shader or entry
        // point reports the offending stage before we abort.
        let cloud_shader = validated(&device, "cloud field shader", || {
            create_cloud_shader(&device)
        })
        .await?;
        let density_layout = create_density_bind_group_layout(&device);
        let normal_layout = create_normal_bind_group_layout(&device);
        let dome_layout = create_dome_bind_group_layout(&device);
        let blit_bind_group_layout = create_blit_bind_group_layout(&device);

        let density_pipeline = validated(&device, "generate_cloud_density_map", || {
            create_density_pipeline(&device, &cloud_shader, &density_layout)
        })
        .await?;
        let normal_pipeline = validated(&device, "generate_normal_map", || {
            create_normal_pipeline(&device, &cloud_shader, &normal_layout)
        })
        .await?;
        let dome_pipeline = validated(&device, "draw_skydome", || {
            create_dome_pipeline(&device, config.format, &dome_layout)
        })
        .await?;
        let blit_pipeline = validated(&device, "texture_passthrough", || {
            create_blit_pipeline(&device, config.format, &blit_bind_group_layout)
        })
        .await?;

        let density_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Density Bind Group"),
            layout: &density_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: field_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: noise_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&density_map.view),
                },
            ],
        });
        let normal_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Normal Bind Group"),
            layout: &normal_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: field_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&density_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&normal_map.view),
                },
            ],
        });
        let dome_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Dome Bind Group"),
            layout: &dome_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: dome_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&density_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let blit_scene_bind_group = Self::create_blit_bind_group(
            &device,
            &blit_bind_group_layout,
            &scene_color.view,
            &sampler,
            &blit_composite_buffer,
            "Blit Scene Bind Group",
        );
        let blit_density_bind_group = Self::create_blit_bind_group(
            &device,
            &blit_bind_group_layout,
            &density_map.view,
            &sampler,
            &blit_greyscale_buffer,
            "Blit Density Bind Group",
        );

        log::info!(
            "Renderer ready: {}x{} field, {} dome indices, {} noise phases",
            settings.field_width,
            settings.field_height,
            dome_mesh.num_indices,
            noise_phases.len(),
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            density_pipeline,
            normal_pipeline,
            dome_pipeline,
            blit_pipeline,
            density_bind_group,
            normal_bind_group,
            dome_bind_group,
            blit_bind_group_layout,
            blit_scene_bind_group,
            blit_density_bind_group,
            dome_uniform_buffer,
            blit_composite_buffer,
            quad_buffer,
            dome_mesh,
            density_map,
            normal_map,
            scene_color,
            sampler,
            camera,
            settings,
        })
    }

    fn create_blit_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        source: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    /// Handle window resize: reconfigure the surface, rebuild the offscreen
    /// scene target, and refresh the camera aspect. The procedural textures
    /// keep their fixed internal resolution.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        self.scene_color = Texture::create_render_target(
            &self.device,
            self.config.width,
            self.config.height,
            self.config.format,
            "Scene Color",
        );
        self.blit_scene_bind_group = Self::create_blit_bind_group(
            &self.device,
            &self.blit_bind_group_layout,
            &self.scene_color.view,
            &self.sampler,
            &self.blit_composite_buffer,
            "Blit Scene Bind Group",
        );

        self.camera.set_aspect(self.config.width, self.config.height);
        let uniforms = DomeUniforms::new(
            &self.camera,
            self.settings.sun_direction,
            self.settings.sun_intensity,
            self.settings.alpha_gain,
        );
        self.queue
            .write_buffer(&self.dome_uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Record and submit one complete frame, then present it.
    ///
    /// Pass order is the data-dependency order: density before normal
    /// (write-then-read of the density texture), both before the dome draw,
    /// the dome before the blit. Each stage is its own encoder pass, so the
    /// queue executes them in program order with the implicit barriers wgpu
    /// inserts between passes.
    pub fn render_frame(&mut self, view_mode: ViewMode) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(error @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("surface unavailable ({error}); reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::SurfaceAcquire(error));
            }
            Err(error) => return Err(RenderError::SurfaceAcquire(error)),
        };
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.encode_cloud_field(&mut encoder);
        self.encode_skydome(&mut encoder);
        self.encode_blit(&mut encoder, &surface_view, view_mode);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if self.settings.wait_for_gpu {
            let _ = self.device.poll(wgpu::Maintain::Wait);
        }
        Ok(())
    }

    /// Encode the two compute stages: density synthesis, then normal
    /// derivation reading the density just written.
    fn encode_cloud_field(&self, encoder: &mut wgpu::CommandEncoder) {
        let groups_x = workgroup_count(self.settings.field_width, WORKGROUP_SIZE);
        let groups_y = workgroup_count(self.settings.field_height, WORKGROUP_SIZE);

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Density Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.density_pipeline);
            pass.set_bind_group(0, &self.density_bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Normal Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.normal_pipeline);
            pass.set_bind_group(0, &self.normal_bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
    }

    /// Encode the skydome draw into the offscreen scene target, cleared to
    /// transparent so compositing over any background is order-independent.
    fn encode_skydome(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Skydome Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.scene_color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.dome_pipeline);
        pass.set_bind_group(0, &self.dome_bind_group, &[]);
        pass.set_vertex_buffer(0, self.dome_mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(self.dome_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.dome_mesh.num_indices, 0, 0..1);
    }

    /// Encode the final blit onto the surface, clearing it first (never
    /// blending with prior frame content).
    fn encode_blit(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        view_mode: ViewMode,
    ) {
        let bind_group = match view_mode {
            ViewMode::Clouds => &self.blit_scene_bind_group,
            ViewMode::DensityMap => &self.blit_density_bind_group,
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(SKY_CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.blit_pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        pass.draw(0..FULLSCREEN_QUAD.len() as u32, 0..1);
    }

    /// Index count of the dome mesh (drawn with 32-bit indices).
    pub fn dome_index_count(&self) -> u32 {
        self.dome_mesh.num_indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// CPU mirror of the gradient math in clouds.wgsl `generate_normal_map`,
    /// kept in lockstep with the shader's clamping policy and strength
    /// constant.
    mod field_math {
        pub const GRADIENT_STRENGTH: f32 = 24.0;

        pub fn density_at(field: &[f32], w: i32, h: i32, x: i32, y: i32) -> f32 {
            let cx = x.clamp(0, w - 1);
            let cy = y.clamp(0, h - 1);
            field[(cy * w + cx) as usize]
        }

        pub fn derive_normal(field: &[f32], w: i32, h: i32, x: i32, y: i32) -> [f32; 3] {
            let dx = density_at(field, w, h, x + 1, y) - density_at(field, w, h, x - 1, y);
            let dy = density_at(field, w, h, x, y + 1) - density_at(field, w, h, x, y - 1);
            let v = glam::Vec3::new(-dx * GRADIENT_STRENGTH, -dy * GRADIENT_STRENGTH, 1.0)
                .normalize();
            [v.x, v.y, v.z]
        }
    }

    fn varied_field(w: usize, h: usize) -> Vec<f32> {
        (0..w * h)
            .map(|i| ((i as f32 * 0.73).sin() * 0.5 + 0.5))
            .collect()
    }

    /// Edge and corner pixels clamp their neighbor lookups instead of
    /// reading out of range, and still produce unit-length normals.
    #[test]
    fn boundary_normals_have_unit_length() {
        let (w, h) = (7usize, 5usize);
        let field = varied_field(w, h);
        let edges = [
            (0, 0),
            (w as i32 - 1, 0),
            (0, h as i32 - 1),
            (w as i32 - 1, h as i32 - 1),
            (3, 0),
            (0, 2),
            (w as i32 - 1, 2),
            (3, h as i32 - 1),
        ];
        for (x, y) in edges {
            let n = field_math::derive_normal(&field, w as i32, h as i32, x, y);
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4, "({x},{y}) length {len}");
        }
    }

    /// A flat density field has no gradient anywhere, so every normal
    /// degrades to straight-up (0, 0, 1) — including the 1x1 corner case
    /// where every neighbor clamps onto the pixel itself.
    #[test]
    fn flat_field_yields_degenerate_normal() {
        let field = vec![0.5f32; 9];
        for (x, y) in [(0, 0), (1, 1), (2, 2)] {
            let n = field_math::derive_normal(&field, 3, 3, x, y);
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
        let single = vec![0.8f32];
        assert_eq!(field_math::derive_normal(&single, 1, 1, 0, 0), [0.0, 0.0, 1.0]);
    }

    /// Interior gradient sign: density rising to the right tilts the normal
    /// to the left (away from the slope), matching the shader's negation.
    #[test]
    fn gradient_sign_matches_shader() {
        let w = 5;
        let field: Vec<f32> = (0..25).map(|i| (i % 5) as f32 * 0.1).collect();
        let n = field_math::derive_normal(&field, w, 5, 2, 2);
        assert!(n[0] < 0.0);
        assert!(n[1].abs() < 1e-6);
        assert!(n[2] > 0.0);
    }

    #[test]
    fn uniform_structs_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FieldParams>(), 16);
        assert_eq!(std::mem::size_of::<BlitParams>(), 16);
    }

    /// A zero field dimension would make the compute chain a silent no-op
    /// (zero workgroups, density map never written), so construction must
    /// refuse it instead of presenting a stale field.
    #[test]
    fn zero_field_dimensions_are_rejected() {
        assert_eq!(workgroup_count(0, WORKGROUP_SIZE), 0);

        let mut settings = RenderSettings::default();
        settings.field_width = 0;
        assert!(settings.validate().is_err());

        settings.field_width = 2048;
        settings.field_height = 0;
        assert!(settings.validate().is_err());

        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn default_settings_match_internal_resolution() {
        let settings = RenderSettings::default();
        assert_eq!(settings.field_width, 2048);
        assert_eq!(settings.field_height, 2048);
        // Wave budget stays within the default phase table.
        assert!(settings.octaves * 16 <= 128);
    }
}
