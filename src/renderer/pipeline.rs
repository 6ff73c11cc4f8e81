//! WebGPU output for one board canvas
//!
//! Scene code hands over triangles in surface pixels. They are mapped to NDC
//! here and written into a vertex buffer that only grows, so a steady frame
//! costs one `write_buffer` and one draw.

use wgpu::util::DeviceExt;

use super::vertex::{Vertex, colors};

/// Smallest vertex buffer allocated, in vertices
const MIN_VERTEX_CAPACITY: usize = 4096;

/// Surface, device and the single triangle pipeline for one board
pub struct RenderState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    vertex_count: u32,
    /// Canvas size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("plinko-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Rgba8UnormSrgb);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipeline = build_pipeline(&device, format);
        let vertex_buffer = alloc_vertex_buffer(&device, MIN_VERTEX_CAPACITY);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_capacity: MIN_VERTEX_CAPACITY,
            vertex_count: 0,
            size: (width, height),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Map `vertices` to NDC and copy them into the vertex buffer
    fn upload(&mut self, vertices: &[Vertex]) {
        let (w, h) = (self.size.0 as f32, self.size.1 as f32);
        let ndc: Vec<Vertex> = vertices
            .iter()
            .map(|v| {
                let [x, y] = surface_to_ndc(v.position, w, h);
                Vertex::new(x, y, v.color)
            })
            .collect();

        let capacity = grown_capacity(self.vertex_capacity, ndc.len());
        if capacity != self.vertex_capacity {
            log::debug!("Vertex buffer grown to {} vertices", capacity);
            self.vertex_buffer = alloc_vertex_buffer(&self.device, capacity);
            self.vertex_capacity = capacity;
        }
        self.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&ndc));
        self.vertex_count = ndc.len() as u32;
    }

    /// Draw one frame of `vertices` (surface pixels) over the board background
    pub fn render(&mut self, vertices: &[Vertex]) -> Result<(), wgpu::SurfaceError> {
        self.upload(vertices);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("board_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("board_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            if self.vertex_count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..self.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn build_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("board_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("board_layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("board_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        // Scene triangles wind both ways
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn alloc_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    let zeroed = vec![Vertex::new(0.0, 0.0, [0.0; 4]); capacity];
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("board_vertices"),
        contents: bytemuck::cast_slice(&zeroed),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Buffer capacity needed to hold `needed` vertices, never shrinking
pub fn grown_capacity(current: usize, needed: usize) -> usize {
    if needed <= current {
        current
    } else {
        needed.next_power_of_two().max(MIN_VERTEX_CAPACITY)
    }
}

/// Board background as the pass clear colour
pub fn clear_color() -> wgpu::Color {
    let [r, g, b, a] = colors::BACKGROUND.map(f64::from);
    wgpu::Color { r, g, b, a }
}

/// Convert surface pixels (origin top-left, y down) to normalized device coordinates
#[inline]
pub fn surface_to_ndc(position: [f32; 2], width: f32, height: f32) -> [f32; 2] {
    let w = width.max(1.0);
    let h = height.max(1.0);
    [position[0] / w * 2.0 - 1.0, 1.0 - position[1] / h * 2.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_to_ndc_corners() {
        assert_eq!(surface_to_ndc([0.0, 0.0], 300.0, 450.0), [-1.0, 1.0]);
        assert_eq!(surface_to_ndc([300.0, 450.0], 300.0, 450.0), [1.0, -1.0]);
        assert_eq!(surface_to_ndc([150.0, 225.0], 300.0, 450.0), [0.0, 0.0]);
    }

    #[test]
    fn test_capacity_only_grows() {
        assert_eq!(grown_capacity(MIN_VERTEX_CAPACITY, 10), MIN_VERTEX_CAPACITY);
        assert_eq!(grown_capacity(MIN_VERTEX_CAPACITY, 5000), 8192);
        assert_eq!(grown_capacity(8192, 100), 8192);
        assert_eq!(grown_capacity(8192, 8193), 16_384);
    }

    #[test]
    fn test_clear_color_is_board_background() {
        let c = clear_color();
        let [r, g, b, a] = colors::BACKGROUND;
        assert_eq!((c.r, c.g, c.b, c.a), (r as f64, g as f64, b as f64, a as f64));
    }
}
