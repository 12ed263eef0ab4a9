//! Terrain rasterization backend (wgpu)
//!
//! Owns every GPU resource: the surface, the uploaded mesh, the texture set
//! and the pipelines built from the hot-reloadable WGSL shader.

mod context;
mod mesh_buffers;
mod pipeline;
pub mod shader;
mod textures;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use terrain_core::{FrameUniforms, StripWinding, TerrainMesh};
use winit::window::Window;

use context::GpuContext;
use mesh_buffers::MeshBuffers;
use pipeline::{TerrainLayouts, TerrainPipelines};
use shader::ShaderError;
use textures::TerrainTextures;

/// Sky color behind the terrain
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.7,
    g: 0.8,
    b: 1.0,
    a: 1.0,
};

pub struct TerrainRenderer {
    context: GpuContext,
    layouts: TerrainLayouts,
    /// None until a shader has compiled; frames are cleared but not drawn
    pipelines: Option<TerrainPipelines>,
    mesh: MeshBuffers,
    winding: StripWinding,
    uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    wireframe_warned: bool,
}

impl TerrainRenderer {
    pub fn new(
        window: Arc<Window>,
        vsync: bool,
        mesh: &TerrainMesh,
        asset_dir: &Path,
        shader_path: &Path,
    ) -> Result<Self> {
        let context = GpuContext::new(window, vsync)?;
        let device = &context.device;
        let layouts = TerrainLayouts::new(device);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: FrameUniforms::SIZE as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let textures = TerrainTextures::load(device, &context.queue, asset_dir);
        if textures.placeholders() > 0 {
            tracing::warn!("{} texture(s) replaced by placeholders", textures.placeholders());
        }
        let texture_bind_group = textures.create_bind_group(device, &layouts.textures);

        let mesh_buffers = MeshBuffers::upload(device, mesh);

        let mut renderer = Self {
            context,
            layouts,
            pipelines: None,
            mesh: mesh_buffers,
            winding: mesh.winding(),
            uniform_buffer,
            frame_bind_group,
            texture_bind_group,
            wireframe_warned: false,
        };

        let installed =
            shader::initial_source(shader_path).and_then(|source| renderer.install_shader(&source));
        match installed {
            Ok(()) => tracing::info!("Terrain shader compiled"),
            Err(e) => tracing::error!("Terrain shader failed, nothing will be drawn: {}", e),
        }

        Ok(renderer)
    }

    /// Re-read the shader from disk; the previous pipelines stay on failure.
    pub fn reload_shader(&mut self, path: &Path) -> Result<(), ShaderError> {
        let source = shader::load_wgsl(path)?;
        self.install_shader(&source)?;
        tracing::info!("Reloaded shader {}", path.display());
        Ok(())
    }

    /// Swap in pipelines built from `source`; on error the current ones stay.
    fn install_shader(&mut self, source: &str) -> Result<(), ShaderError> {
        let pipelines = TerrainPipelines::new(
            &self.context.device,
            &self.layouts,
            self.context.surface_format(),
            source,
            self.winding,
            self.context.supports_wireframe(),
        )?;
        self.pipelines = Some(pipelines);
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
    }

    /// Draw one frame and present it.
    pub fn render(&mut self, uniforms: &FrameUniforms, wireframe: bool) {
        if wireframe && !self.context.supports_wireframe() && !self.wireframe_warned {
            tracing::warn!("Wireframe requested but line polygon mode is unsupported");
            self.wireframe_warned = true;
        }

        let Some(frame) = self.context.acquire_frame() else {
            return;
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, uniforms.as_bytes());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Terrain Frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Terrain Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.context.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(pipelines) = &self.pipelines {
                pass.set_pipeline(pipelines.select(wireframe));
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_bind_group(1, &self.texture_bind_group, &[]);
                self.mesh.draw(&mut pass);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
