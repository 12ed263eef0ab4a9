//! Terrain render pipelines
//!
//! One pipeline per polygon mode, both built from the same validated shader
//! module so a reload swaps them together.

use terrain_core::{FrontFace, StripWinding};

use super::context::DEPTH_FORMAT;
use super::mesh_buffers::vertex_buffer_layouts;
use super::shader::{FRAGMENT_ENTRY_POINT, ShaderError, VERTEX_ENTRY_POINT};
use super::textures::{
    FIRST_MATERIAL_BINDING, HEIGHT_MAP_BINDING, HEIGHT_SAMPLER_BINDING, MATERIAL_SAMPLER_BINDING,
};

/// Bind group layouts shared by every pipeline generation
pub struct TerrainLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub textures: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

impl TerrainLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Uniforms Layout"),
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

        let mut entries = vec![
            texture_entry(HEIGHT_MAP_BINDING, wgpu::ShaderStages::VERTEX_FRAGMENT),
            sampler_entry(HEIGHT_SAMPLER_BINDING, wgpu::ShaderStages::VERTEX_FRAGMENT),
        ];
        entries.extend(
            (FIRST_MATERIAL_BINDING..MATERIAL_SAMPLER_BINDING)
                .map(|binding| texture_entry(binding, wgpu::ShaderStages::FRAGMENT)),
        );
        entries.push(sampler_entry(MATERIAL_SAMPLER_BINDING, wgpu::ShaderStages::FRAGMENT));

        let textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Terrain Textures Layout"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Terrain Pipeline Layout"),
            bind_group_layouts: &[&frame, &textures],
            push_constant_ranges: &[],
        });

        Self {
            frame,
            textures,
            pipeline_layout,
        }
    }
}

fn texture_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub fn to_wgpu_front_face(front_face: FrontFace) -> wgpu::FrontFace {
    match front_face {
        FrontFace::Ccw => wgpu::FrontFace::Ccw,
        FrontFace::Cw => wgpu::FrontFace::Cw,
    }
}

/// Fill pipeline plus the optional wireframe variant
pub struct TerrainPipelines {
    fill: wgpu::RenderPipeline,
    wireframe: Option<wgpu::RenderPipeline>,
}

impl TerrainPipelines {
    /// Build both pipelines from `source`.
    ///
    /// Creation runs inside a validation error scope, so a shader that naga
    /// accepts but that does not match the layouts or vertex streams is
    /// returned as an error instead of reaching the uncaptured error handler.
    pub fn new(
        device: &wgpu::Device,
        layouts: &TerrainLayouts,
        surface_format: wgpu::TextureFormat,
        source: &str,
        winding: StripWinding,
        wireframe_supported: bool,
    ) -> Result<Self, ShaderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let fill = create_pipeline(
            device,
            layouts,
            surface_format,
            &module,
            winding,
            wgpu::PolygonMode::Fill,
        );
        let wireframe = wireframe_supported.then(|| {
            create_pipeline(
                device,
                layouts,
                surface_format,
                &module,
                winding,
                wgpu::PolygonMode::Line,
            )
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Pipeline(error.to_string()));
        }

        Ok(Self { fill, wireframe })
    }

    /// Pipeline for the requested mode; falls back to fill without line support
    pub fn select(&self, wireframe: bool) -> &wgpu::RenderPipeline {
        match (&self.wireframe, wireframe) {
            (Some(line), true) => line,
            _ => &self.fill,
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layouts: &TerrainLayouts,
    surface_format: wgpu::TextureFormat,
    module: &wgpu::ShaderModule,
    winding: StripWinding,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    let buffers = vertex_buffer_layouts();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(match polygon_mode {
            wgpu::PolygonMode::Line => "Terrain Wireframe Pipeline",
            _ => "Terrain Pipeline",
        }),
        layout: Some(&layouts.pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(VERTEX_ENTRY_POINT),
            buffers: &buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(FRAGMENT_ENTRY_POINT),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            // Uint32 strips restart at 0xFFFFFFFF
            strip_index_format: Some(wgpu::IndexFormat::Uint32),
            front_face: to_wgpu_front_face(winding.front_face),
            cull_mode: Some(wgpu::Face::Back),
            unclipped_depth: false,
            polygon_mode,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_winding_maps_to_ccw() {
        assert_eq!(
            to_wgpu_front_face(terrain_core::TERRAIN_WINDING.front_face),
            wgpu::FrontFace::Ccw
        );
        assert_eq!(to_wgpu_front_face(FrontFace::Cw), wgpu::FrontFace::Cw);
    }
}
