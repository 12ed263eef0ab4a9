//! Terrain texture set
//!
//! Ten BMP files: the height map plus diffuse, roughness and normal maps for
//! three material layers. A file that fails to load is replaced by a 1×1
//! placeholder so the viewer keeps running with degraded visuals.

use std::path::Path;

use terrain_core::Bitmap;
use wgpu::util::DeviceExt;

/// How a texture is sampled and stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureRole {
    /// Nearest filtering, clamped, no mipmaps
    Height,
    /// sRGB color, trilinear
    Diffuse,
    Roughness,
    /// Tangent-space normals, trilinear
    Normal,
}

impl TextureRole {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Diffuse => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Height | Self::Roughness | Self::Normal => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    fn mipmapped(self) -> bool {
        self != Self::Height
    }

    fn placeholder(self) -> [u8; 4] {
        match self {
            Self::Normal => [128, 128, 255, 255],
            _ => [128, 128, 128, 255],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextureSlot {
    pub file_name: &'static str,
    pub role: TextureRole,
}

/// Slots in bind order
pub const TEXTURE_SLOTS: [TextureSlot; 10] = [
    TextureSlot { file_name: "mountains_height.bmp", role: TextureRole::Height },
    TextureSlot { file_name: "grass.bmp", role: TextureRole::Diffuse },
    TextureSlot { file_name: "grass-r.bmp", role: TextureRole::Roughness },
    TextureSlot { file_name: "grass-n.bmp", role: TextureRole::Normal },
    TextureSlot { file_name: "rocks.bmp", role: TextureRole::Diffuse },
    TextureSlot { file_name: "rocks-r.bmp", role: TextureRole::Roughness },
    TextureSlot { file_name: "rocks-n.bmp", role: TextureRole::Normal },
    TextureSlot { file_name: "snow.bmp", role: TextureRole::Diffuse },
    TextureSlot { file_name: "snow-r.bmp", role: TextureRole::Roughness },
    TextureSlot { file_name: "snow-n.bmp", role: TextureRole::Normal },
];

/// Bind group 1 bindings: height map, its sampler, the nine material maps,
/// then the material sampler.
pub const HEIGHT_MAP_BINDING: u32 = 0;
pub const HEIGHT_SAMPLER_BINDING: u32 = 1;
pub const FIRST_MATERIAL_BINDING: u32 = 2;
pub const MATERIAL_SAMPLER_BINDING: u32 = FIRST_MATERIAL_BINDING + TEXTURE_SLOTS.len() as u32 - 1;

/// Loaded textures and samplers
pub struct TerrainTextures {
    views: Vec<wgpu::TextureView>,
    height_sampler: wgpu::Sampler,
    material_sampler: wgpu::Sampler,
    placeholders: usize,
}

impl TerrainTextures {
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, directory: &Path) -> Self {
        let max_dimension = device.limits().max_texture_dimension_2d;
        let mut placeholders = 0;

        let views = TEXTURE_SLOTS
            .iter()
            .map(|slot| {
                let path = directory.join(slot.file_name);
                let (rgba, width, height) = match Bitmap::open(&path) {
                    Ok(bitmap) if bitmap.width().max(bitmap.height()) <= max_dimension => {
                        tracing::info!(
                            "Loaded texture {}: {}x{}",
                            path.display(),
                            bitmap.width(),
                            bitmap.height()
                        );
                        (bitmap.to_rgba8(), bitmap.width(), bitmap.height())
                    }
                    Ok(bitmap) => {
                        tracing::warn!(
                            "Texture {} is {}x{}, above the device limit of {}; using placeholder",
                            path.display(),
                            bitmap.width(),
                            bitmap.height(),
                            max_dimension
                        );
                        placeholders += 1;
                        (slot.role.placeholder().to_vec(), 1, 1)
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}; using placeholder", path.display(), e);
                        placeholders += 1;
                        (slot.role.placeholder().to_vec(), 1, 1)
                    }
                };
                create_texture(device, queue, slot, &rgba, width, height)
            })
            .collect();

        let height_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Height Map Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            views,
            height_sampler,
            material_sampler,
            placeholders,
        }
    }

    /// Number of slots that fell back to a placeholder
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        let mut entries = Vec::with_capacity(self.views.len() + 2);
        entries.push(wgpu::BindGroupEntry {
            binding: HEIGHT_MAP_BINDING,
            resource: wgpu::BindingResource::TextureView(&self.views[0]),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: HEIGHT_SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(&self.height_sampler),
        });
        for (offset, view) in self.views[1..].iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: FIRST_MATERIAL_BINDING + offset as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: MATERIAL_SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(&self.material_sampler),
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Terrain Textures"),
            layout,
            entries: &entries,
        })
    }
}

fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    slot: &TextureSlot,
    rgba: &[u8],
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let (data, mip_level_count) = if slot.role.mipmapped() {
        build_mip_chain(rgba, width, height)
    } else {
        (rgba.to_vec(), 1)
    };

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(slot.file_name),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: slot.role.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &data,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Number of levels in a full mip chain down to 1×1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Box-filter RGBA8 pixels into a full mip chain.
///
/// Returns every level concatenated, largest first, and the level count.
/// Odd edges reuse the last row or column.
pub fn build_mip_chain(rgba: &[u8], width: u32, height: u32) -> (Vec<u8>, u32) {
    let levels = mip_level_count(width, height);
    let mut chain = rgba.to_vec();
    let mut level_start = 0;
    let (mut w, mut h) = (width as usize, height as usize);

    for _ in 1..levels {
        let (next_w, next_h) = ((w / 2).max(1), (h / 2).max(1));
        let mut next = Vec::with_capacity(next_w * next_h * 4);
        {
            let src = &chain[level_start..level_start + w * h * 4];
            for y in 0..next_h {
                for x in 0..next_w {
                    let xs = [(2 * x).min(w - 1), (2 * x + 1).min(w - 1)];
                    let ys = [(2 * y).min(h - 1), (2 * y + 1).min(h - 1)];
                    for channel in 0..4 {
                        let mut sum = 0u32;
                        for sy in ys {
                            for sx in xs {
                                sum += u32::from(src[(sy * w + sx) * 4 + channel]);
                            }
                        }
                        next.push(((sum + 2) / 4) as u8);
                    }
                }
            }
        }
        level_start = chain.len();
        chain.extend_from_slice(&next);
        w = next_w;
        h = next_h;
    }

    (chain, levels)
}
