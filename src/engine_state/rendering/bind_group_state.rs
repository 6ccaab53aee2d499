//! Manages WebGPU bind groups and their layouts.
//!
//! Two bind groups exist: the camera uniform, shared by the block and debug
//! pipelines, and the block atlas with its sampler.

use std::collections::HashMap;

use wgpu::{BindGroup, BindGroupLayout, Device, Queue};

use crate::engine_state::{buffer_state::BufferState, camera_state::CAMERA_BUFFER_NAME};

use super::texture::{LoadedImage, Texture};

/// Named bind groups and layouts, created once at startup.
pub struct BindGroupState {
    bind_groups: HashMap<&'static str, BindGroup>,
    bind_group_layouts: HashMap<&'static str, BindGroupLayout>,
    /// Keeps the atlas alive for as long as its bind group
    _atlas: Texture,
}

impl BindGroupState {
    /// Creates the camera and atlas bind groups.
    ///
    /// The camera buffer must already be registered in `buffer_state`.
    pub fn new(
        device: &Device,
        queue: &Queue,
        buffer_state: &BufferState,
        atlas: &LoadedImage,
    ) -> anyhow::Result<Self> {
        let mut bind_groups = HashMap::new();
        let mut bind_group_layouts = HashMap::new();

        let (camera_bind_group, camera_bind_group_layout) =
            Self::generate_camera_bindgroups(device, buffer_state)?;
        bind_groups.insert(CAMERA_BIND_GROUP, camera_bind_group);
        bind_group_layouts.insert(CAMERA_BIND_GROUP_LAYOUT, camera_bind_group_layout);

        let atlas = Texture::from_image(device, queue, atlas, "block atlas");
        let (texture_bind_group, texture_bind_group_layout) =
            Self::generate_texture_bindgroups(device, &atlas);
        bind_groups.insert(TEXTURE_BIND_GROUP, texture_bind_group);
        bind_group_layouts.insert(TEXTURE_BIND_GROUP_LAYOUT, texture_bind_group_layout);

        Ok(Self {
            bind_groups,
            bind_group_layouts,
            _atlas: atlas,
        })
    }

    /// Retrieves a bind group by name.
    pub fn get_bind_group(&self, name: &str) -> Option<&BindGroup> {
        self.bind_groups.get(name)
    }

    /// Retrieves a bind group layout by name.
    pub fn get_bind_group_layout(&self, name: &str) -> Option<&BindGroupLayout> {
        self.bind_group_layouts.get(name)
    }

    fn generate_camera_bindgroups(
        device: &Device,
        buffer_state: &BufferState,
    ) -> anyhow::Result<(BindGroup, BindGroupLayout)> {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some(CAMERA_BIND_GROUP_LAYOUT),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer_state.get_entire_binding(CAMERA_BUFFER_NAME)?,
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        Ok((camera_bind_group, camera_bind_group_layout))
    }

    fn generate_texture_bindgroups(device: &Device, atlas: &Texture) -> (BindGroup, BindGroupLayout) {
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
                        // This should match the filterable field of the corresponding Texture entry above.
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some(TEXTURE_BIND_GROUP_LAYOUT),
            });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
            label: Some(TEXTURE_BIND_GROUP),
        });

        (texture_bind_group, texture_bind_group_layout)
    }
}

/// Name of the camera bind group
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Name of the camera bind group layout
pub const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";
/// Name of the texture bind group
pub const TEXTURE_BIND_GROUP: &str = "texture_bind_group";
/// Name of the texture bind group layout
pub const TEXTURE_BIND_GROUP_LAYOUT: &str = "texture_bind_group_layout";
