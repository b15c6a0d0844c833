//! wgpu point-cloud renderer drawn inside an egui paint callback.

use eframe::egui_wgpu::{self, wgpu};
use eframe::wgpu::util::DeviceExt;
use encase::{ShaderSize, ShaderType};
use tracing::debug;

use crate::layout::{GpuFrame, GpuPoints, PointUpload};
use crate::style::{Blending, PipelineKey, RenderStyle};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct PointCloudRenderer {
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    target_format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    pipeline_key: PipelineKey,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    positions_storage_buffer: wgpu::Buffer,
    positions_storage_buffer_size: usize,
    colors_storage_buffer: wgpu::Buffer,
    colors_storage_buffer_size: usize,
    points_bind_group_layout: wgpu::BindGroupLayout,
    points_bind_group: wgpu::BindGroup,
    point_count: u32,
}

impl PointCloudRenderer {
    pub fn new(render_state: &egui_wgpu::RenderState, style: &RenderStyle) -> Self {
        let device = &render_state.device;
        let shader = device.create_shader_module(wgpu::include_wgsl!("shaders/points.wgsl"));

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(<GpuFrame as ShaderSize>::SHADER_SIZE),
                    },
                    count: None,
                }],
            });

        let points_binding = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: Some(<GpuPoints as ShaderType>::min_size()),
            },
            count: None,
        };
        let points_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Points Bind Group Layout"),
                entries: &[points_binding(0), points_binding(1)],
            });

        let frame_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: &[0; <GpuFrame as ShaderSize>::SHADER_SIZE.get() as _],
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
        });

        const POINTS_STORAGE_BUFFER_SIZE: usize =
            <GpuPoints as ShaderType>::METADATA.min_size().get() as _;

        let positions_storage_buffer = create_storage_buffer(
            device,
            "Positions Storage Buffer",
            &[0; POINTS_STORAGE_BUFFER_SIZE],
        );
        let colors_storage_buffer = create_storage_buffer(
            device,
            "Colors Storage Buffer",
            &[0; POINTS_STORAGE_BUFFER_SIZE],
        );

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let points_bind_group = create_points_bind_group(
            device,
            &points_bind_group_layout,
            &positions_storage_buffer,
            &colors_storage_buffer,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Points Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &points_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline_key = style.pipeline_key();
        let pipeline = create_points_pipeline(
            device,
            &pipeline_layout,
            &shader,
            render_state.target_format,
            pipeline_key,
        );

        Self {
            shader,
            pipeline_layout,
            target_format: render_state.target_format,
            pipeline,
            pipeline_key,
            frame_uniform_buffer,
            frame_bind_group,
            positions_storage_buffer,
            positions_storage_buffer_size: POINTS_STORAGE_BUFFER_SIZE,
            colors_storage_buffer,
            colors_storage_buffer_size: POINTS_STORAGE_BUFFER_SIZE,
            points_bind_group_layout,
            points_bind_group,
            point_count: 0,
        }
    }

    pub fn prepare(
        &mut self,
        frame: &[u8],
        upload: Option<&PointUpload>,
        pipeline_key: PipelineKey,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Vec<wgpu::CommandBuffer> {
        queue.write_buffer(&self.frame_uniform_buffer, 0, frame);

        if pipeline_key != self.pipeline_key {
            debug!(?pipeline_key, "Rebuilding points pipeline");
            self.pipeline = create_points_pipeline(
                device,
                &self.pipeline_layout,
                &self.shader,
                self.target_format,
                pipeline_key,
            );
            self.pipeline_key = pipeline_key;
        }

        if let Some(upload) = upload {
            debug!(
                revision = upload.revision,
                count = upload.count,
                bytes = upload.positions.len() + upload.colors.len(),
                "Uploading point buffers"
            );
            let mut points_bind_group_invalidated = false;

            if self.positions_storage_buffer_size >= upload.positions.len() {
                queue.write_buffer(&self.positions_storage_buffer, 0, &upload.positions);
            } else {
                points_bind_group_invalidated = true;
                self.positions_storage_buffer =
                    create_storage_buffer(device, "Positions Storage Buffer", &upload.positions);
                self.positions_storage_buffer_size = upload.positions.len();
            }

            if self.colors_storage_buffer_size >= upload.colors.len() {
                queue.write_buffer(&self.colors_storage_buffer, 0, &upload.colors);
            } else {
                points_bind_group_invalidated = true;
                self.colors_storage_buffer =
                    create_storage_buffer(device, "Colors Storage Buffer", &upload.colors);
                self.colors_storage_buffer_size = upload.colors.len();
            }

            if points_bind_group_invalidated {
                self.points_bind_group = create_points_bind_group(
                    device,
                    &self.points_bind_group_layout,
                    &self.positions_storage_buffer,
                    &self.colors_storage_buffer,
                );
            }
            self.point_count = upload.count;
        }

        vec![]
    }

    pub fn paint<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.point_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        render_pass.set_bind_group(1, &self.points_bind_group, &[]);
        render_pass.draw(0..4, 0..self.point_count);
    }
}

fn create_storage_buffer(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::STORAGE,
    })
}

fn create_points_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    positions: &wgpu::Buffer,
    colors: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Points Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: positions.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: colors.as_entire_binding(),
            },
        ],
    })
}

fn blend_state(key: PipelineKey) -> Option<wgpu::BlendState> {
    match key.blending {
        Blending::Additive => Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        }),
        Blending::Normal if key.transparent => Some(wgpu::BlendState::ALPHA_BLENDING),
        Blending::Normal => None,
    }
}

fn create_points_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    target_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Points Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: blend_state(key),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            polygon_mode: wgpu::PolygonMode::Fill,
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        },
        // The pass always carries a depth attachment, so the state is always present.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: key.depth_write,
            depth_compare: if key.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}
