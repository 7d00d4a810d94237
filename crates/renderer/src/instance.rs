use std::time::Instant;

use crossbeam_channel::Sender;
use image::RgbaImage;
use shaderlib::{ShaderVariant, VariantParams};

use crate::adapter::GpuAdapter;
use crate::compile::{compile_fragment_shader, compile_vertex_shader, scoped};
use crate::context::GpuContext;
use crate::error::InstanceError;
use crate::target::{OffscreenTarget, TARGET_FORMAT};
use crate::types::{DeviceLoss, TargetSize};
use crate::uniforms::CardUniforms;

/// Everything needed to construct a [`RenderInstance`].
pub struct InstanceSpec<'a> {
    pub label: String,
    pub variant: &'a ShaderVariant,
    pub params: VariantParams,
    pub size: TargetSize,
    pub started_at: Instant,
    /// Routing key reported back in [`DeviceLoss::tag`].
    pub tag: u64,
}

/// One compiled variant drawing into its own offscreen target on its own
/// device.
///
/// Time is measured from `started_at`. After [`RenderInstance::dispose`] every
/// method is a no-op, and after a device loss `advance` stops drawing.
pub struct RenderInstance {
    label: String,
    variant: String,
    uniforms: CardUniforms,
    started_at: Instant,
    frames: u64,
    gpu: Option<GpuResources>,
}

struct GpuResources {
    context: GpuContext,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    target: OffscreenTarget,
}

impl RenderInstance {
    pub fn new(
        adapter: &GpuAdapter,
        spec: InstanceSpec<'_>,
        on_lost: Sender<DeviceLoss>,
    ) -> Result<Self, InstanceError> {
        let context = adapter
            .request_context(&spec.label, spec.tag, on_lost)
            .map_err(InstanceError::Context)?;

        let resources = match build_resources(context, spec.variant, spec.params, spec.size) {
            Ok(resources) => resources,
            Err((context, err)) => {
                context.destroy();
                return Err(err);
            }
        };

        tracing::debug!(
            label = %spec.label,
            variant = spec.variant.name(),
            width = spec.size.width,
            height = spec.size.height,
            "render instance created"
        );

        Ok(Self {
            label: spec.label,
            variant: spec.variant.name().to_string(),
            uniforms: CardUniforms::new(spec.params, spec.size),
            started_at: spec.started_at,
            frames: 0,
            gpu: Some(resources),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn variant_name(&self) -> &str {
        &self.variant
    }

    pub fn params(&self) -> VariantParams {
        self.uniforms.params()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn size(&self) -> Option<TargetSize> {
        self.gpu.as_ref().map(|gpu| gpu.target.size())
    }

    pub fn is_disposed(&self) -> bool {
        self.gpu.is_none()
    }

    pub fn is_lost(&self) -> bool {
        self.gpu.as_ref().is_some_and(|gpu| gpu.context.is_lost())
    }

    /// Whether `advance` would draw right now.
    pub fn is_active(&self) -> bool {
        self.gpu.as_ref().is_some_and(|gpu| !gpu.context.is_lost())
    }

    pub fn mark_lost(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.context.mark_lost();
        }
    }

    pub fn set_scroll(&mut self, scroll: f32) {
        self.uniforms.scroll = scroll;
    }

    /// Updates the time input and draws one frame.
    pub fn advance(&mut self, now: Instant) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        if gpu.context.is_lost() {
            return;
        }

        self.uniforms.time = now.saturating_duration_since(self.started_at).as_secs_f32();
        gpu.context
            .queue
            .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let mut encoder =
            gpu.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("card frame"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("card pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu.target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&gpu.pipeline);
            pass.set_bind_group(0, &gpu.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        gpu.context.queue.submit(Some(encoder.finish()));
        self.frames += 1;
    }

    /// Resizes the output region and the resolution input.
    pub fn resize(&mut self, size: TargetSize) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if gpu.target.size() == size {
            return;
        }
        gpu.target = OffscreenTarget::new(&gpu.context.device, size);
        self.uniforms.set_resolution(size);
        tracing::trace!(label = %self.label, ?size, "render instance resized");
    }

    pub fn snapshot(&self) -> Result<RgbaImage, InstanceError> {
        let gpu = self.gpu.as_ref().ok_or(InstanceError::Disposed)?;
        if gpu.context.is_lost() {
            return Err(InstanceError::Lost);
        }
        gpu.target.snapshot(&gpu.context.device, &gpu.context.queue)
    }

    /// Releases the pipeline, buffers, target and device. Safe to repeat.
    pub fn dispose(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.uniform_buffer.destroy();
            gpu.context.destroy();
            tracing::trace!(label = %self.label, frames = self.frames, "render instance disposed");
        }
    }
}

impl Drop for RenderInstance {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn build_resources(
    context: GpuContext,
    variant: &ShaderVariant,
    params: VariantParams,
    size: TargetSize,
) -> Result<GpuResources, (GpuContext, InstanceError)> {
    let device = &context.device;

    let vertex = match compile_vertex_shader(device, variant.vertex_source()) {
        Ok(module) => module,
        Err(err) => return Err((context, err)),
    };
    let fragment = match compile_fragment_shader(device, variant.fragment_source()) {
        Ok(module) => module,
        Err(err) => return Err((context, err)),
    };

    let uniforms = CardUniforms::new(params, size);
    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("card uniforms"),
        size: std::mem::size_of::<CardUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    context
        .queue
        .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("card uniform layout"),
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
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("card uniform bind group"),
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let pipeline = scoped(device, "pipeline", || {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("card pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("card pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        })
    });
    let pipeline = match pipeline {
        Ok(pipeline) => pipeline,
        Err(err) => return Err((context, err)),
    };

    let target = OffscreenTarget::new(device, size);

    Ok(GpuResources {
        context,
        pipeline,
        uniform_buffer,
        bind_group,
        target,
    })
}
