use image::RgbaImage;

use crate::error::InstanceError;
use crate::types::TargetSize;

pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Offscreen color attachment standing in for a card's canvas.
pub(crate) struct OffscreenTarget {
    texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    size: TargetSize,
}

impl OffscreenTarget {
    pub(crate) fn new(device: &wgpu::Device, size: TargetSize) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("card target"),
            size: size.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size,
        }
    }

    pub(crate) fn size(&self) -> TargetSize {
        self.size
    }

    /// Copies the current contents back to the CPU.
    pub(crate) fn snapshot(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<RgbaImage, InstanceError> {
        let TargetSize { width, height } = self.size;
        let unpadded = width * 4;
        let padded = align_to(unpadded, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("card readback"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("card readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            self.size.extent(),
        );
        queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| InstanceError::Readback(err.to_string()))?;
        receiver
            .recv()
            .map_err(|_| InstanceError::Readback("map callback never ran".into()))?
            .map_err(|err| InstanceError::Readback(err.to_string()))?;

        let pixels = {
            let mapped = slice.get_mapped_range();
            tight_rows(&mapped, unpadded, padded, height)
        };
        buffer.unmap();

        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| InstanceError::Readback("pixel buffer size mismatch".into()))
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

fn tight_rows(mapped: &[u8], unpadded: u32, padded: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(unpadded as usize * height as usize);
    for row in mapped.chunks(padded as usize).take(height as usize) {
        out.extend_from_slice(&row[..unpadded as usize]);
    }
    out
}
