use bytemuck::{Pod, Zeroable};
use shaderlib::VariantParams;

use crate::types::TargetSize;

/// CPU mirror of the `CardParams` std140 block injected by the prelude.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CardUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub scroll: f32,
    pub random_seed: f32,
    pub speed_multiplier: f32,
    pub color_shift: f32,
    pub intensity: f32,
}

impl CardUniforms {
    pub fn new(params: VariantParams, size: TargetSize) -> Self {
        Self {
            resolution: [size.width as f32, size.height as f32],
            time: 0.0,
            scroll: 0.0,
            random_seed: params.random_seed,
            speed_multiplier: params.speed_multiplier,
            color_shift: params.color_shift,
            intensity: params.intensity,
        }
    }

    pub fn set_resolution(&mut self, size: TargetSize) {
        self.resolution = [size.width as f32, size.height as f32];
    }

    pub fn params(&self) -> VariantParams {
        VariantParams {
            random_seed: self.random_seed,
            speed_multiplier: self.speed_multiplier,
            color_shift: self.color_shift,
            intensity: self.intensity,
        }
    }
}
