//! GPU side of cardshade.
//!
//! Each card gets a [`RenderInstance`]: its own wgpu device, a pipeline
//! compiled from one [`shaderlib::ShaderVariant`], a small uniform buffer and an
//! offscreen target the size of the card. Giving every card a separate device
//! mirrors one-context-per-canvas, so a device loss is local to one card.
//!
//! ```text
//!   GpuAdapter ──request_context──▶ GpuContext ─┐
//!                                                ├─▶ RenderInstance::advance ─▶ draw 0..3
//!   ShaderVariant ──wrap + compile──▶ pipeline ─┘
//! ```
//!
//! Variant fragment sources are bodies defining `mainCard`; the compile step wraps
//! them with a GLSL 450 prelude that maps the parameter names onto a std140
//! uniform block mirrored by [`CardUniforms`].

mod adapter;
mod compile;
mod context;
mod error;
mod instance;
mod target;
mod types;
mod uniforms;

pub use adapter::GpuAdapter;
pub use context::GpuContext;
pub use error::InstanceError;
pub use instance::{InstanceSpec, RenderInstance};
pub use types::{AdapterProfile, DeviceLoss, GpuPower, TargetSize};
pub use uniforms::CardUniforms;
