//! Shader variants for decorative card backgrounds.
//!
//! The library is an ordered, immutable registry of vertex/fragment program
//! pairs. Order is part of the contract: the selector maps a card's stable
//! identifiers to an index, so re-mounting a card always reproduces the same
//! look as long as the sequence is unchanged.
//!
//! Fragment sources in this crate are bodies, not complete programs. Each one
//! defines `void mainCard(out vec4 fragColor, in vec2 uv)` and refers to the
//! parameter names `time`, `resolution`, `randomSeed`, `speedMultiplier`,
//! `colorShift`, `intensity` (and `scroll` for the background variant). The
//! renderer injects the matching declarations before compiling.

mod builtin;
mod library;
mod manifest;
mod pack;
mod selector;

pub use builtin::{BACKGROUND_FRAGMENT, FULLSCREEN_VERTEX};
pub use library::{LibraryError, ShaderLibrary, ShaderVariant};
pub use manifest::VariantManifest;
pub use pack::{load_packs, PackError, VariantPack};
pub use selector::{select, CardIdentity, Selection, VariantParams};
