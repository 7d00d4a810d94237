use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use crate::builtin;
use crate::pack::{load_packs, PackError};

/// A named vertex/fragment program pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderVariant {
    name: Cow<'static, str>,
    vertex: Cow<'static, str>,
    fragment: Cow<'static, str>,
}

impl ShaderVariant {
    /// Builds a variant from static sources using the shared fullscreen vertex stage.
    pub const fn bundled(name: &'static str, fragment: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            vertex: Cow::Borrowed(builtin::FULLSCREEN_VERTEX),
            fragment: Cow::Borrowed(fragment),
        }
    }

    pub fn new(
        name: impl Into<String>,
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            vertex: Cow::Owned(vertex.into()),
            fragment: Cow::Owned(fragment.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("shader library must contain at least one variant")]
    Empty,
    #[error("duplicate shader variant name '{0}'")]
    DuplicateName(String),
    #[error(transparent)]
    Pack(#[from] PackError),
}

/// Immutable, ordered registry of shader variants.
///
/// Lookups by index wrap around, so any index is valid once the library is
/// built. Construction refuses an empty sequence.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    variants: Vec<ShaderVariant>,
    background: ShaderVariant,
}

impl ShaderLibrary {
    pub fn new(variants: Vec<ShaderVariant>) -> Result<Self, LibraryError> {
        if variants.is_empty() {
            return Err(LibraryError::Empty);
        }
        ensure_unique(&variants)?;
        Ok(Self {
            variants,
            background: builtin::background(),
        })
    }

    /// The bundled card variants in their canonical order.
    pub fn builtin() -> Self {
        Self {
            variants: builtin::variants(),
            background: builtin::background(),
        }
    }

    /// Appends every variant pack found under `dir`, in directory-name order.
    pub fn with_packs(mut self, dir: &Path) -> Result<Self, LibraryError> {
        let packs = load_packs(dir)?;
        for pack in packs {
            tracing::debug!(
                name = pack.variant().name(),
                root = %pack.root().display(),
                "loaded shader variant pack"
            );
            self.variants.push(pack.into_variant());
        }
        ensure_unique(&self.variants)?;
        Ok(self)
    }

    pub fn count(&self) -> usize {
        self.variants.len()
    }

    /// Returns the variant at `index` modulo the library size.
    pub fn by_index(&self, index: usize) -> &ShaderVariant {
        &self.variants[index % self.variants.len()]
    }

    pub fn get(&self, name: &str) -> Option<&ShaderVariant> {
        self.variants.iter().find(|variant| variant.name() == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.variants
            .iter()
            .position(|variant| variant.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.variants.iter().map(ShaderVariant::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShaderVariant> + '_ {
        self.variants.iter()
    }

    /// Full-viewport variant; not part of the indexed card sequence.
    pub fn background(&self) -> &ShaderVariant {
        &self.background
    }
}

fn ensure_unique(variants: &[ShaderVariant]) -> Result<(), LibraryError> {
    let mut seen = HashSet::with_capacity(variants.len());
    for variant in variants {
        if !seen.insert(variant.name()) {
            return Err(LibraryError::DuplicateName(variant.name().to_string()));
        }
    }
    Ok(())
}
