//! Loads extra card variants from a directory of packs.
//!
//! Every immediate subdirectory containing a `variant.toml` is one pack.
//! Packs are returned sorted by directory name so the resulting library order,
//! and therefore every card's variant selection, is reproducible across runs.
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::builtin::FULLSCREEN_VERTEX;
use crate::library::ShaderVariant;
use crate::manifest::VariantManifest;

const MANIFEST_FILE: &str = "variant.toml";

#[derive(Debug, Error)]
pub enum PackError {
    #[error("manifest not found at {0}")]
    ManifestMissing(PathBuf),

    #[error("failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("manifest validation failed for {path}: {issues:?}")]
    ManifestValidation { path: PathBuf, issues: Vec<String> },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct VariantPack {
    root: PathBuf,
    manifest: VariantManifest,
    variant: ShaderVariant,
}

impl VariantPack {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, PackError> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(PackError::ManifestMissing(manifest_path));
        }

        let raw = read(&manifest_path)?;
        let manifest: VariantManifest =
            toml::from_str(&raw).map_err(|source| PackError::ManifestParse {
                path: manifest_path.clone(),
                source,
            })?;
        let issues = manifest.validate();
        if !issues.is_empty() {
            return Err(PackError::ManifestValidation {
                path: manifest_path,
                issues,
            });
        }

        let fragment = read(&root.join(&manifest.fragment))?;
        let vertex = match &manifest.vertex {
            Some(path) => read(&root.join(path))?,
            None => FULLSCREEN_VERTEX.to_string(),
        };
        let variant = ShaderVariant::new(manifest.name.trim(), vertex, fragment);

        Ok(Self {
            root,
            manifest,
            variant,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &VariantManifest {
        &self.manifest
    }

    pub fn variant(&self) -> &ShaderVariant {
        &self.variant
    }

    pub fn into_variant(self) -> ShaderVariant {
        self.variant
    }
}

/// Loads every pack under `dir`. A missing directory yields no packs.
pub fn load_packs(dir: &Path) -> Result<Vec<VariantPack>, PackError> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "variant pack directory absent");
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| PackError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut roots = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PackError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() && path.join(MANIFEST_FILE).exists() {
            roots.push(path);
        }
    }
    roots.sort();

    roots.into_iter().map(VariantPack::load).collect()
}

fn read(path: &Path) -> Result<String, PackError> {
    fs::read_to_string(path).map_err(|source| PackError::Io {
        path: path.to_path_buf(),
        source,
    })
}
