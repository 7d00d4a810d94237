//! Schema for `variant.toml`, the manifest sitting at the root of every
//! on-disk variant pack.
//!
//! `VariantManifest::validate` returns human-readable issues instead of
//! failing on the first one, so pack loading can report everything wrong with
//! a manifest in a single pass.
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct VariantManifest {
    pub name: String,
    pub fragment: PathBuf,
    #[serde(default)]
    pub vertex: Option<PathBuf>,
    #[serde(default)]
    pub description: Option<String>,
}

impl VariantManifest {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let name = self.name.trim();
        if name.is_empty() {
            issues.push("variant name must not be empty".to_string());
        } else if !name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            issues.push(format!(
                "variant name '{name}' may only contain ASCII letters, digits, '-' or '_'"
            ));
        }
        if self.fragment.as_os_str().is_empty() {
            issues.push("fragment source path must not be empty".to_string());
        }
        if self.fragment.is_absolute() {
            issues.push("fragment source path must be relative to the pack".to_string());
        }
        if let Some(vertex) = &self.vertex {
            if vertex.as_os_str().is_empty() || vertex.is_absolute() {
                issues.push("vertex source path must be a relative path".to_string());
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_bad_names_and_paths() {
        let manifest: VariantManifest = toml::from_str(
            r#"
name = "bad name"
fragment = "/etc/shader.frag"
"#,
        )
        .unwrap();
        let issues = manifest.validate();
        assert_eq!(issues.len(), 2, "{issues:?}");
    }

    #[test]
    fn accepts_minimal_manifest() {
        let manifest: VariantManifest = toml::from_str(
            r#"
name = "aurora"
fragment = "aurora.frag"
"#,
        )
        .unwrap();
        assert!(manifest.validate().is_empty());
        assert!(manifest.vertex.is_none());
    }
}
