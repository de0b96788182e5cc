//! Shader sources bundled into the binary.
//!
//! Sources are addressed by a fixed logical path, independent of where the
//! binary runs from.

use std::collections::HashMap;

use anyhow::Result;

use super::ShaderSource;

pub const VERTEX_SHADER_PATH: &str = "/shaders/vertex_shader.wgsl";
pub const FRAGMENT_SHADER_PATH: &str = "/shaders/fragment_shader.wgsl";

const BUNDLED: &[(&str, &str)] = &[
    (VERTEX_SHADER_PATH, include_str!("shaders/vertex_shader.wgsl")),
    (FRAGMENT_SHADER_PATH, include_str!("shaders/fragment_shader.wgsl")),
];

/// Lookup table from logical path to shader text.
#[derive(Debug, Clone)]
pub struct ShaderAssets {
    sources: HashMap<String, String>,
}

impl Default for ShaderAssets {
    fn default() -> Self {
        Self::bundled()
    }
}

impl ShaderAssets {
    /// The shaders embedded at build time.
    pub fn bundled() -> Self {
        let sources = BUNDLED
            .iter()
            .map(|(path, text)| ((*path).to_string(), (*text).to_string()))
            .collect();
        Self { sources }
    }

    pub fn empty() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Adds or replaces the source stored under `path`.
    pub fn with_source(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.insert(path.into(), text.into());
        self
    }

    /// Reads the full text stored under `path`.
    pub fn load(&self, path: &str) -> Result<ShaderSource> {
        let text = self
            .sources
            .get(path)
            .ok_or_else(|| anyhow::anyhow!("shader resource not found: {path}"))?;
        Ok(ShaderSource::new(path, text.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_sources_are_present_and_non_empty() {
        let assets = ShaderAssets::bundled();
        for path in [VERTEX_SHADER_PATH, FRAGMENT_SHADER_PATH] {
            let src = assets.load(path).unwrap();
            assert_eq!(src.path, path);
            assert!(!src.text.trim().is_empty(), "{path} is empty");
        }
    }

    #[test]
    fn missing_resource_names_the_path() {
        let err = ShaderAssets::empty().load("/shaders/nope.wgsl").unwrap_err();
        assert!(format!("{err}").contains("/shaders/nope.wgsl"));
    }

    #[test]
    fn override_replaces_bundled_source() {
        let assets = ShaderAssets::bundled().with_source(VERTEX_SHADER_PATH, "broken");
        assert_eq!(assets.load(VERTEX_SHADER_PATH).unwrap().text, "broken");
    }
}
