use std::fs;
use std::path::Path;

use scrawl::ExtractOptions;
use scrawl_embedded_graphics::{EgRenderConfig, DEFAULT_TEXTURE_STRENGTH};
use scrawl_render::{FlowConfig, LayoutConfig};
use serde::{Deserialize, Serialize};

/// Settings file accepted by `--config`. Every section is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub extract: ExtractOptions,
    pub flow: FlowConfig,
    pub pages: LayoutConfig,
    pub render: EgRenderConfig,
    pub texture: TextureConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub enabled: bool,
    pub strength: f32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: DEFAULT_TEXTURE_STRENGTH,
        }
    }
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("unable to read config {}: {}", path.display(), e))?;
        Self::from_json(&raw).map_err(|e| format!("invalid config {}: {}", path.display(), e))
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
