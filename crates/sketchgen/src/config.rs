//! Generator configuration
//!
//! Loaded from JSON; every field has a default, so a partial file only
//! overrides what it names. An unparsable file is logged and replaced by
//! the defaults.

use crate::Result;
use assembler::{AssemblyConfig, ModuleSpec, Palette, Typography};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use store::ExportOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Parent directory of every export
    pub output_root: PathBuf,
    /// Leading part of the output names
    pub file_stem: String,
    /// Validate the laid-out archive before packaging
    pub validate: bool,
    /// Fixed seed for reproducible object IDs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub assembly: AssemblyConfig,
    pub palette: Palette,
    pub typography: Typography,
    pub modules: Vec<ModuleSpec>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let export = ExportOptions::default();
        Self {
            output_root: export.output_root,
            file_stem: export.file_stem,
            validate: export.validate,
            seed: None,
            assembly: AssemblyConfig::default(),
            palette: Palette::default(),
            typography: Typography::default(),
            modules: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file. A missing or unparsable file yields the
    /// defaults; other IO errors are returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<GeneratorConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Failed to parse config file, using defaults: {}", e);
                Ok(Self::default())
            }
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            output_root: self.output_root.clone(),
            file_stem: self.file_stem.clone(),
            validate: self.validate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg.json");
        std::fs::write(
            &path,
            r##"{
                "file_stem": "orders",
                "assembly": {"artboard_name": "Orders"},
                "palette": {"primary": "#FF3B30"},
                "modules": [{"type": "header", "title": "我的订单"}]
            }"##,
        )
        .unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.file_stem, "orders");
        assert!(config.validate);
        assert_eq!(config.assembly.artboard_name, "Orders");
        assert_eq!(config.assembly.width, 393.0);
        assert_eq!(config.palette.primary, "#FF3B30");
        assert_eq!(config.palette.surface, Palette::default().surface);
        assert_eq!(config.typography.title_size, 18.0);
        assert_eq!(config.modules.len(), 1);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = GeneratorConfig::load(tmp.path().join("absent.json")).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_unparsable_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert_eq!(GeneratorConfig::load(&path).unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_export_options() {
        let config = GeneratorConfig {
            validate: false,
            ..Default::default()
        };
        let options = config.export_options();
        assert!(!options.validate);
        assert_eq!(options.file_stem, "design");
    }
}
