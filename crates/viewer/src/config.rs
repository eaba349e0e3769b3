//! Viewer configuration (window, cloud field, frame pacing). Loaded from
//! config.ron at startup.

use serde::{Deserialize, Serialize};

/// Persistent viewer settings. Loaded from `config.ron` in the current
/// directory; every field falls back to its default when missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Side length of the square density/normal textures, in pixels.
    #[serde(default = "default_field_size")]
    pub field_size: u32,
    /// Seed for the noise phase table. Same seed, same sky.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of entries in the noise phase table.
    #[serde(default = "default_table_len")]
    pub table_len: usize,
    /// Noise octave count for the density field.
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    /// Target frame rate for the render loop.
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// Present the raw density map in greyscale instead of the shaded sky.
    #[serde(default)]
    pub show_density_map: bool,
    /// Block on GPU completion each frame instead of letting frames overlap.
    #[serde(default)]
    pub wait_for_gpu: bool,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_field_size() -> u32 {
    2048
}
fn default_seed() -> u64 {
    42
}
fn default_table_len() -> usize {
    procgen::DEFAULT_TABLE_LEN
}
fn default_octaves() -> u32 {
    6
}
fn default_target_fps() -> u32 {
    60
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            field_size: default_field_size(),
            seed: default_seed(),
            table_len: default_table_len(),
            octaves: default_octaves(),
            target_fps: default_target_fps(),
            show_density_map: false,
            wait_for_gpu: false,
        }
    }
}

impl ViewerConfig {
    /// Load config from `config.ron`. If the file is missing or invalid,
    /// returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_ron_round_trip() {
        let config = ViewerConfig::default();
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default())
            .expect("serialize");
        let parsed: ViewerConfig = ron::from_str(&text).expect("parse");
        assert_eq!(parsed.field_size, config.field_size);
        assert_eq!(parsed.seed, config.seed);
        assert_eq!(parsed.target_fps, config.target_fps);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let parsed: ViewerConfig = ron::from_str("(seed: 7)").expect("parse");
        assert_eq!(parsed.seed, 7);
        assert_eq!(parsed.field_size, default_field_size());
        assert!(!parsed.show_density_map);
    }
}
