//! Static gallery configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it wants to
//! override:
//!
//! ```json
//! { "images": ["/a.jpeg", "/b.jpeg"], "layout": { "columns": 2 } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GalleryError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Directory that URL-style identifiers such as `/art1.jpeg` resolve against.
    pub asset_root: PathBuf,
    /// Image identifiers in grid order (row-major).
    pub images: Vec<String>,
    pub layout: GridLayout,
    pub panel: PanelSize,
    pub rotation: RotationConfig,
    pub camera: CameraConfig,
    pub audio: AudioConfig,
    pub window: WindowConfig,
}

/// Grid placement parameters used by the scene builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub columns: usize,
    pub spacing_x: f32,
    pub spacing_y: f32,
    /// Height of the first row; later rows step down by `spacing_y`.
    pub top_y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSize {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub enabled: bool,
    /// Radians added around the vertical axis per frame.
    pub increment: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub track: String,
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("public"),
            images: (1..=18).map(|i| format!("/art{i}.jpeg")).collect(),
            layout: GridLayout::default(),
            panel: PanelSize::default(),
            rotation: RotationConfig::default(),
            camera: CameraConfig::default(),
            audio: AudioConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 6,
            spacing_x: 3.0,
            spacing_y: 3.0,
            top_y: 3.0,
            z: 0.0,
        }
    }
}

impl Default for PanelSize {
    fn default() -> Self {
        Self {
            width: 1.6,
            height: 1.6,
            depth: 0.12,
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            increment: 0.005,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            distance: 5.0,
            min_distance: 2.0,
            max_distance: 12.0,
            damping_factor: 0.08,
            rotate_speed: 0.005,
            zoom_speed: 0.5,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            track: "/soft-bg.mp3".to_string(),
            volume: 0.2,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "artgrid".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

impl GalleryConfig {
    /// Reads a JSON config file and validates it.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| GalleryError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&json).map_err(|source| GalleryError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(GalleryError::InvalidConfig(msg));

        if self.layout.columns == 0 {
            return invalid("layout.columns must be at least 1".into());
        }
        if self.images.is_empty() {
            return invalid("images must list at least one identifier".into());
        }
        if let Some(index) = self.images.iter().position(|id| id.trim().is_empty()) {
            return invalid(format!("images[{index}] is empty"));
        }
        if self.layout.spacing_x <= 0.0 || self.layout.spacing_y <= 0.0 {
            return invalid("layout spacing must be positive".into());
        }
        if self.camera.min_distance <= 0.0 || self.camera.min_distance > self.camera.max_distance {
            return invalid(format!(
                "camera distance bounds [{}, {}] are inverted or non-positive",
                self.camera.min_distance, self.camera.max_distance
            ));
        }
        if !(0.0..=1.0).contains(&self.camera.damping_factor) {
            return invalid("camera.damping_factor must be within [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return invalid("audio.volume must be within [0, 1]".into());
        }
        Ok(())
    }

    /// Maps an identifier like `/art1.jpeg` to a file under `asset_root`.
    pub fn resolve_asset(&self, identifier: &str) -> PathBuf {
        self.asset_root.join(identifier.trim_start_matches('/'))
    }
}
