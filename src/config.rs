use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::landmarks::LandmarkSchema;
use crate::rep_counter::Thresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera_id: i32,
    pub model_path: String,
    /// Pose presence score below which a frame counts as "no body"
    pub detection_confidence: f32,
    pub window_title: String,
    pub quit_key: char,
    pub thresholds: Thresholds,
    pub landmarks: LandmarkSchema,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_id: 0,
            model_path: "models/blazepose.onnx".to_string(),
            detection_confidence: 0.5,
            window_title: "Shoulder Press Strict Tracker".to_string(),
            quit_key: 'q',
            thresholds: Thresholds::default(),
            landmarks: LandmarkSchema::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Check that thresholds and the landmark mapping make sense
    pub fn validate(&self) -> std::result::Result<(), TrackerError> {
        let t = &self.thresholds;

        if !(t.retracted < t.extended) {
            return Err(TrackerError::Config(format!(
                "retracted threshold ({}) must be below extended threshold ({})",
                t.retracted, t.extended
            )));
        }
        if !(t.form_min < t.form_max) {
            return Err(TrackerError::Config(format!(
                "form_min ({}) must be below form_max ({})",
                t.form_min, t.form_max
            )));
        }
        if !(0.0..=1.0).contains(&self.detection_confidence) {
            return Err(TrackerError::Config(format!(
                "detection_confidence must be within 0..=1, got {}",
                self.detection_confidence
            )));
        }
        if self.landmarks.has_duplicates() {
            return Err(TrackerError::Config(
                "landmark roles must map to distinct indices".to_string(),
            ));
        }
        if !self.quit_key.is_ascii() {
            return Err(TrackerError::Config(format!(
                "quit_key must be an ASCII key, got {:?}",
                self.quit_key
            )));
        }

        Ok(())
    }
}
