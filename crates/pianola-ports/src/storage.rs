use crate::instrument::Envelope;
use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_master_volume() -> VolumeRatio {
    VolumeRatio::new(1.0)
}

fn default_bass_volume() -> Volume01 {
    Volume01::new(1.0)
}

fn default_treble_volume() -> Volume01 {
    Volume01::new(1.0)
}

fn default_pan_boundary() -> MidiNote {
    64
}

fn default_soft_pedal_ratio() -> f32 {
    0.67
}

fn default_slider_tempo() -> f64 {
    60.0
}

fn default_sync_interval_ms() -> u64 {
    100
}

fn default_pixels_per_tick() -> f64 {
    1.0
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    #[serde(default = "default_master_volume")]
    pub master_volume: VolumeRatio,
    #[serde(default = "default_bass_volume")]
    pub bass_volume: Volume01,
    #[serde(default = "default_treble_volume")]
    pub treble_volume: Volume01,
    #[serde(default = "default_pan_boundary")]
    pub pan_boundary: MidiNote,
    #[serde(default = "default_soft_pedal_ratio")]
    pub soft_pedal_ratio: f32,
    #[serde(default = "default_slider_tempo")]
    pub slider_tempo: f64,
    pub envelope: Envelope,
    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,
    /// Image pixels per tick along the roll. Scans so far are 1:1.
    #[serde(default = "default_pixels_per_tick")]
    pub pixels_per_tick: f64,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            master_volume: default_master_volume(),
            bass_volume: default_bass_volume(),
            treble_volume: default_treble_volume(),
            pan_boundary: default_pan_boundary(),
            soft_pedal_ratio: default_soft_pedal_ratio(),
            slider_tempo: default_slider_tempo(),
            envelope: Envelope::default(),
            sync_interval_ms: default_sync_interval_ms(),
            pixels_per_tick: default_pixels_per_tick(),
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
