use serde::{Deserialize, Serialize};
use std::fmt;

pub type Tick = i64; // roll time, monotonic in the event stream
pub type MidiNote = u8;

pub const SUSTAIN_CONTROLLER: u8 = 64;
pub const SOFT_CONTROLLER: u8 = 67;
pub const PEDAL_DOWN_VALUE: u8 = 127;
pub const PEDAL_UP_VALUE: u8 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PedalKind {
    Sustain,
    Soft,
}

impl PedalKind {
    pub fn from_controller(number: u8) -> Option<Self> {
        match number {
            SUSTAIN_CONTROLLER => Some(Self::Sustain),
            SOFT_CONTROLLER => Some(Self::Soft),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sustain => "sustain",
            Self::Soft => "soft",
        }
    }
}

impl fmt::Display for PedalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Volume01(pub f32);

impl Volume01 {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeRatio(pub f32);

impl VolumeRatio {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(1.0);
        }
        Self(value.clamp(0.0, 2.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for VolumeRatio {
    fn default() -> Self {
        Self(1.0)
    }
}
