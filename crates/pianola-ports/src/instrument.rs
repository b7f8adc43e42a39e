use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum InstrumentError {
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
    #[error("note handle already released")]
    HandleReleased,
    #[error("note out of range: {0}")]
    NoteOutOfRange(MidiNote),
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Envelope {
    pub fn validate(&self) -> Result<(), InstrumentError> {
        let parts = [
            ("attack", self.attack),
            ("decay", self.decay),
            ("sustain", self.sustain),
            ("release", self.release),
        ];
        for (name, value) in parts {
            if !value.is_finite() || value < 0.0 {
                return Err(InstrumentError::InvalidEnvelope(format!("{name}={value}")));
            }
        }
        Ok(())
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.9,
            release: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteOptions {
    pub gain: f32,
    pub envelope: Envelope,
}

/// A sounding sample. Stopping may fail, e.g. when the sample has already decayed.
pub trait NoteHandle: Send {
    fn stop(&mut self) -> Result<(), InstrumentError>;
}

pub trait InstrumentPort: Send + Sync {
    fn current_time(&self) -> f64;

    fn play(
        &self,
        note: MidiNote,
        start_time: f64,
        options: NoteOptions,
    ) -> Result<Box<dyn NoteHandle>, InstrumentError>;
}
