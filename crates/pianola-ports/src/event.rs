use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RollEvent {
    /// `velocity == 0` is a key release.
    NoteOn {
        note: MidiNote,
        velocity: u8,
        tick: Tick,
    },
    ControllerChange {
        number: u8,
        value: u8,
        tick: Tick,
    },
    TempoChange {
        us_per_beat: f64,
        tick: Tick,
    },
    /// Raw text event. Roll metadata is carried as `@KEY:\t...\tvalue`.
    MetadataText {
        text: String,
        tick: Tick,
    },
}

impl RollEvent {
    pub fn tick(&self) -> Tick {
        match self {
            RollEvent::NoteOn { tick, .. }
            | RollEvent::ControllerChange { tick, .. }
            | RollEvent::TempoChange { tick, .. }
            | RollEvent::MetadataText { tick, .. } => *tick,
        }
    }
}

pub type RollTrack = Vec<RollEvent>;
