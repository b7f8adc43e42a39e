use crate::controller::PlaybackSource;
use crate::pedal::PedalState;
use crate::transport::TransportState;
use pianola_domain_roll::RollMetadata;
use pianola_ports::event::RollTrack;
use pianola_ports::instrument::Envelope;
use pianola_ports::storage::SettingsDto;
use pianola_ports::types::{MidiNote, PedalKind, Tick, Volume01, VolumeRatio};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    LoadRoll { tracks: Vec<RollTrack> },
    LoadScore { tracks: Vec<RollTrack> },
    SelectSource { source: PlaybackSource },
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    Seek { tick: Tick },
    SeekProgress { progress: f64 },
    SeekPixel { pixel: f64 },
    SetSliderTempo { bpm: f64 },
    SetMasterVolume { volume: VolumeRatio },
    SetBassVolume { volume: Volume01 },
    SetTrebleVolume { volume: Volume01 },
    SetSoftPedalRatio { ratio: f32 },
    SetPanBoundary { note: MidiNote },
    SetEnvelope { envelope: Envelope },
    TogglePedalLock { pedal: PedalKind },
    ManualNote { note: MidiNote, on: bool },
    SyncPosition { tick: Option<f64> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    PlayStateUpdated {
        state: TransportState,
        source: PlaybackSource,
    },
    PositionUpdated {
        tick: Tick,
        progress: f64,
        pixel: f64,
    },
    PedalsUpdated {
        sustain: PedalState,
        soft: PedalState,
    },
    ActiveNotesUpdated {
        notes: Vec<MidiNote>,
    },
    TempoUpdated {
        slider_tempo: f64,
        tempo_ratio: f64,
        effective_tempo: f64,
    },
    PieceLoaded {
        source: PlaybackSource,
        total_ticks: Tick,
        base_tempo: Option<f64>,
        metadata: RollMetadata,
    },
    SettingsUpdated {
        settings: SettingsDto,
    },
}

pub fn parse_command(json: &str) -> Result<Command, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn events_to_json(events: &[Event]) -> Result<String, serde_json::Error> {
    serde_json::to_string(events)
}
