use pianola_ports::types::{PedalKind, Tick};
use serde::{Deserialize, Serialize};

/// Closed tick range `[start_tick, end_tick]` during which a pedal was held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedalInterval {
    pub start_tick: Tick,
    pub end_tick: Tick,
    pub kind: PedalKind,
}

impl PedalInterval {
    pub fn new(start_tick: Tick, end_tick: Tick, kind: PedalKind) -> Self {
        let (start_tick, end_tick) = if end_tick < start_tick {
            (end_tick, start_tick)
        } else {
            (start_tick, end_tick)
        };
        Self {
            start_tick,
            end_tick,
            kind,
        }
    }

    pub fn contains(&self, tick: Tick) -> bool {
        self.start_tick <= tick && tick <= self.end_tick
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedalSet {
    pub sustain: bool,
    pub soft: bool,
}

impl PedalSet {
    pub fn insert(&mut self, kind: PedalKind) {
        match kind {
            PedalKind::Sustain => self.sustain = true,
            PedalKind::Soft => self.soft = true,
        }
    }

    pub fn contains(&self, kind: PedalKind) -> bool {
        match kind {
            PedalKind::Sustain => self.sustain,
            PedalKind::Soft => self.soft,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.sustain && !self.soft
    }

    pub fn kinds(&self) -> Vec<PedalKind> {
        [PedalKind::Sustain, PedalKind::Soft]
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackPosition {
    pub tick: Tick,
    pub progress: f64,
}
