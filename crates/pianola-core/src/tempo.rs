use pianola_ports::sequencer::{SequencerError, SequencerPort};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TempoState {
    pub base_tempo: Option<f64>,
    pub tempo_ratio: f64,
    pub slider_tempo: f64,
    pub effective_tempo: f64,
}

/// `effective = slider × ratio`, where `ratio = 1 + (tempo − base) / base` for
/// the most recent tempo event. Without a base tempo the ratio stays 1.
#[derive(Clone, Debug)]
pub struct TempoController {
    base_tempo: Option<f64>,
    tempo_ratio: f64,
    slider_tempo: f64,
}

impl TempoController {
    pub fn new(slider_tempo: f64) -> Self {
        Self {
            base_tempo: None,
            tempo_ratio: 1.0,
            slider_tempo: sanitize_bpm(slider_tempo).unwrap_or(60.0),
        }
    }

    pub fn set_base_tempo(&mut self, base_tempo: Option<f64>) {
        self.base_tempo = base_tempo.filter(|tempo| tempo.is_finite() && *tempo > 0.0);
        self.tempo_ratio = 1.0;
    }

    pub fn reset_ratio(&mut self) {
        self.tempo_ratio = 1.0;
    }

    pub fn set_slider_tempo(&mut self, bpm: f64) -> f64 {
        match sanitize_bpm(bpm) {
            Some(bpm) => self.slider_tempo = bpm,
            None => log::warn!("ignoring slider tempo {bpm}"),
        }
        self.effective_tempo()
    }

    pub fn on_tempo_change_event(&mut self, tempo: f64) -> f64 {
        match self.base_tempo {
            Some(base) if tempo.is_finite() => {
                self.tempo_ratio = 1.0 + (tempo - base) / base;
            }
            Some(_) => log::warn!("ignoring tempo event {tempo}"),
            None => {}
        }
        self.effective_tempo()
    }

    pub fn effective_tempo(&self) -> f64 {
        self.slider_tempo * self.tempo_ratio
    }

    pub fn base_tempo(&self) -> Option<f64> {
        self.base_tempo
    }

    pub fn tempo_ratio(&self) -> f64 {
        self.tempo_ratio
    }

    pub fn slider_tempo(&self) -> f64 {
        self.slider_tempo
    }

    pub fn state(&self) -> TempoState {
        TempoState {
            base_tempo: self.base_tempo,
            tempo_ratio: self.tempo_ratio,
            slider_tempo: self.slider_tempo,
            effective_tempo: self.effective_tempo(),
        }
    }

    pub fn apply(&self, sequencer: &mut dyn SequencerPort) -> Result<(), SequencerError> {
        let bpm = self.effective_tempo();
        if sequencer.is_playing() {
            sequencer.pause()?;
            let applied = sequencer.set_tempo(bpm);
            sequencer.play()?;
            applied
        } else {
            sequencer.set_tempo(bpm)
        }
    }
}

impl Default for TempoController {
    fn default() -> Self {
        Self::new(60.0)
    }
}

fn sanitize_bpm(bpm: f64) -> Option<f64> {
    if bpm.is_finite() {
        Some(bpm.max(0.0))
    } else {
        None
    }
}
