use crate::transport::{
    duration_for_ticks, ticks_for_duration, TransportState, DEFAULT_DIVISION, DEFAULT_TEMPO_BPM, MIN_TEMPO_BPM,
};
use pianola_ports::event::{RollEvent, RollTrack};
use pianola_ports::sequencer::{SequencerError, SequencerEvent, SequencerPort};
use pianola_ports::types::Tick;
use std::time::Duration;

pub struct TickSequencer {
    division: u16,
    tempo_bpm: f64,
    events: Vec<RollEvent>,
    cursor: usize,
    position: f64,
    total_ticks: Tick,
    state: TransportState,
    loaded: bool,
}

impl TickSequencer {
    pub fn new(division: u16) -> Self {
        Self {
            division: division.max(1),
            tempo_bpm: DEFAULT_TEMPO_BPM,
            events: Vec::new(),
            cursor: 0,
            position: 0.0,
            total_ticks: 0,
            state: TransportState::Stopped,
            loaded: false,
        }
    }

    pub fn division(&self) -> u16 {
        self.division
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn remaining_time(&self) -> Duration {
        duration_for_ticks(
            self.total_ticks - self.current_tick(),
            self.tempo_bpm,
            self.division,
        )
    }
}

impl Default for TickSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_DIVISION)
    }
}

impl SequencerPort for TickSequencer {
    fn load_events(&mut self, tracks: Vec<RollTrack>) -> Result<(), SequencerError> {
        let mut events: Vec<RollEvent> = tracks.into_iter().flatten().collect();
        // stable: same-tick events keep track order
        events.sort_by_key(|event| event.tick());
        self.total_ticks = events.last().map(|event| event.tick().max(0)).unwrap_or(0);
        self.events = events;
        self.cursor = 0;
        self.position = 0.0;
        self.state = TransportState::Stopped;
        self.loaded = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), SequencerError> {
        if !self.loaded {
            return Err(SequencerError::NotLoaded);
        }
        self.state = TransportState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SequencerError> {
        if self.state == TransportState::Playing {
            self.state = TransportState::Paused;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SequencerError> {
        self.state = TransportState::Stopped;
        self.cursor = 0;
        self.position = 0.0;
        Ok(())
    }

    fn set_tempo(&mut self, bpm: f64) -> Result<(), SequencerError> {
        if !bpm.is_finite() {
            return Err(SequencerError::InvalidTempo(bpm));
        }
        self.tempo_bpm = bpm.max(MIN_TEMPO_BPM);
        Ok(())
    }

    fn skip_to_tick(&mut self, tick: Tick) -> Result<(), SequencerError> {
        let tick = tick.max(0);
        self.position = tick as f64;
        self.cursor = self.events.partition_point(|event| event.tick() < tick);
        Ok(())
    }

    fn current_tick(&self) -> Tick {
        self.position.floor() as Tick
    }

    fn total_ticks(&self) -> Tick {
        self.total_ticks
    }

    fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<SequencerEvent> {
        if self.state != TransportState::Playing {
            return Vec::new();
        }
        self.position += ticks_for_duration(elapsed, self.tempo_bpm, self.division);

        let mut emitted = Vec::new();
        while let Some(event) = self.events.get(self.cursor) {
            if event.tick() as f64 > self.position {
                break;
            }
            emitted.push(SequencerEvent::Event(event.clone()));
            self.cursor += 1;
        }

        if self.cursor >= self.events.len() && self.position >= self.total_ticks as f64 {
            self.position = self.total_ticks as f64;
            self.state = TransportState::Stopped;
            emitted.push(SequencerEvent::EndOfStream);
        }
        emitted
    }
}
