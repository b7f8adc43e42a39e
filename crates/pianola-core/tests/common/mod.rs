#![allow(dead_code)]

use parking_lot::Mutex;
use pianola_core::TickSequencer;
use pianola_ports::event::{RollEvent, RollTrack};
use pianola_ports::instrument::{InstrumentError, InstrumentPort, NoteHandle, NoteOptions};
use pianola_ports::sequencer::{SequencerError, SequencerEvent, SequencerPort};
use pianola_ports::storage::{SettingsDto, StorageError, StoragePort};
use pianola_ports::types::{MidiNote, Tick};
use pianola_ports::viewport::{ViewportPoint, ViewportPort, ViewportRect};
use std::sync::Arc;
use std::time::Duration;

pub fn note_on(note: MidiNote, velocity: u8, tick: Tick) -> RollEvent {
    RollEvent::NoteOn {
        note,
        velocity,
        tick,
    }
}

pub fn cc(number: u8, value: u8, tick: Tick) -> RollEvent {
    RollEvent::ControllerChange {
        number,
        value,
        tick,
    }
}

pub fn tempo(us_per_beat: f64, tick: Tick) -> RollEvent {
    RollEvent::TempoChange { us_per_beat, tick }
}

pub fn text(text: &str, tick: Tick) -> RollEvent {
    RollEvent::MetadataText {
        text: text.to_string(),
        tick,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Played {
    pub id: u64,
    pub note: MidiNote,
    pub options: NoteOptions,
}

#[derive(Default)]
pub struct InstrumentLog {
    pub played: Vec<Played>,
    pub stopped: Vec<u64>,
    pub failing_plays: usize,
    next_id: u64,
}

impl InstrumentLog {
    pub fn stop_count(&self, id: u64) -> usize {
        self.stopped.iter().filter(|stopped| **stopped == id).count()
    }

    /// Handle ids issued for `note`, oldest first.
    pub fn ids_for(&self, note: MidiNote) -> Vec<u64> {
        self.played
            .iter()
            .filter(|played| played.note == note)
            .map(|played| played.id)
            .collect()
    }
}

/// Records every trigger and every stop, per handle.
#[derive(Clone, Default)]
pub struct RecordingInstrument {
    pub log: Arc<Mutex<InstrumentLog>>,
}

struct RecordingHandle {
    id: u64,
    log: Arc<Mutex<InstrumentLog>>,
}

impl NoteHandle for RecordingHandle {
    fn stop(&mut self) -> Result<(), InstrumentError> {
        self.log.lock().stopped.push(self.id);
        Ok(())
    }
}

impl InstrumentPort for RecordingInstrument {
    fn current_time(&self) -> f64 {
        0.0
    }

    fn play(
        &self,
        note: MidiNote,
        _start_time: f64,
        options: NoteOptions,
    ) -> Result<Box<dyn NoteHandle>, InstrumentError> {
        let mut log = self.log.lock();
        if log.failing_plays > 0 {
            log.failing_plays -= 1;
            return Err(InstrumentError::Backend("voice allocation failed".to_string()));
        }
        log.next_id += 1;
        let id = log.next_id;
        log.played.push(Played { id, note, options });
        Ok(Box::new(RecordingHandle {
            id,
            log: self.log.clone(),
        }))
    }
}

#[derive(Default)]
pub struct SequencerLog {
    pub calls: Vec<String>,
    pub tempos: Vec<f64>,
}

/// Real [`TickSequencer`] with every port call recorded.
pub struct RecordingSequencer {
    inner: TickSequencer,
    pub log: Arc<Mutex<SequencerLog>>,
}

impl RecordingSequencer {
    pub fn new() -> (Self, Arc<Mutex<SequencerLog>>) {
        let log = Arc::new(Mutex::new(SequencerLog::default()));
        (
            Self {
                inner: TickSequencer::default(),
                log: log.clone(),
            },
            log,
        )
    }

    fn record(&self, call: &str) {
        self.log.lock().calls.push(call.to_string());
    }
}

impl SequencerPort for RecordingSequencer {
    fn load_events(&mut self, tracks: Vec<RollTrack>) -> Result<(), SequencerError> {
        self.record("load");
        self.inner.load_events(tracks)
    }

    fn play(&mut self) -> Result<(), SequencerError> {
        self.record("play");
        self.inner.play()
    }

    fn pause(&mut self) -> Result<(), SequencerError> {
        self.record("pause");
        self.inner.pause()
    }

    fn stop(&mut self) -> Result<(), SequencerError> {
        self.record("stop");
        self.inner.stop()
    }

    fn set_tempo(&mut self, bpm: f64) -> Result<(), SequencerError> {
        self.log.lock().tempos.push(bpm);
        self.inner.set_tempo(bpm)
    }

    fn skip_to_tick(&mut self, tick: Tick) -> Result<(), SequencerError> {
        self.record(&format!("skip {tick}"));
        self.inner.skip_to_tick(tick)
    }

    fn current_tick(&self) -> Tick {
        self.inner.current_tick()
    }

    fn total_ticks(&self) -> Tick {
        self.inner.total_ticks()
    }

    fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<SequencerEvent> {
        self.inner.advance(elapsed)
    }
}

#[derive(Default)]
pub struct ViewportLog {
    pub pans: Vec<ViewportPoint>,
    pub play_lines: Vec<ViewportPoint>,
    pub fitted: Vec<ViewportRect>,
    pub fit_horizontally: usize,
}

/// Image pixels map to viewport units at 1/1000.
pub struct RecordingViewport {
    bounds: ViewportRect,
    pub log: Arc<Mutex<ViewportLog>>,
}

impl RecordingViewport {
    pub fn new() -> (Self, Arc<Mutex<ViewportLog>>) {
        let log = Arc::new(Mutex::new(ViewportLog::default()));
        (
            Self {
                bounds: ViewportRect {
                    x: 0.0,
                    y: 0.0,
                    width: 1.0,
                    height: 0.5,
                },
                log: log.clone(),
            },
            log,
        )
    }
}

impl ViewportPort for RecordingViewport {
    fn pan_to(&mut self, center: ViewportPoint) {
        self.log.lock().pans.push(center);
    }

    fn fit_bounds(&mut self, bounds: ViewportRect) {
        self.bounds = bounds;
        self.log.lock().fitted.push(bounds);
    }

    fn fit_horizontally(&mut self) {
        self.log.lock().fit_horizontally += 1;
    }

    fn current_bounds(&self) -> ViewportRect {
        self.bounds
    }

    fn image_to_viewport_coordinates(&self, x: f64, y: f64) -> ViewportPoint {
        ViewportPoint {
            x: x / 1000.0,
            y: y / 1000.0,
        }
    }

    fn update_play_line(&mut self, at: ViewportPoint) {
        self.log.lock().play_lines.push(at);
    }
}

/// In-memory settings store that counts saves.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub saved: Arc<Mutex<Vec<SettingsDto>>>,
    pub initial: Option<SettingsDto>,
}

impl StoragePort for MemoryStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        Ok(self.initial.clone().unwrap_or_default())
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        self.saved.lock().push(s.clone());
        Ok(())
    }
}
