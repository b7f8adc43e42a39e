use crate::audio_params::AudioParams;
use crate::ipc::Event;
use crate::note_tracker::{NoteTracker, PedalFlags};
use crate::pedal::{PedalMachine, PedalState, PedalTransition};
use crate::tempo::{TempoController, TempoState};
use crate::transport::TransportState;
use pianola_domain_roll::{build_index, PlaybackPosition, PositionMapper, RollIndex};
use pianola_ports::event::{RollEvent, RollTrack};
use pianola_ports::instrument::{Envelope, InstrumentError, InstrumentPort};
use pianola_ports::sequencer::{SequencerError, SequencerEvent, SequencerPort};
use pianola_ports::storage::SettingsDto;
use pianola_ports::types::{MidiNote, PedalKind, Tick};
use pianola_ports::viewport::{ViewportPoint, ViewportPort, ViewportRect};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

const MANUAL_VELOCITY: u8 = 100;

#[derive(thiserror::Error, Debug)]
pub enum ControlError {
    #[error("sequencer error: {0}")]
    Sequencer(#[from] SequencerError),
    #[error("instrument error: {0}")]
    Instrument(#[from] InstrumentError),
    #[error("no sequencer attached for {0:?}")]
    SourceUnavailable(PlaybackSource),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackSource {
    Roll,
    Score,
}

#[derive(Clone, Copy, Debug)]
pub struct ControllerConfig {
    pub sync_interval: Duration,
    pub pixels_per_tick: f64,
    pub slider_tempo: f64,
}

impl ControllerConfig {
    pub fn from_settings(settings: &SettingsDto) -> Self {
        Self {
            sync_interval: Duration::from_millis(settings.sync_interval_ms.max(1)),
            pixels_per_tick: settings.pixels_per_tick,
            slider_tempo: settings.slider_tempo,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from_settings(&SettingsDto::default())
    }
}

struct LoadedPiece {
    index: RollIndex,
    mapper: PositionMapper,
}

struct Deck {
    sequencer: Box<dyn SequencerPort>,
    piece: Option<LoadedPiece>,
}

impl Deck {
    fn new(sequencer: Box<dyn SequencerPort>) -> Self {
        Self {
            sequencer,
            piece: None,
        }
    }
}

struct SyncTimer {
    interval: Duration,
    elapsed: Duration,
    running: bool,
}

impl SyncTimer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    fn start(&mut self) {
        self.running = true;
        self.elapsed = Duration::ZERO;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed += elapsed;
        if self.elapsed < self.interval {
            return false;
        }
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
        }
        true
    }
}

fn pick<'a>(source: PlaybackSource, roll: &'a Deck, score: &'a Option<Deck>) -> &'a Deck {
    match (source, score) {
        (PlaybackSource::Score, Some(deck)) => deck,
        _ => roll,
    }
}

fn pick_mut<'a>(
    source: PlaybackSource,
    roll: &'a mut Deck,
    score: &'a mut Option<Deck>,
) -> &'a mut Deck {
    match (source, score) {
        (PlaybackSource::Score, Some(deck)) => deck,
        _ => roll,
    }
}

pub struct PlaybackController {
    roll: Deck,
    score: Option<Deck>,
    source: PlaybackSource,
    state: TransportState,
    notes: NoteTracker,
    pedals: PedalMachine,
    tempo: TempoController,
    viewport: Option<Box<dyn ViewportPort>>,
    position: PlaybackPosition,
    sync: SyncTimer,
    pixels_per_tick: f64,
    events: VecDeque<Event>,
}

impl PlaybackController {
    pub fn new(
        sequencer: Box<dyn SequencerPort>,
        instrument: Arc<dyn InstrumentPort>,
        params: Arc<AudioParams>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            roll: Deck::new(sequencer),
            score: None,
            source: PlaybackSource::Roll,
            state: TransportState::Stopped,
            notes: NoteTracker::new(instrument, params),
            pedals: PedalMachine::new(),
            tempo: TempoController::new(config.slider_tempo),
            viewport: None,
            position: PlaybackPosition {
                tick: 0,
                progress: 0.0,
            },
            sync: SyncTimer::new(config.sync_interval),
            pixels_per_tick: config.pixels_per_tick,
            events: VecDeque::new(),
        }
    }

    pub fn attach_score_sequencer(&mut self, sequencer: Box<dyn SequencerPort>) {
        self.score = Some(Deck::new(sequencer));
    }

    pub fn attach_viewport(&mut self, viewport: Box<dyn ViewportPort>) {
        self.viewport = Some(viewport);
    }

    pub fn load_roll(&mut self, tracks: Vec<RollTrack>) -> Result<(), ControlError> {
        self.load(PlaybackSource::Roll, tracks)
    }

    pub fn load_score(&mut self, tracks: Vec<RollTrack>) -> Result<(), ControlError> {
        self.load(PlaybackSource::Score, tracks)
    }

    fn load(&mut self, source: PlaybackSource, tracks: Vec<RollTrack>) -> Result<(), ControlError> {
        if source == PlaybackSource::Score && self.score.is_none() {
            return Err(ControlError::SourceUnavailable(source));
        }
        if source == self.source {
            self.stop()?;
        }

        let index = build_index(&tracks);
        let deck = pick_mut(source, &mut self.roll, &mut self.score);
        deck.sequencer.load_events(tracks)?;
        let total_ticks = match deck.sequencer.total_ticks() {
            0 => index.last_tick,
            total => total,
        };
        let first_hole_px = index.metadata.first_hole_px().unwrap_or(0) as f64;
        let mapper = PositionMapper::new(total_ticks, first_hole_px, self.pixels_per_tick);
        let base_tempo = index.base_tempo;

        log::info!(
            "loaded {source:?}: {} ticks, base tempo {base_tempo:?}, first hole at {first_hole_px}px",
            mapper.total_ticks()
        );
        self.events.push_back(Event::PieceLoaded {
            source,
            total_ticks: mapper.total_ticks(),
            base_tempo,
            metadata: index.metadata.clone(),
        });
        deck.piece = Some(LoadedPiece { index, mapper });

        if source == self.source {
            self.tempo.set_base_tempo(base_tempo);
            self.push_tempo(false);
            self.sync_position(Some(0.0));
        }
        Ok(())
    }

    pub fn select_source(&mut self, source: PlaybackSource) -> Result<(), ControlError> {
        if source == self.source {
            return Ok(());
        }
        if source == PlaybackSource::Score && self.score.is_none() {
            return Err(ControlError::SourceUnavailable(source));
        }
        self.stop()?;
        self.source = source;

        let base_tempo = self
            .deck()
            .piece
            .as_ref()
            .and_then(|piece| piece.index.base_tempo);
        self.tempo.set_base_tempo(base_tempo);
        self.push_tempo(false);
        self.emit_play_state();
        self.sync_position(Some(0.0));
        Ok(())
    }

    pub fn play(&mut self) -> Result<(), ControlError> {
        if self.deck().piece.is_none() {
            log::debug!("play ignored: nothing loaded");
            return Ok(());
        }
        match self.state {
            TransportState::Playing => return Ok(()),
            TransportState::Paused => {}
            TransportState::Stopped => self.snap_home(),
        }
        self.deck_mut().sequencer.play()?;
        self.sync.start();
        self.state = TransportState::Playing;
        log::info!("playing {:?} from tick {}", self.source, self.position.tick);
        self.emit_play_state();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), ControlError> {
        if self.state != TransportState::Playing {
            return Ok(());
        }
        self.sync.stop();
        self.deck_mut().sequencer.pause()?;
        self.state = TransportState::Paused;
        log::info!("paused at tick {}", self.deck().sequencer.current_tick());
        self.emit_play_state();
        Ok(())
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), ControlError> {
        if self.state == TransportState::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    pub fn stop(&mut self) -> Result<(), ControlError> {
        self.sync.stop();
        let stopped = self.deck_mut().sequencer.stop();
        self.notes.flush_all();
        let transitions = self.pedals.reset();
        self.apply_pedals(&transitions);
        self.tempo.reset_ratio();
        self.push_tempo(false);
        if self.state != TransportState::Stopped {
            log::info!("stopped");
        }
        self.state = TransportState::Stopped;
        self.emit_play_state();
        self.emit_pedals();
        self.emit_active_notes();
        self.sync_position(Some(0.0));
        stopped.map_err(ControlError::from)
    }

    /// Jumps to `target`, clamped into the piece. Pedal state and tempo ratio at
    /// the target are recomputed from the index, not replayed.
    pub fn seek(&mut self, target: Tick) -> Result<(), ControlError> {
        let Some(mapper) = self.mapper() else {
            log::debug!("seek ignored: nothing loaded");
            return Ok(());
        };
        let tick = mapper.clamp_tick(target);

        match self.state {
            TransportState::Playing => {
                self.notes.flush_all();
                let sequencer = &mut self.deck_mut().sequencer;
                sequencer.pause()?;
                sequencer.skip_to_tick(tick)?;
                self.restore_pedals(tick);
                self.restore_tempo(tick);
                self.deck_mut().sequencer.play()?;
            }
            TransportState::Paused => {
                self.notes.flush_all();
                self.deck_mut().sequencer.skip_to_tick(tick)?;
                self.restore_pedals(tick);
                self.restore_tempo(tick);
            }
            TransportState::Stopped => {
                self.deck_mut().sequencer.skip_to_tick(tick)?;
                self.restore_pedals(tick);
                self.restore_tempo(tick);
            }
        }
        log::debug!("seek to tick {tick}");
        self.emit_active_notes();
        self.sync_position(Some(tick as f64));
        Ok(())
    }

    pub fn seek_progress(&mut self, progress: f64) -> Result<(), ControlError> {
        let Some(mapper) = self.mapper() else {
            return Ok(());
        };
        self.seek(mapper.progress_to_tick(progress))
    }

    pub fn seek_pixel(&mut self, pixel: f64) -> Result<(), ControlError> {
        let Some(mapper) = self.mapper() else {
            return Ok(());
        };
        self.seek(mapper.pixel_to_tick(pixel))
    }

    pub fn set_slider_tempo(&mut self, bpm: f64) -> Result<(), ControlError> {
        self.tempo.set_slider_tempo(bpm);
        let deck = pick_mut(self.source, &mut self.roll, &mut self.score);
        let applied = self.tempo.apply(deck.sequencer.as_mut());
        self.emit_tempo();
        applied.map_err(ControlError::from)
    }

    pub fn toggle_pedal_lock(&mut self, kind: PedalKind) {
        let transition = self.pedals.toggle_lock(kind);
        log::debug!("{kind} pedal lock -> {}", self.pedals.is_locked(kind));
        self.apply_pedals(&[transition]);
        self.emit_pedals();
    }

    pub fn manual_note(&mut self, note: MidiNote, on: bool) {
        if self.state == TransportState::Playing {
            log::debug!("manual note {note} ignored during playback");
            return;
        }
        if on {
            let flags = self.pedal_flags();
            self.notes.note_on(note, MANUAL_VELOCITY, flags);
        } else {
            self.notes.note_off(note);
        }
        self.emit_active_notes();
    }

    pub fn set_envelope(&mut self, envelope: Envelope) -> Result<(), ControlError> {
        self.notes.set_envelope(envelope)?;
        Ok(())
    }

    pub fn set_instrument(&mut self, instrument: Arc<dyn InstrumentPort>) -> Result<(), ControlError> {
        self.stop()?;
        self.notes.set_instrument(instrument);
        Ok(())
    }

    pub fn set_pixels_per_tick(&mut self, pixels_per_tick: f64) {
        self.pixels_per_tick = pixels_per_tick;
        let decks = std::iter::once(&mut self.roll).chain(self.score.as_mut());
        for deck in decks {
            if let Some(piece) = deck.piece.as_mut() {
                piece.mapper = PositionMapper::new(
                    piece.mapper.total_ticks(),
                    piece.mapper.first_hole_px(),
                    pixels_per_tick,
                );
            }
        }
    }

    pub fn set_sync_interval(&mut self, interval: Duration) {
        self.sync.interval = interval.max(Duration::from_millis(1));
    }

    pub fn advance(&mut self, elapsed: Duration) -> Result<(), ControlError> {
        if self.state != TransportState::Playing {
            return Ok(());
        }
        let fired = self.deck_mut().sequencer.advance(elapsed);
        for output in fired {
            match output {
                SequencerEvent::Event(event) => self.dispatch(event),
                SequencerEvent::EndOfStream => {
                    log::info!("end of stream");
                    return self.stop();
                }
            }
        }
        if self.sync.advance(elapsed) {
            self.sync_position(None);
        }
        Ok(())
    }

    /// Position sync callback. A missing or non-finite tick falls back to the
    /// sequencer's own position.
    pub fn sync_position(&mut self, tick: Option<f64>) {
        let tick = match tick {
            Some(tick) if tick.is_finite() => tick as Tick,
            _ => self.deck().sequencer.current_tick(),
        };
        let mapper = self.mapper().unwrap_or_default();
        self.position = mapper.position(tick);
        let pixel = mapper.tick_to_pixel(self.position.tick);

        if let Some(viewport) = self.viewport.as_mut() {
            let bounds = viewport.current_bounds();
            let line = viewport.image_to_viewport_coordinates(0.0, pixel);
            viewport.pan_to(ViewportPoint {
                x: bounds.width / 2.0,
                y: line.y,
            });
            viewport.update_play_line(line);
        }

        self.events.push_back(Event::PositionUpdated {
            tick: self.position.tick,
            progress: self.position.progress,
            pixel,
        });
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn source(&self) -> PlaybackSource {
        self.source
    }

    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    pub fn pedal_state(&self, kind: PedalKind) -> PedalState {
        self.pedals.state(kind)
    }

    pub fn tempo_state(&self) -> TempoState {
        self.tempo.state()
    }

    pub fn notes(&self) -> &NoteTracker {
        &self.notes
    }

    pub fn index(&self) -> Option<&RollIndex> {
        self.deck().piece.as_ref().map(|piece| &piece.index)
    }

    pub fn mapper(&self) -> Option<PositionMapper> {
        self.deck().piece.as_ref().map(|piece| piece.mapper)
    }

    fn dispatch(&mut self, event: RollEvent) {
        let tick = event.tick();
        match event {
            RollEvent::NoteOn { note, velocity, .. } => {
                if velocity > 0 {
                    let flags = self.pedal_flags();
                    self.notes.note_on(note, velocity, flags);
                } else {
                    self.notes.note_off(note);
                }
                self.emit_active_notes();
            }
            RollEvent::ControllerChange { number, value, .. } => {
                if let Some(transition) = self.pedals.controller_event(number, value) {
                    self.apply_pedals(&[transition]);
                    self.emit_pedals();
                }
            }
            RollEvent::TempoChange { us_per_beat, .. } => {
                self.tempo.on_tempo_change_event(us_per_beat);
                self.push_tempo(true);
            }
            RollEvent::MetadataText { .. } => {}
        }
        self.sync_position(Some(tick as f64));
    }

    fn apply_pedals(&mut self, transitions: &[PedalTransition]) {
        for transition in transitions {
            match transition {
                PedalTransition::Down(PedalKind::Sustain) => self.notes.sustain_down(),
                PedalTransition::Up(PedalKind::Sustain) => self.notes.sustain_up(),
                // soft only scales the gain of later notes
                PedalTransition::Down(PedalKind::Soft) | PedalTransition::Up(PedalKind::Soft) => {}
            }
        }
    }

    fn restore_pedals(&mut self, tick: Tick) {
        let deck = pick(self.source, &self.roll, &self.score);
        let Some(piece) = deck.piece.as_ref() else {
            return;
        };
        let transitions = self.pedals.restore_at(tick, &piece.index.pedal_map);
        self.apply_pedals(&transitions);
        self.emit_pedals();
    }

    fn restore_tempo(&mut self, tick: Tick) {
        let tempo = self
            .deck()
            .piece
            .as_ref()
            .and_then(|piece| piece.index.tempo_at(tick));
        match tempo {
            Some(tempo) => {
                self.tempo.on_tempo_change_event(tempo);
            }
            None => self.tempo.reset_ratio(),
        }
        self.push_tempo(false);
    }

    /// `in_stream` is set when called from event dispatch, where the sequencer
    /// is between events and can take the new rate directly.
    fn push_tempo(&mut self, in_stream: bool) {
        let deck = pick_mut(self.source, &mut self.roll, &mut self.score);
        let pushed = if in_stream {
            deck.sequencer.set_tempo(self.tempo.effective_tempo())
        } else {
            self.tempo.apply(deck.sequencer.as_mut())
        };
        if let Err(err) = pushed {
            log::warn!("could not set tempo: {err}");
        }
        self.emit_tempo();
    }

    fn snap_home(&mut self) {
        let Some(mapper) = self.mapper() else {
            return;
        };
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        viewport.fit_horizontally();
        let bounds = viewport.current_bounds();
        let first_line = viewport.image_to_viewport_coordinates(0.0, mapper.first_hole_px());
        viewport.fit_bounds(ViewportRect {
            x: 0.0,
            y: first_line.y - bounds.height / 2.0,
            width: bounds.width,
            height: bounds.height,
        });
        let bounds = viewport.current_bounds();
        viewport.update_play_line(ViewportPoint {
            x: 0.0,
            y: bounds.y + bounds.height / 2.0,
        });
    }

    fn pedal_flags(&self) -> PedalFlags {
        PedalFlags {
            sustain_down: self.pedals.is_down(PedalKind::Sustain),
            soft_down: self.pedals.is_down(PedalKind::Soft),
        }
    }

    fn deck(&self) -> &Deck {
        pick(self.source, &self.roll, &self.score)
    }

    fn deck_mut(&mut self) -> &mut Deck {
        pick_mut(self.source, &mut self.roll, &mut self.score)
    }

    fn emit_play_state(&mut self) {
        self.events.push_back(Event::PlayStateUpdated {
            state: self.state,
            source: self.source,
        });
    }

    fn emit_pedals(&mut self) {
        self.events.push_back(Event::PedalsUpdated {
            sustain: self.pedals.state(PedalKind::Sustain),
            soft: self.pedals.state(PedalKind::Soft),
        });
    }

    fn emit_active_notes(&mut self) {
        self.events.push_back(Event::ActiveNotesUpdated {
            notes: self.notes.pressed_notes(),
        });
    }

    fn emit_tempo(&mut self) {
        let state = self.tempo.state();
        self.events.push_back(Event::TempoUpdated {
            slider_tempo: state.slider_tempo,
            tempo_ratio: state.tempo_ratio,
            effective_tempo: state.effective_tempo,
        });
    }
}
