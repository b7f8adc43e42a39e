use crate::audio_params::AudioParams;
use crate::controller::{ControlError, ControllerConfig, PlaybackController};
use crate::ipc::{Command, Event};
use crate::queue::CommandReceiver;
use parking_lot::Mutex;
use pianola_ports::instrument::{InstrumentError, InstrumentPort};
use pianola_ports::sequencer::SequencerPort;
use pianola_ports::storage::{SettingsDto, StorageError, StoragePort};
use pianola_ports::viewport::ViewportPort;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("playback error: {0}")]
    Playback(#[from] ControlError),
    #[error("instrument error: {0}")]
    Instrument(#[from] InstrumentError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type SharedApp = Arc<Mutex<AppCore>>;

pub struct AppCore {
    controller: PlaybackController,
    audio_params: Arc<AudioParams>,
    settings: SettingsDto,
    storage: Option<Box<dyn StoragePort>>,
    events: VecDeque<Event>,
}

impl AppCore {
    pub fn new(
        sequencer: Box<dyn SequencerPort>,
        instrument: Arc<dyn InstrumentPort>,
        storage: Option<Box<dyn StoragePort>>,
    ) -> Self {
        let settings = match storage.as_ref().map(|storage| storage.load_settings()) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                log::warn!("could not load settings, using defaults: {err}");
                SettingsDto::default()
            }
            None => SettingsDto::default(),
        };

        let audio_params = Arc::new(AudioParams::new(&settings));
        let mut controller = PlaybackController::new(
            sequencer,
            instrument,
            audio_params.clone(),
            ControllerConfig::from_settings(&settings),
        );
        if let Err(err) = controller.set_envelope(settings.envelope) {
            log::warn!("stored envelope rejected: {err}");
        }

        Self {
            controller,
            audio_params,
            settings,
            storage,
            events: VecDeque::new(),
        }
    }

    pub fn into_shared(self) -> SharedApp {
        Arc::new(Mutex::new(self))
    }

    pub fn attach_viewport(&mut self, viewport: Box<dyn ViewportPort>) {
        self.controller.attach_viewport(viewport);
    }

    pub fn attach_score_sequencer(&mut self, sequencer: Box<dyn SequencerPort>) {
        self.controller.attach_score_sequencer(sequencer);
    }

    pub fn set_instrument(&mut self, instrument: Arc<dyn InstrumentPort>) -> Result<(), AppError> {
        self.controller.set_instrument(instrument)?;
        Ok(())
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), AppError> {
        match cmd {
            Command::LoadRoll { tracks } => self.controller.load_roll(tracks)?,
            Command::LoadScore { tracks } => self.controller.load_score(tracks)?,
            Command::SelectSource { source } => self.controller.select_source(source)?,
            Command::Play => self.controller.play()?,
            Command::Pause => self.controller.pause()?,
            Command::TogglePlayPause => self.controller.toggle_play_pause()?,
            Command::Stop => self.controller.stop()?,
            Command::Seek { tick } => self.controller.seek(tick)?,
            Command::SeekProgress { progress } => self.controller.seek_progress(progress)?,
            Command::SeekPixel { pixel } => self.controller.seek_pixel(pixel)?,
            Command::SetSliderTempo { bpm } => {
                self.controller.set_slider_tempo(bpm)?;
                self.settings.slider_tempo = self.controller.tempo_state().slider_tempo;
                self.settings_changed();
            }
            Command::SetMasterVolume { volume } => {
                self.settings.master_volume = volume;
                self.audio_params.set_master(volume);
                self.settings_changed();
            }
            Command::SetBassVolume { volume } => {
                self.settings.bass_volume = volume;
                self.audio_params.set_bass(volume);
                self.settings_changed();
            }
            Command::SetTrebleVolume { volume } => {
                self.settings.treble_volume = volume;
                self.audio_params.set_treble(volume);
                self.settings_changed();
            }
            Command::SetSoftPedalRatio { ratio } => {
                self.audio_params.set_soft_ratio(ratio);
                self.settings.soft_pedal_ratio = self.audio_params.soft_ratio();
                self.settings_changed();
            }
            Command::SetPanBoundary { note } => {
                self.settings.pan_boundary = note;
                self.audio_params.set_pan_boundary(note);
                self.settings_changed();
            }
            Command::SetEnvelope { envelope } => {
                self.controller.set_envelope(envelope)?;
                self.settings.envelope = envelope;
                self.settings_changed();
            }
            Command::TogglePedalLock { pedal } => self.controller.toggle_pedal_lock(pedal),
            Command::ManualNote { note, on } => self.controller.manual_note(note, on),
            Command::SyncPosition { tick } => self.controller.sync_position(tick),
        }
        Ok(())
    }

    pub fn pump(&mut self, commands: &mut CommandReceiver) -> Vec<AppError> {
        let mut errors = Vec::new();
        for cmd in commands.drain() {
            if let Err(err) = self.handle_command(cmd) {
                log::warn!("command failed: {err}");
                errors.push(err);
            }
        }
        errors
    }

    pub fn tick(&mut self, elapsed: Duration) -> Result<(), AppError> {
        self.controller.advance(elapsed)?;
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.drain(..).collect();
        events.extend(self.controller.drain_events());
        events
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    fn settings_changed(&mut self) {
        self.events.push_back(Event::SettingsUpdated {
            settings: self.settings.clone(),
        });
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                log::warn!("could not save settings: {err}");
            }
        }
    }
}
