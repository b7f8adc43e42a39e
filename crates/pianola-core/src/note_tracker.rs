use crate::audio_params::AudioParams;
use pianola_domain_roll::note_name;
use pianola_ports::instrument::{Envelope, InstrumentError, InstrumentPort, NoteHandle, NoteOptions};
use pianola_ports::types::MidiNote;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PedalFlags {
    pub sustain_down: bool,
    pub soft_down: bool,
}

pub struct NoteTracker {
    instrument: Arc<dyn InstrumentPort>,
    params: Arc<AudioParams>,
    envelope: Envelope,
    handles: BTreeMap<MidiNote, Box<dyn NoteHandle>>,
    pressed: BTreeSet<MidiNote>,
    sustained: BTreeSet<MidiNote>,
}

impl NoteTracker {
    pub fn new(instrument: Arc<dyn InstrumentPort>, params: Arc<AudioParams>) -> Self {
        Self {
            instrument,
            params,
            envelope: Envelope::default(),
            handles: BTreeMap::new(),
            pressed: BTreeSet::new(),
            sustained: BTreeSet::new(),
        }
    }

    pub fn note_on(&mut self, note: MidiNote, velocity: u8, pedals: PedalFlags) {
        if velocity == 0 {
            self.note_off(note);
            return;
        }

        if let Some(previous) = self.handles.remove(&note) {
            log::debug!("re-striking {}", note_name(note));
            self.stop_handle(note, previous);
        }

        let gain = self.params.note_gain(note, velocity, pedals.soft_down);
        if let Some(handle) = self.trigger(note, gain) {
            self.handles.insert(note, handle);
        }
        self.pressed.insert(note);
        if pedals.sustain_down {
            self.sustained.insert(note);
        }
    }

    /// Key release. A sustained note keeps sounding until the pedal lifts.
    pub fn note_off(&mut self, note: MidiNote) {
        self.pressed.remove(&note);
        if self.sustained.contains(&note) {
            return;
        }
        if let Some(handle) = self.handles.remove(&note) {
            self.stop_handle(note, handle);
        }
    }

    pub fn sustain_down(&mut self) {
        self.sustained.extend(self.pressed.iter().copied());
    }

    pub fn sustain_up(&mut self) {
        let sustained = std::mem::take(&mut self.sustained);
        for note in sustained {
            if self.pressed.contains(&note) {
                continue;
            }
            if let Some(handle) = self.handles.remove(&note) {
                self.stop_handle(note, handle);
            }
        }
    }

    pub fn flush_all(&mut self) {
        let handles = std::mem::take(&mut self.handles);
        if !handles.is_empty() {
            log::debug!("flushing {} notes", handles.len());
        }
        for (note, handle) in handles {
            self.stop_handle(note, handle);
        }
        self.pressed.clear();
        self.sustained.clear();
    }

    pub fn set_instrument(&mut self, instrument: Arc<dyn InstrumentPort>) {
        self.flush_all();
        self.instrument = instrument;
    }

    pub fn set_envelope(&mut self, envelope: Envelope) -> Result<(), InstrumentError> {
        envelope.validate()?;
        self.envelope = envelope;
        Ok(())
    }

    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    pub fn pressed_notes(&self) -> Vec<MidiNote> {
        self.pressed.iter().copied().collect()
    }

    pub fn sounding_notes(&self) -> Vec<MidiNote> {
        self.handles.keys().copied().collect()
    }

    pub fn sustained_notes(&self) -> Vec<MidiNote> {
        self.sustained.iter().copied().collect()
    }

    pub fn is_sounding(&self, note: MidiNote) -> bool {
        self.handles.contains_key(&note)
    }

    pub fn is_sustained(&self, note: MidiNote) -> bool {
        self.sustained.contains(&note)
    }

    fn trigger(&mut self, note: MidiNote, gain: f32) -> Option<Box<dyn NoteHandle>> {
        let start_time = self.instrument.current_time();
        let options = NoteOptions {
            gain,
            envelope: self.envelope,
        };
        match self.instrument.play(note, start_time, options) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::warn!(
                    "could not play {} ({err}), resetting envelope",
                    note_name(note)
                );
                self.envelope = Envelope::default();
                let retry = NoteOptions {
                    gain,
                    envelope: self.envelope,
                };
                match self.instrument.play(note, start_time, retry) {
                    Ok(handle) => Some(handle),
                    Err(err) => {
                        log::warn!("dropping {}: {err}", note_name(note));
                        None
                    }
                }
            }
        }
    }

    fn stop_handle(&mut self, note: MidiNote, mut handle: Box<dyn NoteHandle>) {
        if let Err(err) = handle.stop() {
            log::warn!(
                "could not stop {} ({err}), resetting envelope",
                note_name(note)
            );
            self.envelope = Envelope::default();
        }
    }
}
