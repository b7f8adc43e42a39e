use parking_lot::Mutex;
use pianola_ports::instrument::{Envelope, InstrumentError, InstrumentPort, NoteHandle, NoteOptions};
use pianola_ports::types::MidiNote;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Sine-voice instrument with a per-note ADSR envelope. Rendering is pulled by
/// the host's audio callback through [`SimpleInstrument::render`].
pub struct SimpleInstrument {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    sample_rate_hz: f32,
    max_voices: usize,
    voices: Vec<Voice>,
    next_id: u64,
    rendered_frames: u64,
}

#[derive(Clone, Debug)]
struct Voice {
    id: u64,
    note: MidiNote,
    freq: f32,
    phase: f32,
    gain: f32,
    envelope: Envelope,
    elapsed_samples: u64,
    release: Option<Release>,
}

#[derive(Clone, Copy, Debug)]
struct Release {
    from_level: f32,
    samples_left: u32,
    total_samples: u32,
}

pub struct SimpleNoteHandle {
    id: u64,
    inner: Arc<Mutex<Inner>>,
}

impl SimpleInstrument {
    pub fn new(sample_rate_hz: u32, max_voices: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                sample_rate_hz: sample_rate_hz.max(1) as f32,
                max_voices: max_voices.max(8),
                voices: Vec::new(),
                next_id: 0,
                rendered_frames: 0,
            })),
        }
    }

    pub fn set_sample_rate(&self, sample_rate_hz: u32) {
        let mut inner = self.inner.lock();
        inner.sample_rate_hz = sample_rate_hz.max(1) as f32;
    }

    pub fn sounding_notes(&self) -> Vec<MidiNote> {
        let inner = self.inner.lock();
        inner.voices.iter().map(|voice| voice.note).collect()
    }

    pub fn voice_count(&self) -> usize {
        self.inner.lock().voices.len()
    }

    pub fn render(&self, frames: usize, out_l: &mut [f32], out_r: &mut [f32]) {
        let mut inner = self.inner.lock();
        inner.render(frames, out_l, out_r);
    }
}

impl Default for SimpleInstrument {
    fn default() -> Self {
        Self::new(48_000, 64)
    }
}

impl Inner {
    fn start_voice(&mut self, note: MidiNote, options: NoteOptions) -> u64 {
        if self.voices.len() >= self.max_voices {
            if let Some((idx, _)) = self
                .voices
                .iter()
                .enumerate()
                .min_by_key(|(_, voice)| voice.id)
            {
                log::debug!("voice limit reached, stealing note {}", self.voices[idx].note);
                self.voices.swap_remove(idx);
            }
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.voices.push(Voice {
            id,
            note,
            freq: 440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0),
            phase: 0.0,
            gain: if options.gain.is_finite() {
                options.gain.max(0.0)
            } else {
                0.0
            },
            envelope: options.envelope,
            elapsed_samples: 0,
            release: None,
        });
        id
    }

    fn release_voice(&mut self, id: u64) -> Result<(), InstrumentError> {
        let sample_rate_hz = self.sample_rate_hz;
        let voice = self
            .voices
            .iter_mut()
            .find(|voice| voice.id == id && voice.release.is_none())
            .ok_or(InstrumentError::HandleReleased)?;
        let total_samples = ((voice.envelope.release * sample_rate_hz) as u32).max(1);
        voice.release = Some(Release {
            from_level: voice.level(sample_rate_hz),
            samples_left: total_samples,
            total_samples,
        });
        Ok(())
    }

    fn render(&mut self, frames: usize, out_l: &mut [f32], out_r: &mut [f32]) {
        let frames = frames.min(out_l.len()).min(out_r.len());
        for value in out_l[..frames].iter_mut() {
            *value = 0.0;
        }
        for value in out_r[..frames].iter_mut() {
            *value = 0.0;
        }

        let amplitude = 0.2;
        let sample_rate_hz = self.sample_rate_hz;
        for voice in &mut self.voices {
            let phase_step = TAU * voice.freq / sample_rate_hz;
            for i in 0..frames {
                let level = voice.level(sample_rate_hz);
                if let Some(release) = voice.release.as_mut() {
                    release.samples_left = release.samples_left.saturating_sub(1);
                }
                voice.elapsed_samples += 1;

                let sample = voice.phase.sin() * level * voice.gain * amplitude;
                out_l[i] += sample;
                out_r[i] += sample;
                voice.phase += phase_step;
                if voice.phase >= TAU {
                    voice.phase -= TAU;
                }
            }
        }

        self.voices.retain(|voice| !voice.finished(sample_rate_hz));
        self.rendered_frames += frames as u64;
    }
}

impl Voice {
    fn level(&self, sample_rate_hz: f32) -> f32 {
        if let Some(release) = self.release {
            return release.from_level * release.samples_left as f32 / release.total_samples as f32;
        }
        let t = self.elapsed_samples as f32 / sample_rate_hz;
        let env = self.envelope;
        if t < env.attack {
            return t / env.attack;
        }
        let t = t - env.attack;
        if t < env.decay {
            return 1.0 - (1.0 - env.sustain) * (t / env.decay);
        }
        env.sustain
    }

    fn finished(&self, sample_rate_hz: f32) -> bool {
        match self.release {
            Some(release) => release.samples_left == 0,
            None => {
                let t = self.elapsed_samples as f32 / sample_rate_hz;
                self.envelope.sustain <= 0.0 && t >= self.envelope.attack + self.envelope.decay
            }
        }
    }
}

impl NoteHandle for SimpleNoteHandle {
    fn stop(&mut self) -> Result<(), InstrumentError> {
        self.inner.lock().release_voice(self.id)
    }
}

impl InstrumentPort for SimpleInstrument {
    fn current_time(&self) -> f64 {
        let inner = self.inner.lock();
        inner.rendered_frames as f64 / inner.sample_rate_hz as f64
    }

    fn play(
        &self,
        note: MidiNote,
        _start_time: f64,
        options: NoteOptions,
    ) -> Result<Box<dyn NoteHandle>, InstrumentError> {
        if note > 127 {
            return Err(InstrumentError::NoteOutOfRange(note));
        }
        options.envelope.validate()?;
        let id = self.inner.lock().start_voice(note, options);
        Ok(Box::new(SimpleNoteHandle {
            id,
            inner: self.inner.clone(),
        }))
    }
}
