use pianola_ports::storage::SettingsDto;
use pianola_ports::types::{MidiNote, Volume01, VolumeRatio};
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

#[derive(Debug)]
pub struct AudioParams {
    master: AtomicU32,
    bass: AtomicU32,
    treble: AtomicU32,
    soft_ratio: AtomicU32,
    pan_boundary: AtomicU8,
}

impl AudioParams {
    pub fn new(settings: &SettingsDto) -> Self {
        Self {
            master: AtomicU32::new(settings.master_volume.get().to_bits()),
            bass: AtomicU32::new(settings.bass_volume.get().to_bits()),
            treble: AtomicU32::new(settings.treble_volume.get().to_bits()),
            soft_ratio: AtomicU32::new(clamp_ratio(settings.soft_pedal_ratio).to_bits()),
            pan_boundary: AtomicU8::new(settings.pan_boundary),
        }
    }

    pub fn set_master(&self, volume: VolumeRatio) {
        self.master.store(volume.get().to_bits(), Ordering::Relaxed);
    }

    pub fn set_bass(&self, volume: Volume01) {
        self.bass.store(volume.get().to_bits(), Ordering::Relaxed);
    }

    pub fn set_treble(&self, volume: Volume01) {
        self.treble.store(volume.get().to_bits(), Ordering::Relaxed);
    }

    pub fn set_soft_ratio(&self, ratio: f32) {
        self.soft_ratio
            .store(clamp_ratio(ratio).to_bits(), Ordering::Relaxed);
    }

    pub fn set_pan_boundary(&self, note: MidiNote) {
        self.pan_boundary.store(note, Ordering::Relaxed);
    }

    pub fn master(&self) -> f32 {
        f32::from_bits(self.master.load(Ordering::Relaxed))
    }

    pub fn bass(&self) -> f32 {
        f32::from_bits(self.bass.load(Ordering::Relaxed))
    }

    pub fn treble(&self) -> f32 {
        f32::from_bits(self.treble.load(Ordering::Relaxed))
    }

    pub fn soft_ratio(&self) -> f32 {
        f32::from_bits(self.soft_ratio.load(Ordering::Relaxed))
    }

    pub fn pan_boundary(&self) -> MidiNote {
        self.pan_boundary.load(Ordering::Relaxed)
    }

    /// `velocity/100 × master × (soft ? soft_ratio : 1) × (bass or treble)`.
    pub fn note_gain(&self, note: MidiNote, velocity: u8, soft_down: bool) -> f32 {
        let mut gain = velocity as f32 / 100.0 * self.master();
        if soft_down {
            gain *= self.soft_ratio();
        }
        if note < self.pan_boundary() {
            gain *= self.bass();
        } else {
            gain *= self.treble();
        }
        gain
    }
}

impl Default for AudioParams {
    fn default() -> Self {
        Self::new(&SettingsDto::default())
    }
}

fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_nan() {
        return 1.0;
    }
    ratio.clamp(0.0, 1.0)
}
