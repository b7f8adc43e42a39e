use pianola_ports::types::Tick;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DIVISION: u16 = 480;
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
pub const MIN_TEMPO_BPM: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
}

pub fn ticks_for_duration(elapsed: Duration, bpm: f64, division: u16) -> f64 {
    elapsed.as_secs_f64() * bpm / 60.0 * division as f64
}

pub fn duration_for_ticks(ticks: Tick, bpm: f64, division: u16) -> Duration {
    if ticks <= 0 || bpm <= 0.0 || division == 0 {
        return Duration::ZERO;
    }
    let seconds = ticks as f64 * 60.0 / (bpm * division as f64);
    Duration::from_secs_f64(seconds)
}
