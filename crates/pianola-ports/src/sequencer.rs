use crate::event::{RollEvent, RollTrack};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SequencerEvent {
    Event(RollEvent),
    EndOfStream,
}

#[derive(thiserror::Error, Debug)]
pub enum SequencerError {
    #[error("no event stream loaded")]
    NotLoaded,
    #[error("invalid tempo: {0}")]
    InvalidTempo(f64),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Polled: `advance` returns, in tick order, every event reached since the last call.
pub trait SequencerPort: Send {
    fn load_events(&mut self, tracks: Vec<RollTrack>) -> Result<(), SequencerError>;

    fn play(&mut self) -> Result<(), SequencerError>;
    fn pause(&mut self) -> Result<(), SequencerError>;
    fn stop(&mut self) -> Result<(), SequencerError>;

    fn set_tempo(&mut self, bpm: f64) -> Result<(), SequencerError>;
    fn skip_to_tick(&mut self, tick: Tick) -> Result<(), SequencerError>;

    fn current_tick(&self) -> Tick;
    fn total_ticks(&self) -> Tick;
    fn is_playing(&self) -> bool;

    fn advance(&mut self, elapsed: Duration) -> Vec<SequencerEvent>;
}
