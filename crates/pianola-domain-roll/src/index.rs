use crate::interval_map::PedalIntervalMap;
use crate::metadata::{parse_metadata_text, RollMetadata};
use pianola_ports::event::{RollEvent, RollTrack};
use pianola_ports::types::{PedalKind, Tick, PEDAL_DOWN_VALUE, PEDAL_UP_VALUE};

#[derive(Clone, Debug, Default)]
pub struct RollIndex {
    pub base_tempo: Option<f64>,
    pub pedal_map: PedalIntervalMap,
    pub metadata: RollMetadata,
    pub tempo_changes: Vec<(Tick, f64)>,
    pub last_tick: Tick,
}

impl RollIndex {
    pub fn tempo_at(&self, tick: Tick) -> Option<f64> {
        let idx = self.tempo_changes.partition_point(|(at, _)| *at <= tick);
        idx.checked_sub(1).map(|idx| self.tempo_changes[idx].1)
    }
}

#[derive(Default)]
struct PedalPairing {
    sustain_start: Option<Tick>,
    soft_start: Option<Tick>,
}

impl PedalPairing {
    fn slot(&mut self, kind: PedalKind) -> &mut Option<Tick> {
        match kind {
            PedalKind::Sustain => &mut self.sustain_start,
            PedalKind::Soft => &mut self.soft_start,
        }
    }

    fn apply(&mut self, kind: PedalKind, value: u8, tick: Tick) -> Option<(Tick, Tick)> {
        let slot = self.slot(kind);
        match value {
            PEDAL_DOWN_VALUE => {
                if slot.is_none() {
                    *slot = Some(tick);
                }
                None
            }
            PEDAL_UP_VALUE => slot.take().map(|start| (start, tick)),
            _ => None,
        }
    }
}

/// One pass over every track: base tempo, metadata, and pedal intervals.
///
/// Pedals are paired per track. A press while already down is a confirmation
/// and a release with no press is dropped. A press still open at the end of
/// its track is closed at the piece's last tick.
pub fn build_index(tracks: &[RollTrack]) -> RollIndex {
    let mut index = RollIndex::default();
    let mut earliest_tempo_tick: Option<Tick> = None;
    let mut open_pedals: Vec<(Tick, PedalKind)> = Vec::new();

    for (track_no, track) in tracks.iter().enumerate() {
        let mut pairing = PedalPairing::default();
        for event in track {
            index.last_tick = index.last_tick.max(event.tick());
            match event {
                RollEvent::TempoChange { us_per_beat, tick } => {
                    index.tempo_changes.push((*tick, *us_per_beat));
                    if earliest_tempo_tick.map_or(true, |earliest| *tick < earliest) {
                        index.base_tempo = Some(*us_per_beat);
                        earliest_tempo_tick = Some(*tick);
                    }
                }
                RollEvent::MetadataText { text, .. } => match parse_metadata_text(text) {
                    Some((key, value)) => index.metadata.insert(key, value),
                    None => log::debug!("track {track_no}: ignoring text event {text:?}"),
                },
                RollEvent::ControllerChange {
                    number,
                    value,
                    tick,
                } => {
                    let Some(kind) = PedalKind::from_controller(*number) else {
                        continue;
                    };
                    if let Some((start, end)) = pairing.apply(kind, *value, *tick) {
                        index.pedal_map.insert(start, end, kind);
                    }
                }
                RollEvent::NoteOn { .. } => {}
            }
        }
        for kind in [PedalKind::Sustain, PedalKind::Soft] {
            if let Some(start) = *pairing.slot(kind) {
                open_pedals.push((start, kind));
            }
        }
    }

    // stable: same-tick changes keep track order, as the sequencer merges them
    index.tempo_changes.sort_by_key(|(tick, _)| *tick);

    for (start, kind) in open_pedals {
        log::warn!("{kind} pedal pressed at tick {start} is never released");
        index.pedal_map.insert(start, index.last_tick.max(start), kind);
    }

    if index.base_tempo.is_some_and(|tempo| !tempo.is_finite() || tempo <= 0.0) {
        log::warn!("ignoring unusable base tempo {:?}", index.base_tempo);
        index.base_tempo = None;
    }

    log::info!(
        "indexed {} tracks: {} pedal intervals, {} metadata keys, last tick {}",
        tracks.len(),
        index.pedal_map.len(),
        index.metadata.len(),
        index.last_tick
    );
    index
}
