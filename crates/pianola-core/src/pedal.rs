use pianola_domain_roll::PedalIntervalMap;
use pianola_ports::types::{PedalKind, Tick, PEDAL_DOWN_VALUE, PEDAL_UP_VALUE};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedalState {
    pub down: bool,
    pub locked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedalTransition {
    Down(PedalKind),
    Up(PedalKind),
}

#[derive(Clone, Debug, Default)]
pub struct PedalMachine {
    sustain: PedalState,
    soft: PedalState,
}

impl PedalMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, kind: PedalKind) -> PedalState {
        match kind {
            PedalKind::Sustain => self.sustain,
            PedalKind::Soft => self.soft,
        }
    }

    pub fn is_down(&self, kind: PedalKind) -> bool {
        self.state(kind).down
    }

    pub fn is_locked(&self, kind: PedalKind) -> bool {
        self.state(kind).locked
    }

    pub fn controller_event(&mut self, number: u8, value: u8) -> Option<PedalTransition> {
        let kind = PedalKind::from_controller(number)?;
        if self.state(kind).locked {
            return None;
        }
        match value {
            PEDAL_DOWN_VALUE => self.set_down(kind, true),
            PEDAL_UP_VALUE => self.set_down(kind, false),
            _ => None,
        }
    }

    /// Locking forces the pedal down, unlocking forces it up. The transition is
    /// always reported so the tracker re-snapshots or releases.
    pub fn toggle_lock(&mut self, kind: PedalKind) -> PedalTransition {
        let state = self.state_mut(kind);
        state.locked = !state.locked;
        state.down = state.locked;
        if state.locked {
            PedalTransition::Down(kind)
        } else {
            PedalTransition::Up(kind)
        }
    }

    pub fn restore_at(&mut self, tick: Tick, map: &PedalIntervalMap) -> Vec<PedalTransition> {
        let held = map.search(tick);
        [PedalKind::Sustain, PedalKind::Soft]
            .into_iter()
            .filter_map(|kind| {
                let down = held.contains(kind) || self.state(kind).locked;
                self.set_down(kind, down)
            })
            .collect()
    }

    pub fn reset(&mut self) -> Vec<PedalTransition> {
        [PedalKind::Sustain, PedalKind::Soft]
            .into_iter()
            .filter_map(|kind| {
                let down = self.state(kind).locked;
                self.set_down(kind, down)
            })
            .collect()
    }

    fn set_down(&mut self, kind: PedalKind, down: bool) -> Option<PedalTransition> {
        let state = self.state_mut(kind);
        if state.down == down {
            return None;
        }
        state.down = down;
        Some(if down {
            PedalTransition::Down(kind)
        } else {
            PedalTransition::Up(kind)
        })
    }

    fn state_mut(&mut self, kind: PedalKind) -> &mut PedalState {
        match kind {
            PedalKind::Sustain => &mut self.sustain,
            PedalKind::Soft => &mut self.soft,
        }
    }
}
