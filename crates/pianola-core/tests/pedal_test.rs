use pianola_core::{PedalMachine, PedalTransition};
use pianola_domain_roll::{PedalInterval, PedalIntervalMap};
use pianola_ports::types::PedalKind;
use pretty_assertions::assert_eq;

#[test]
fn repeated_pedal_value_is_a_confirmation() {
    let mut pedals = PedalMachine::new();

    assert_eq!(
        pedals.controller_event(64, 127),
        Some(PedalTransition::Down(PedalKind::Sustain))
    );
    assert_eq!(pedals.controller_event(64, 127), None);
    assert_eq!(
        pedals.controller_event(64, 0),
        Some(PedalTransition::Up(PedalKind::Sustain))
    );
    assert_eq!(pedals.controller_event(64, 0), None);
    assert_eq!(pedals.controller_event(7, 127), None);
}

#[test]
fn locked_pedal_ignores_stream() {
    let mut pedals = PedalMachine::new();

    assert_eq!(
        pedals.toggle_lock(PedalKind::Soft),
        PedalTransition::Down(PedalKind::Soft)
    );
    assert_eq!(pedals.controller_event(67, 0), None);
    assert!(pedals.is_down(PedalKind::Soft));

    assert_eq!(pedals.reset(), Vec::new());
    assert!(pedals.is_down(PedalKind::Soft));

    assert_eq!(
        pedals.toggle_lock(PedalKind::Soft),
        PedalTransition::Up(PedalKind::Soft)
    );
    assert!(!pedals.is_locked(PedalKind::Soft));
}

#[test]
fn restore_follows_interval_map() {
    let map: PedalIntervalMap = [
        PedalInterval::new(100, 500, PedalKind::Sustain),
        PedalInterval::new(200, 250, PedalKind::Soft),
    ]
    .into_iter()
    .collect();
    let mut pedals = PedalMachine::new();

    assert_eq!(
        pedals.restore_at(220, &map),
        vec![
            PedalTransition::Down(PedalKind::Sustain),
            PedalTransition::Down(PedalKind::Soft),
        ]
    );
    assert_eq!(
        pedals.restore_at(300, &map),
        vec![PedalTransition::Up(PedalKind::Soft)]
    );
    assert_eq!(
        pedals.restore_at(600, &map),
        vec![PedalTransition::Up(PedalKind::Sustain)]
    );
}
