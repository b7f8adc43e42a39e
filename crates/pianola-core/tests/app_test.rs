mod common;

use common::{cc, note_on, MemoryStorage, RecordingInstrument};
use pianola_core::{
    command_queue, parse_command, AppCore, Command, Event, QueueError, TickSequencer,
    TransportState,
};
use pianola_ports::instrument::Envelope;
use pianola_ports::storage::SettingsDto;
use pianola_ports::types::{PedalKind, Volume01, VolumeRatio};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn app(storage: MemoryStorage) -> AppCore {
    AppCore::new(
        Box::new(TickSequencer::default()),
        Arc::new(RecordingInstrument::default()),
        Some(Box::new(storage)),
    )
}

#[test]
fn volume_commands_update_and_save_settings() {
    let storage = MemoryStorage::default();
    let mut app = app(storage.clone());

    app.handle_command(Command::SetMasterVolume {
        volume: VolumeRatio::new(1.5),
    })
    .expect("master");
    app.handle_command(Command::SetBassVolume {
        volume: Volume01::new(0.4),
    })
    .expect("bass");

    assert_eq!(app.settings().master_volume, VolumeRatio::new(1.5));
    assert_eq!(app.settings().bass_volume, Volume01::new(0.4));
    let saved = storage.saved.lock();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.last(), Some(app.settings()));
}

#[test]
fn settings_updates_are_reported() {
    let mut app = app(MemoryStorage::default());

    app.handle_command(Command::SetSliderTempo { bpm: 72.0 })
        .expect("tempo");

    let events = app.drain_events();
    assert!(matches!(
        events.first(),
        Some(Event::SettingsUpdated { settings }) if settings.slider_tempo == 72.0
    ));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::TempoUpdated { effective_tempo, .. } if *effective_tempo == 72.0
    )));
}

#[test]
fn stored_settings_seed_the_controller() {
    let envelope = Envelope {
        attack: 0.05,
        decay: 0.2,
        sustain: 0.6,
        release: 0.8,
    };
    let storage = MemoryStorage {
        initial: Some(SettingsDto {
            slider_tempo: 84.0,
            envelope,
            ..SettingsDto::default()
        }),
        ..MemoryStorage::default()
    };

    let app = app(storage);

    assert_eq!(app.controller().tempo_state().slider_tempo, 84.0);
    assert_eq!(app.controller().notes().envelope(), envelope);
}

#[test]
fn rejected_envelope_is_not_saved() {
    let storage = MemoryStorage::default();
    let mut app = app(storage.clone());

    let result = app.handle_command(Command::SetEnvelope {
        envelope: Envelope {
            attack: -0.1,
            ..Envelope::default()
        },
    });

    assert!(result.is_err());
    assert!(storage.saved.lock().is_empty());
    assert_eq!(app.settings().envelope, Envelope::default());
}

#[test]
fn queued_commands_run_on_pump() {
    let mut app = app(MemoryStorage::default());
    let (sender, mut receiver) = command_queue(8);
    let remote = sender.clone();

    std::thread::spawn(move || {
        remote
            .send(Command::LoadRoll {
                tracks: vec![vec![cc(64, 127, 0), note_on(60, 80, 10), note_on(60, 0, 5_000)]],
            })
            .expect("send");
    })
    .join()
    .expect("join");
    sender.send(Command::Play).expect("send");

    let errors = app.pump(&mut receiver);
    assert!(errors.is_empty());
    assert_eq!(app.controller().state(), TransportState::Playing);

    app.tick(Duration::from_millis(100)).expect("tick");
    assert!(app.controller().notes().is_sustained(60));
    assert!(app.controller().pedal_state(PedalKind::Sustain).down);
}

#[test]
fn full_queue_rejects_commands() {
    let (sender, mut receiver) = command_queue(1);

    sender.send(Command::Pause).expect("send");
    assert!(matches!(sender.send(Command::Stop), Err(QueueError::Full)));
    assert_eq!(receiver.drain().len(), 1);
    assert!(sender.send(Command::Stop).is_ok());
}

#[test]
fn json_commands_parse() {
    let seek = parse_command(r#"{"type":"Seek","payload":{"tick":300}}"#).expect("seek");
    assert!(matches!(seek, Command::Seek { tick: 300 }));

    let lock = parse_command(r#"{"type":"TogglePedalLock","payload":{"pedal":"Soft"}}"#)
        .expect("lock");
    assert!(matches!(
        lock,
        Command::TogglePedalLock {
            pedal: PedalKind::Soft
        }
    ));

    let sync = parse_command(r#"{"type":"SyncPosition","payload":{"tick":null}}"#)
        .expect("sync");
    assert!(matches!(sync, Command::SyncPosition { tick: None }));

    assert!(parse_command(r#"{"type":"Rewind"}"#).is_err());
}

#[test]
fn sync_command_with_bad_tick_uses_sequencer_position() {
    let mut app = app(MemoryStorage::default());
    app.handle_command(Command::LoadRoll {
        tracks: vec![vec![note_on(60, 80, 0), note_on(60, 0, 1_000)]],
    })
    .expect("load");
    app.handle_command(Command::Seek { tick: 400 }).expect("seek");

    app.handle_command(Command::SyncPosition {
        tick: Some(f64::INFINITY),
    })
    .expect("sync");

    assert_eq!(app.controller().position().tick, 400);
}
