use pianola_infra_storage_fs::FsStorage;
use pianola_ports::instrument::Envelope;
use pianola_ports::storage::{SettingsDto, StorageError, StoragePort};
use pianola_ports::types::{Volume01, VolumeRatio};
use pretty_assertions::assert_eq;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FsStorage::new(dir.path().join("nested"));

    let settings = storage.load_settings().expect("load");
    assert_eq!(settings, SettingsDto::default());
}

#[test]
fn saved_settings_are_loaded_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FsStorage::new(dir.path().join("nested"));
    let settings = SettingsDto {
        master_volume: VolumeRatio::new(1.5),
        bass_volume: Volume01::new(0.25),
        pan_boundary: 60,
        slider_tempo: 72.0,
        envelope: Envelope {
            attack: 0.02,
            decay: 0.2,
            sustain: 0.5,
            release: 1.0,
        },
        ..SettingsDto::default()
    };

    storage.save_settings(&settings).expect("save");
    assert!(storage.settings_path().exists());
    assert!(!storage.settings_path().with_extension("json.tmp").exists());
    assert_eq!(storage.load_settings().expect("load"), settings);
}

#[test]
fn partial_file_fills_missing_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FsStorage::new(dir.path());
    std::fs::write(storage.settings_path(), r#"{ "slider_tempo": 84.0 }"#).expect("write");

    let settings = storage.load_settings().expect("load");
    assert_eq!(settings.slider_tempo, 84.0);
    assert_eq!(settings.pan_boundary, 64);
    assert_eq!(settings.sync_interval_ms, 100);
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FsStorage::new(dir.path());
    std::fs::write(storage.settings_path(), "not json").expect("write");

    assert!(matches!(storage.load_settings(), Err(StorageError::Serde(_))));
}
