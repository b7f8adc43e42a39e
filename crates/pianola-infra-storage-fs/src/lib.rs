use pianola_ports::storage::{SettingsDto, StorageError, StoragePort};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "Pianola";
const SETTINGS_FILE: &str = "settings.json";

/// Writes go to a sibling temp file and are renamed into place.
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        dirs_next::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| StorageError::Io("no platform config directory".to_string()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }

    fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(io_error)?;
        fs::rename(&tmp, path).map_err(io_error)
    }
}

fn io_error(err: std::io::Error) -> StorageError {
    StorageError::Io(err.to_string())
}

impl Default for FsStorage {
    fn default() -> Self {
        match Self::default_base_dir() {
            Ok(dir) => Self::new(dir),
            Err(err) => {
                log::warn!("{err}; keeping settings in the working directory");
                Self::new(".")
            }
        }
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        let path = self.settings_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", path.display());
                return Ok(SettingsDto::default());
            }
            Err(err) => return Err(io_error(err)),
        };
        serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(s).map_err(|e| StorageError::Serde(e.to_string()))?;
        let path = self.settings_path();
        Self::write_atomic(&path, &data)?;
        log::debug!("settings saved to {}", path.display());
        Ok(())
    }
}
