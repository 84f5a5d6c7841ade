use std::env::current_exe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use directories_next::ProjectDirs;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use serde_json;
use fd_lock::{RwLock, RwLockWriteGuard};
use log::{debug, info, warn};
use std::fs::OpenOptions;
use std::str;

use crate::config::types::Config;
use crate::error::ConfigError;

// creates a path to squegg.json in the same directory as the executable
fn get_portable_config_path() -> Option<PathBuf> {
    match current_exe() {
        Ok(mut path) => {
            // /opt/squegg/squegg => /opt/squegg/squegg.json
            if !path.set_extension("json") {
                warn!("current exe has no filename: {}", path.to_string_lossy());
                return None
            }

            Some(path)
        },
        Err(err) => {
            warn!("failed to get current exe path: {:?}", err);
            None
        },
    }
}

// creates a path to squegg.json in an os dependent standard directory, such as ~/.config on linux
fn get_local_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "squegg").map(|dirs| {
        dirs.config_dir().join("squegg.json")
    })
}

fn get_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = get_portable_config_path() {
        match std::fs::metadata(&path) {
            Ok(attr) if attr.is_file() => return Ok(path),
            Ok(_) => {},
            Err(err) => {
                debug!("Could not read metadata of: {}; Using local path instead. ({:?})", path.to_string_lossy(), err);
            },
        }
    }

    get_local_config_path().ok_or(ConfigError::NoConfigPath)
}

pub struct ConfigIOLocker {
    rw_lock: RwLock<std::fs::File>,
}

impl ConfigIOLocker {
    pub fn lock(&mut self) -> Result<RwLockWriteGuard<std::fs::File>, ConfigError> {
        self.rw_lock.try_write().map_err(|source| ConfigError::CanNotLock { source })
    }
}

struct ConfigIOInner {
    file: std::fs::File,
}

#[derive(Clone)]
pub struct ConfigIO {
    inner: Arc<Mutex<ConfigIOInner>>,
}

impl ConfigIO {
    /// Opens (creating if needed) the config file at `path`, or at the default location.
    pub fn new_sync(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => get_config_path()?,
        };
        info!("Using config file {}", path.to_string_lossy());

        if let Some(directory) = path.parent().filter(|directory| !directory.as_os_str().is_empty()) {
            std::fs::create_dir_all(directory)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .truncate(false)
            .append(false)
            .create(true)
            .open(path)?;

        let inner = ConfigIOInner {
            file,
        };
        Ok(ConfigIO { inner: Arc::new(Mutex::new(inner)) })
    }

    // an exclusive file lock makes sure only one instance talks to the device at a time
    pub fn locker(&self) -> Result<ConfigIOLocker, ConfigError> {
        let file = self.get_std_file()?;

        Ok(ConfigIOLocker {
            rw_lock: RwLock::new(file),
        })
    }

    fn get_std_file(&self) -> Result<std::fs::File, ConfigError> {
        // a poisoned lock still guards a valid file handle
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(inner.file.try_clone()?)
    }

    // The File returned from here should never be closed!
    fn get_file(&self) -> Result<File, ConfigError> {
        Ok(File::from_std(self.get_std_file()?))
    }

    pub async fn read(&self) -> Result<Config, ConfigError> {
        let mut file = self.get_file()?;
        debug!("Reading config file");

        let mut content = vec![];
        file.rewind().await?;
        file.read_to_end(&mut content).await?;

        if content.iter().all(|byte| byte.is_ascii_whitespace()) {
            return Ok(Config::default());
        }

        let content = str::from_utf8(&content)?;
        Ok(serde_json::from_str(content)?)
    }

    pub async fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let mut file = self.get_file()?;
        info!("Saving config");

        let content = serde_json::to_string_pretty(config)?;
        file.rewind().await?;
        file.set_len(0).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("squegg-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn empty_file_reads_as_default() {
        let path = temp_path("empty");
        let _ = std::fs::remove_file(&path);

        let config_io = ConfigIO::new_sync(Some(&path)).unwrap();
        assert_eq!(config_io.read().await.unwrap(), Config::default());

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn saved_config_is_read_back() {
        let path = temp_path("saved");
        let _ = std::fs::remove_file(&path);

        let config_io = ConfigIO::new_sync(Some(&path)).unwrap();
        let config = Config { target_name: "Squegg_2".to_string(), connect_attempts: 3, ..Config::default() };
        config_io.save(&config).await.unwrap();

        assert_eq!(config_io.read().await.unwrap(), config);

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn malformed_file_is_a_json_error() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();

        let config_io = ConfigIO::new_sync(Some(&path)).unwrap();
        assert!(matches!(config_io.read().await, Err(ConfigError::JsonError { .. })));

        std::fs::remove_file(&path).unwrap();
    }
}
