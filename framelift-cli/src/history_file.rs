use std::fs;
use std::io;
use std::path::PathBuf;

use framelift_core::{Clock, HistoryBackend};

/// One JSON file per storage key under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl HistoryBackend for JsonFileBackend {
    type Error = io::Error;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

/// Wall clock via `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoClock;

impl Clock for ChronoClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "framelift-history-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn missing_file_loads_as_none() {
        let backend = JsonFileBackend::new(temp_dir("missing"));
        assert!(backend.load("bypassGames").unwrap().is_none());
    }

    #[test]
    fn store_creates_directory_and_roundtrips() {
        let backend = JsonFileBackend::new(temp_dir("roundtrip"));
        backend.store("bypassGames", "[]").unwrap();
        assert_eq!(backend.load("bypassGames").unwrap().as_deref(), Some("[]"));
        assert!(backend.path_for("bypassGames").ends_with("bypassGames.json"));
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let backend = JsonFileBackend::new("/tmp/framelift");
        assert_eq!(
            backend.path_for("../etc/passwd"),
            PathBuf::from("/tmp/framelift/.._etc_passwd.json")
        );
    }
}
