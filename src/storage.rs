use crate::errors::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Named string entries kept as one file each under a directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        match fs::read(self.entry_path(key)).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.entry_path(key), value).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn unique_temp_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("retro_site_{label}_{}_{}", std::process::id(), nanos));
    path
}
