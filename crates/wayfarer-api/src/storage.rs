use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// URL path the profile-pictures bucket is served under.
pub const AVATAR_PUBLIC_PATH: &str = "/storage/profile-pictures";

/// Filesystem-backed object bucket for avatars.
///
/// Every object is a flat file at `{dir}/{name}` and is publicly readable at
/// `{public_base_url}/storage/profile-pictures/{name}`.
pub struct AvatarStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl AvatarStorage {
    pub async fn new(dir: PathBuf, public_base_url: &str) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Avatar storage directory: {}", dir.display());
        Ok(Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_url(&self, name: &str) -> String {
        format!("{}{}/{}", self.public_base_url, AVATAR_PUBLIC_PATH, name)
    }

    /// Write (or overwrite) an object.
    pub async fn put(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.object_path(name)?;
        fs::write(&path, data).await?;
        info!("Stored avatar {} ({} bytes)", name, data.len());
        Ok(())
    }

    /// Delete an object. A missing object is not an error.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let path = self.object_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted avatar {}", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Avatar {} already gone", name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(test)]
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.object_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn object_path(&self, name: &str) -> Result<PathBuf> {
        if !is_safe_object_name(name) {
            bail!("Refusing unsafe object name {:?}", name);
        }
        Ok(self.dir.join(name))
    }
}

/// Object name referenced by a stored avatar URL: the last path segment with
/// any query string removed. Names that could escape the bucket are ignored.
pub fn object_name_from_url(url: &str) -> Option<&str> {
    let last = url.rsplit('/').next()?;
    let name = last.split('?').next()?;
    is_safe_object_name(name).then_some(name)
}

fn is_safe_object_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
