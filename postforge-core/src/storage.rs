//! Storage collaborator - local reads for backgrounds, durable artifact writes.

use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Byte storage the renderer reads backgrounds from and writes artifacts to.
///
/// Paths are forward-slash relative references. `read` resolves against the
/// asset root, `write` against the output root.
pub trait Storage: Send + Sync {
    fn read(&self, relative: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    fn write(&self, relative: &str, bytes: Vec<u8>) -> impl Future<Output = io::Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    asset_root: PathBuf,
    output_root: PathBuf,
}

impl LocalStorage {
    pub fn new(asset_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            output_root: output_root.into(),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

impl Storage for LocalStorage {
    async fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
        let path = confine(&self.asset_root, relative)?;
        tokio::fs::read(path).await
    }

    async fn write(&self, relative: &str, bytes: Vec<u8>) -> io::Result<()> {
        let path = confine(&self.output_root, relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Written beside the target and renamed in, so readers never see a torn file.
        let mut staging = path.clone().into_os_string();
        staging.push(".part");
        let staging = PathBuf::from(staging);

        if let Err(e) = tokio::fs::write(&staging, &bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        Ok(())
    }
}

/// Join a root-relative reference onto `root`, refusing anything that could
/// step outside it.
pub fn confine(root: &Path, relative: &str) -> io::Result<PathBuf> {
    let trimmed = relative.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }

    let mut path = root.to_path_buf();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path escapes root: {relative}"),
                ));
            }
        }
    }
    Ok(path)
}
