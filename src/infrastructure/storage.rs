//! Object storage on the local filesystem, laid out as
//! `{root}/{bucket}/{path}` and served under `{public_base}/{bucket}/{path}`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::domain::errors::DomainError;
use crate::domain::ports::ObjectStorage;

#[derive(Debug, Clone)]
pub struct FsObjectStorage {
    root: PathBuf,
    public_base: String,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_owned(),
        }
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(bucket).join(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || bucket.is_empty() || path.is_empty() {
            return Err(DomainError::InvalidInput(format!("invalid object path '{bucket}/{path}'")));
        }
        Ok(self.root.join(relative))
    }
}

fn storage_error(e: std::io::Error) -> DomainError {
    DomainError::Backend(e.to_string())
}

impl ObjectStorage for FsObjectStorage {
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), DomainError> {
        let target = self.object_path(bucket, path)?;
        if target.exists() {
            return Err(DomainError::Backend(format!(
                "The resource already exists: {bucket}/{path}"
            )));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(storage_error)?;
        }
        fs::write(&target, bytes).map_err(storage_error)
    }

    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, DomainError> {
        let target = self.object_path(bucket, path)?;
        fs::read(&target).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DomainError::NotFound,
            _ => storage_error(e),
        })
    }

    /// Missing objects are skipped, as a bulk storage delete would.
    fn delete(&self, bucket: &str, paths: &[String]) -> Result<(), DomainError> {
        for path in paths {
            let target = self.object_path(bucket, path)?;
            match fs::remove_file(&target) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::debug!("object {bucket}/{path} already gone");
                }
                Err(e) => return Err(storage_error(e)),
            }
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", self.public_base, bucket, path)
    }

    fn path_for_url(&self, bucket: &str, url: &str) -> Option<String> {
        url.strip_prefix(&self.public_base)?
            .strip_prefix('/')?
            .strip_prefix(bucket)?
            .strip_prefix('/')
            .filter(|path| !path.is_empty())
            .map(str::to_owned)
    }
}
