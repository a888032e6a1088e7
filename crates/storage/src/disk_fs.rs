//! Virtual filesystem mapped onto a directory on disk.

use async_trait::async_trait;
use novea_interfaces::{DirEntry, FileSystem, FsError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        if !path.starts_with('/') || path.contains('\0') {
            return Err(FsError::InvalidPath(path.to_string()));
        }

        let mut resolved = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." || segment == "." {
                return Err(FsError::InvalidPath(path.to_string()));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }
}

fn map_io(path: &str, err: std::io::Error) -> FsError {
    if err.kind() == ErrorKind::NotFound {
        FsError::NotFound(path.to_string())
    } else {
        FsError::Io(err)
    }
}

#[async_trait]
impl FileSystem for DiskFileSystem {
    /// Entries are sorted by name so listing order is stable across platforms.
    async fn list(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let dir_path = self.resolve(path)?;
        let mut dir = fs::read_dir(&dir_path)
            .await
            .map_err(|e| map_io(path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let file_type = entry.file_type().await?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_file: file_type.is_file(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_text(&self, path: &str) -> Result<String, FsError> {
        let file_path = self.resolve(path)?;
        fs::read_to_string(&file_path)
            .await
            .map_err(|e| map_io(path, e))
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), FsError> {
        let file_path = self.resolve(path)?;
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&file_path, content).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, FsError> {
        let file_path = self.resolve(path)?;
        Ok(fs::try_exists(&file_path).await?)
    }

    async fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let dir_path = self.resolve(path)?;
        fs::create_dir_all(&dir_path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_list() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fs = DiskFileSystem::new(temp_dir.path());

        fs.write("/usr/policies/repo/b.json", "{}").await.unwrap();
        fs.write("/usr/policies/repo/a.json", "[]").await.unwrap();
        fs.mkdir("/usr/policies/repo/nested").await.unwrap();

        assert_eq!(fs.read_text("/usr/policies/repo/a.json").await.unwrap(), "[]");

        let entries = fs.list("/usr/policies/repo").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.json", "nested"]);
        assert!(!entries[2].is_file);
    }

    #[tokio::test]
    async fn test_missing_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fs = DiskFileSystem::new(temp_dir.path());

        assert!(!fs.exists("/usr/init").await.unwrap());
        assert!(matches!(fs.list("/usr/init").await, Err(FsError::NotFound(_))));
        assert!(matches!(
            fs.read_text("/nope.txt").await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fs = DiskFileSystem::new(temp_dir.path());

        assert!(matches!(
            fs.read_text("/usr/../../etc/passwd").await,
            Err(FsError::InvalidPath(_))
        ));
        assert!(matches!(
            fs.write("relative.txt", "x").await,
            Err(FsError::InvalidPath(_))
        ));
    }
}
