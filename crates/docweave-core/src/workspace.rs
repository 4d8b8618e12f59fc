//! Scoped temporary working area for one document
//!
//! Media staged for a document (copied figures, rendered PNGs) lives in a
//! temporary directory until the document is written. The directory is
//! removed exactly once: by [`Workspace::close`], which reports errors, or
//! when the workspace is dropped.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use log::debug;
use tempfile::TempDir;

/// Temporary directory with a media subdirectory
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    media: PathBuf,
}

impl Workspace {
    /// Create a workspace whose media lives under `media_subdir`
    pub fn new(prefix: &str, media_subdir: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        let media = dir.path().join(media_subdir);
        fs::create_dir_all(&media)?;
        debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir, media })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn media_dir(&self) -> &Path {
        &self.media
    }

    /// Copy a file into the media area and return its staged file name
    ///
    /// A name already taken by another staged file gets a numeric suffix.
    pub fn stage_file(&self, src: &Path) -> io::Result<String> {
        let name = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", src.display()),
                )
            })?;
        let name = self.free_name(&name);
        fs::copy(src, self.media.join(&name))?;
        debug!("Staged {} as {}", src.display(), name);
        Ok(name)
    }

    /// Copy a file into the media area under a relative `name`
    ///
    /// `name` may contain subdirectories, which are created as needed. Names
    /// that are absolute or step out with `..` are rejected with
    /// `InvalidInput`.
    pub fn stage_as(&self, src: &Path, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let contained = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("media name leaves the media area: {name}"),
            ));
        }
        let dest = self.media.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, &dest)?;
        debug!("Staged {} as {}", src.display(), name);
        Ok(dest)
    }

    /// Write PNG bytes to a fresh `image*.png` file and return its name
    pub fn stage_png(&self, bytes: &[u8]) -> io::Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("image")
            .suffix(".png")
            .tempfile_in(&self.media)?;
        file.write_all(bytes)?;
        let (_, path) = file.keep()?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("Staged rendered image {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    fn free_name(&self, name: &str) -> String {
        if !self.media.join(name).exists() {
            return name.to_string();
        }
        let path = Path::new(name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (1..)
            .map(|n| format!("{stem}-{n}{ext}"))
            .find(|candidate| !self.media.join(candidate).exists())
            .unwrap_or_else(|| name.to_string())
    }

    /// Staged media files, including those in subdirectories, sorted by path
    pub fn media_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![self.media.clone()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Remove the working directory, reporting any error
    pub fn close(self) -> io::Result<()> {
        debug!("Removing workspace {}", self.dir.path().display());
        self.dir.close()
    }
}
