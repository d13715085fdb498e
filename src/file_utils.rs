use anyhow::{Context, Result, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    ///
    /// The content goes to a temporary sibling first and is then persisted over
    /// the target, so a failed write never leaves a truncated file behind.
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut tmp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
        tmp.flush()
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
        tmp.persist(path)
            .map_err(|e| anyhow!("Failed to write to file {:?}: {}", path, e.error))?;

        Ok(())
    }

    /// Move a file, falling back to copy + remove across filesystems
    pub fn move_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        if fs::rename(from, to).is_ok() {
            return Ok(());
        }

        fs::copy(from, to)
            .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
        fs::remove_file(from)
            .with_context(|| format!("Failed to remove {:?} after copy", from))?;

        Ok(())
    }

    /// Files directly inside a directory, sorted by name
    pub fn list_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))? {
            let path = entry.context("Failed to read directory entry")?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Express `target` relative to the directory `base`
    ///
    /// Both paths are compared component-wise after dropping `.` segments;
    /// every base component left after the common prefix becomes a `..`.
    /// When one side is absolute and the other is not, both are resolved
    /// against the working directory first. Returns `target` as an absolute
    /// path when no relative form exists (`..` left in `base`, other drive).
    pub fn relative_to<P1: AsRef<Path>, P2: AsRef<Path>>(target: P1, base: P2) -> PathBuf {
        let strip_cur = |p: &Path| -> PathBuf {
            p.components().filter(|c| !matches!(c, Component::CurDir)).collect()
        };
        let mut target = strip_cur(target.as_ref());
        let mut base = strip_cur(base.as_ref());

        if target.is_absolute() != base.is_absolute() {
            target = std::path::absolute(&target).unwrap_or(target);
            base = std::path::absolute(&base).unwrap_or(base);
        }

        let target_parts: Vec<Component> = target.components().collect();
        let base_parts: Vec<Component> = base.components().collect();
        let common = target_parts
            .iter()
            .zip(&base_parts)
            .take_while(|(t, b)| t == b)
            .count();

        let leftover = &base_parts[common..];
        let starts_apart = common == 0 && (target.has_root() || base.has_root());
        if starts_apart || leftover.iter().any(|c| !matches!(c, Component::Normal(_))) {
            return std::path::absolute(&target).unwrap_or(target);
        }

        let mut relative = PathBuf::new();
        for _ in leftover {
            relative.push("..");
        }
        for part in &target_parts[common..] {
            relative.push(part.as_os_str());
        }
        relative
    }
}
