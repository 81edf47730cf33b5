use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uploader_logging::uploader_debug;

/// A file picked for upload or validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    /// `/`-separated path starting with the picked directory's own name.
    /// For a single chosen file this is just the file name.
    pub relative_path: String,
    pub size: u64,
    /// Declared content type; `None` when nothing could be declared.
    pub content_type: Option<String>,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("file name is not valid UTF-8: {}", .0.display())]
    NonUtf8Name(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> SelectionError + '_ {
    move |source| SelectionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Content type a browser would declare for `name`, guessed from its extension.
pub fn guess_content_type(name: &str) -> Option<String> {
    mime_guess::from_path(name).first_raw().map(str::to_string)
}

/// Choose a single file. Without an explicit `declared_type` the type is
/// guessed from the file name.
pub fn select_file(path: &Path, declared_type: Option<String>) -> Result<SelectedFile, SelectionError> {
    let meta = fs::metadata(path).map_err(io_error(path))?;
    if !meta.is_file() {
        return Err(SelectionError::NotAFile(path.to_path_buf()));
    }
    let name = file_name(path)?;
    let content_type = declared_type.or_else(|| guess_content_type(&name));
    Ok(SelectedFile {
        path: path.to_path_buf(),
        relative_path: name.clone(),
        name,
        size: meta.len(),
        content_type,
    })
}

/// Pick every regular file under `root`, recursively, sorted by relative path.
///
/// Symbolic links are not followed.
pub fn select_directory(root: &Path) -> Result<Vec<SelectedFile>, SelectionError> {
    let root = root.canonicalize().map_err(io_error(root))?;
    if !root.is_dir() {
        return Err(SelectionError::NotADirectory(root));
    }
    let root_name = file_name(&root)?;

    let mut paths = Vec::new();
    collect_file_paths(&root, &mut paths)?;
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let meta = fs::metadata(&path).map_err(io_error(&path))?;
        let name = file_name(&path)?;
        let relative_path = relative_path(&root_name, &root, &path)?;
        files.push(SelectedFile {
            content_type: guess_content_type(&name),
            path,
            name,
            relative_path,
            size: meta.len(),
        });
    }
    uploader_debug!("Selected {} files under {:?}", files.len(), root);
    Ok(files)
}

fn collect_file_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SelectionError> {
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error(&path))?;
        if file_type.is_dir() {
            collect_file_paths(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> Result<String, SelectionError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| SelectionError::NonUtf8Name(path.to_path_buf()))
}

fn relative_path(root_name: &str, root: &Path, path: &Path) -> Result<String, SelectionError> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| SelectionError::NotAFile(path.to_path_buf()))?;
    let mut parts = vec![root_name.to_string()];
    for component in rel.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| SelectionError::NonUtf8Name(path.to_path_buf()))?;
        parts.push(part.to_string());
    }
    Ok(parts.join("/"))
}
