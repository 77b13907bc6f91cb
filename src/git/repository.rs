use crate::error::Result;
use git2::Repository;
use std::path::{Path, PathBuf};

/// Open or discover a git repository and return the directory git commands
/// should run in.
///
/// For a bare repository this is the git directory itself.
pub fn discover_workdir<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let repo = Repository::discover(path)?;

    let dir = repo
        .workdir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| repo.path().to_path_buf());

    Ok(dir)
}
