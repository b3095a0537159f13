//! Filesystem helpers shared by the staging, archive and quarantine steps.

use std::fs;
use std::io;
use std::path::Path;

/// Delete `dir` with its contents if present, then create it empty
pub fn recreate_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Move `source` into `dest_dir`, keeping its file name
///
/// Falls back to copy then remove when a rename cannot cross volumes. The
/// fallback is not atomic: a crash between the two steps leaves the file in
/// both places.
pub fn move_into(source: &Path, dest_dir: &Path) -> io::Result<()> {
    let file_name = source.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", source.display()),
        )
    })?;
    let dest = dest_dir.join(file_name);

    match fs::rename(source, &dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, &dest)?;
            fs::remove_file(source)
        }
        Err(e) => Err(e),
    }
}

/// Regular files directly inside `dir`, sorted by name
pub fn list_files(dir: &Path) -> io::Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
