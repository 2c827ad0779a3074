use crate::utils::error::{OutputsError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// Removes everything inside `path` but keeps the directory itself.
///
/// The resolved path must be at least two directories deep (e.g. `PRODUCTION/<project>`
/// under some root); anything shallower is rejected with [`OutputsError::ShallowPath`].
/// Entries that cannot be removed are logged and skipped.
pub fn clear_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = ensure_dir(path)?;
    let resolved = fs::canonicalize(&path)?;

    let depth = resolved
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    if depth < 2 {
        return Err(OutputsError::ShallowPath(path));
    }

    for entry in fs::read_dir(&resolved)? {
        let entry = entry?;
        let entry_path = entry.path();
        let file_type = entry.file_type()?;

        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&entry_path)
        } else {
            fs::remove_file(&entry_path)
        };

        if let Err(e) = removed {
            tracing::warn!("Couldn't remove {}: {}", entry_path.display(), e);
        }
    }

    Ok(())
}

pub fn timestamp_tag() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M").to_string()
}

/// Zips the contents of `src_dir` into `zip_path`, with entry names relative to `src_dir`.
pub fn zip_dir(src_dir: &Path, zip_path: &Path) -> Result<()> {
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(src_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src_dir)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let name = archive_name(relative);

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}

// Zip entries always use forward slashes, even on Windows.
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_clear_dir_keeps_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("PRODUCTION").join("board");
        fs::create_dir_all(target.join("gerbers")).unwrap();
        fs::write(target.join("gerbers").join("board-F_Cu.gbr"), "G04*").unwrap();
        fs::write(target.join("board_pos.csv"), "Ref,Val").unwrap();

        clear_dir(&target).unwrap();

        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
    }

    #[test]
    fn test_clear_dir_rejects_shallow_path() {
        let result = clear_dir("/");
        assert!(matches!(result, Err(OutputsError::ShallowPath(_))));
    }

    #[test]
    fn test_timestamp_tag_format() {
        let tag = timestamp_tag();
        assert_eq!(tag.len(), 13);
        assert_eq!(&tag[8..9], "_");
        assert!(tag.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_zip_dir_uses_relative_names() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("gerbers");
        fs::create_dir_all(src.join("inner")).unwrap();
        fs::write(src.join("board-Edge_Cuts.gbr"), "edge").unwrap();
        fs::write(src.join("inner").join("board-job.gbrjob"), "job").unwrap();

        let zip_path = temp_dir.path().join("board_gerbers.zip");
        zip_dir(&src, &zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"board-Edge_Cuts.gbr".to_string()));
        assert!(names.contains(&"inner/board-job.gbrjob".to_string()));

        let mut content = String::new();
        archive
            .by_name("inner/board-job.gbrjob")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "job");
    }
}
