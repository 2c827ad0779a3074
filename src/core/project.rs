use crate::domain::model::ProjectFiles;
use crate::utils::error::{OutputsError, Result};
use std::path::{Path, PathBuf};

pub const PROJECT_EXTENSION: &str = "kicad_pro";
pub const SCHEMATIC_EXTENSION: &str = "kicad_sch";
pub const BOARD_EXTENSION: &str = "kicad_pcb";

/// Strips a `.kicad_pro` suffix (any case); other paths are taken as the stem already.
pub fn project_stem(project: &Path) -> PathBuf {
    let is_project_file = project
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_EXTENSION));

    if is_project_file {
        project.with_extension("")
    } else {
        project.to_path_buf()
    }
}

// `with_extension` would eat a dot inside a bare stem like `board-v1.2`
fn sibling_with_extension(stem: &Path, extension: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Resolves the schematic and board that belong to a project file or stem.
pub fn resolve_project(project: &Path) -> Result<ProjectFiles> {
    let stem = project_stem(project);
    let schematic = sibling_with_extension(&stem, SCHEMATIC_EXTENSION);
    let board = sibling_with_extension(&stem, BOARD_EXTENSION);

    if !schematic.exists() {
        return Err(OutputsError::SchematicNotFound(schematic));
    }
    if !board.exists() {
        return Err(OutputsError::BoardNotFound(board));
    }

    let name = stem
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| OutputsError::ConfigError {
            message: format!("Project path has no file name: {}", project.display()),
        })?;

    Ok(ProjectFiles {
        name,
        schematic,
        board,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_project(dir: &Path, name: &str) -> PathBuf {
        fs::write(dir.join(format!("{name}.kicad_pro")), "{}").unwrap();
        fs::write(dir.join(format!("{name}.kicad_sch")), "(kicad_sch)").unwrap();
        fs::write(dir.join(format!("{name}.kicad_pcb")), "(kicad_pcb)").unwrap();
        dir.join(name)
    }

    #[test]
    fn test_resolve_from_project_file() {
        let temp_dir = TempDir::new().unwrap();
        let stem = make_project(temp_dir.path(), "esp-motioncontroller");

        let files = resolve_project(&stem.with_extension("kicad_pro")).unwrap();
        assert_eq!(files.name, "esp-motioncontroller");
        assert_eq!(files.schematic, temp_dir.path().join("esp-motioncontroller.kicad_sch"));
        assert_eq!(files.board, temp_dir.path().join("esp-motioncontroller.kicad_pcb"));
    }

    #[test]
    fn test_resolve_from_stem_with_dots() {
        let temp_dir = TempDir::new().unwrap();
        let stem = make_project(temp_dir.path(), "board-v1.2");

        let files = resolve_project(&stem).unwrap();
        assert_eq!(files.name, "board-v1.2");
        assert_eq!(files.board, temp_dir.path().join("board-v1.2.kicad_pcb"));
    }

    #[test]
    fn test_uppercase_project_suffix() {
        assert_eq!(
            project_stem(Path::new("CAD/board/board.KICAD_PRO")),
            PathBuf::from("CAD/board/board")
        );
    }

    #[test]
    fn test_missing_board_reported() {
        let temp_dir = TempDir::new().unwrap();
        let stem = temp_dir.path().join("lonely");
        fs::write(temp_dir.path().join("lonely.kicad_sch"), "").unwrap();

        match resolve_project(&stem) {
            Err(OutputsError::BoardNotFound(path)) => {
                assert_eq!(path, temp_dir.path().join("lonely.kicad_pcb"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_schematic_reported_first() {
        let temp_dir = TempDir::new().unwrap();
        let result = resolve_project(&temp_dir.path().join("nothing"));
        assert!(matches!(result, Err(OutputsError::SchematicNotFound(_))));
    }
}
