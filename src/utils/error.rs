use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputsError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("TOML parsing error in {field}: {message}")]
    TomlParseError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("kicad-cli not found on PATH and not at the default KiCad 9 location")]
    KicadCliNotFound,

    #[error("Could not locate a Python interpreter to run KiKit")]
    PythonNotFound,

    #[error("Schematic not found: {}", .0.display())]
    SchematicNotFound(PathBuf),

    #[error("Board not found: {}", .0.display())]
    BoardNotFound(PathBuf),

    #[error("Refusing to clear very shallow path: {}", .0.display())]
    ShallowPath(PathBuf),

    #[error("Failed to start {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed with code {}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    CommandFailed { program: String, code: Option<i32> },

    #[error("{step} did not produce {}", .path.display())]
    MissingArtifact { step: String, path: PathBuf },
}

impl OutputsError {
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::KicadCliNotFound => {
                "Add KiCad's bin directory to PATH, set KICAD_CLI, or set kicad.cli_path in outputs.toml"
            }
            Self::PythonNotFound => "Install Python or use the Python bundled with KiCad to run KiKit",
            Self::SchematicNotFound(_) | Self::BoardNotFound(_) => {
                "Pass the .kicad_pro file (or its stem) that sits next to the .kicad_sch and .kicad_pcb"
            }
            Self::ShallowPath(_) => "Point --root/--prod-dir at a project folder, not a drive root",
            Self::SpawnFailed { .. } => "Check that the program exists and is executable",
            Self::CommandFailed { .. } => "Review the command output above; rerun with --verbose for details",
            Self::MissingArtifact { .. } => {
                "Check KiCad's 3D model paths (Preferences > Configure Paths, e.g. KICAD9_3DMODEL_DIR)"
            }
            Self::ConfigError { .. }
            | Self::TomlParseError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix outputs.toml or the command-line flags",
            Self::ZipError(_) | Self::IoError(_) => "Check file permissions and free disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_reports_exit_code() {
        let err = OutputsError::CommandFailed {
            program: "kicad-cli".to_string(),
            code: Some(3),
        };
        assert_eq!(err.to_string(), "kicad-cli failed with code 3");

        let killed = OutputsError::CommandFailed {
            program: "kicad-cli".to_string(),
            code: None,
        };
        assert_eq!(killed.to_string(), "kicad-cli failed with code signal");
    }
}
