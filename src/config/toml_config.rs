use crate::utils::error::{OutputsError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_CONFIG_FILE: &str = "outputs.toml";

pub const DEFAULT_BOARD_LAYERS: [&str; 10] = [
    "F.Cu",
    "B.Cu",
    "F.SilkS",
    "B.SilkS",
    "F.Mask",
    "B.Mask",
    "Edge.Cuts",
    "F.Fab",
    "B.Fab",
    "User.Drawings",
];

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub launcher: LauncherSection,
    pub kicad: KicadSection,
    pub docs: DocsSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSection {
    /// Project stem used when `--project` is not given.
    pub project: Option<String>,
    pub vendor: Option<String>,
    /// Directory prepended to PATH so `kicad-cli` resolves.
    pub kicad_bin_dir: Option<PathBuf>,
    /// Program plus leading arguments, e.g. `["python", "build_outputs.py"]`.
    pub build_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KicadSection {
    pub cli_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsSection {
    pub board_layers: Option<Vec<String>>,
}

impl ToolConfig {
    /// Loads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OutputsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| OutputsError::TomlParseError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures<'_>| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn board_layers(&self) -> Vec<String> {
        match &self.docs.board_layers {
            Some(layers) if !layers.is_empty() => layers.clone(),
            _ => DEFAULT_BOARD_LAYERS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl Validate for ToolConfig {
    fn validate(&self) -> Result<()> {
        if let Some(project) = &self.launcher.project {
            validation::validate_path("launcher.project", project)?;
        }
        if let Some(vendor) = &self.launcher.vendor {
            validation::validate_vendor("launcher.vendor", vendor)?;
        }
        if let Some(command) = &self.launcher.build_command {
            match command.first() {
                Some(program) => {
                    validation::validate_non_empty_string("launcher.build_command", program)?
                }
                None => {
                    return Err(OutputsError::InvalidConfigValueError {
                        field: "launcher.build_command".to_string(),
                        value: "[]".to_string(),
                        reason: "Build command needs at least a program".to_string(),
                    })
                }
            }
        }
        if let Some(layers) = &self.docs.board_layers {
            for layer in layers {
                validation::validate_non_empty_string("docs.board_layers", layer)?;
            }
        }
        Ok(())
    }
}
