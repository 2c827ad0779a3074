//! The `generate-outputs` launcher.
//!
//! Puts KiCad's bin directory in front of `PATH`, builds the fixed argument list for
//! the build step and runs it. The build step is opaque: only its exit status matters.

use crate::config::toml_config::ToolConfig;
use crate::core::kicad::{self, KICAD_CLI};
use crate::domain::model::{CommandSpec, LaunchRequest, FIXED_BUILD_FLAGS};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{OutputsError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const BUILD_STEP: &str = "build-outputs";
pub const CAD_DIR: &str = "CAD";

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// `CAD/<dir>/<dir>`, where `<dir>` is the name of the repository folder.
pub fn default_project_stem(cwd: &Path) -> Option<String> {
    let name = cwd.file_name()?.to_str()?;
    Some(format!("{CAD_DIR}/{name}/{name}"))
}

/// Command-line values win over `outputs.toml`; an explicit empty `--vendor` disables
/// a vendor set in the config.
pub fn resolve_request(
    project: Option<String>,
    vendor: Option<String>,
    extra_args: Vec<String>,
    config: &ToolConfig,
    cwd: &Path,
) -> Result<LaunchRequest> {
    let project_stem = project
        .or_else(|| config.launcher.project.clone())
        .or_else(|| default_project_stem(cwd))
        .ok_or_else(|| OutputsError::ConfigError {
            message: "No project given; pass --project or set launcher.project".to_string(),
        })?;

    Ok(LaunchRequest {
        project_stem,
        vendor: vendor.or_else(|| config.launcher.vendor.clone()),
        extra_args,
    })
}

pub fn build_arguments(request: &LaunchRequest) -> Vec<String> {
    let mut args = vec![
        "--project".to_string(),
        format!("{}.kicad_pro", request.project_stem),
    ];
    args.extend(FIXED_BUILD_FLAGS.iter().map(|flag| flag.to_string()));
    if let Some(vendor) = request.vendor() {
        args.push("--kikit".to_string());
        args.push(vendor.to_string());
    }
    args.extend(request.extra_args.iter().cloned());
    args
}

/// Prepends `bin_dir` to `current`. Without a bin dir, `current` is returned as is.
pub fn extend_search_path(bin_dir: Option<&Path>, current: Option<&OsStr>) -> Result<OsString> {
    let existing: Vec<PathBuf> = current
        .map(|value| std::env::split_paths(value).collect())
        .unwrap_or_default();

    let Some(bin_dir) = bin_dir else {
        return Ok(current.map(OsStr::to_os_string).unwrap_or_default());
    };

    std::env::join_paths(std::iter::once(bin_dir.to_path_buf()).chain(existing)).map_err(|e| {
        OutputsError::InvalidConfigValueError {
            field: "launcher.kicad_bin_dir".to_string(),
            value: bin_dir.display().to_string(),
            reason: e.to_string(),
        }
    })
}

pub fn locate_kicad_cli(search_path: &OsStr) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    which::which_in(KICAD_CLI, Some(search_path), cwd).ok()
}

/// The advisory printed when `kicad-cli` is not reachable through `search_path`.
pub fn missing_kicad_cli_warning(search_path: &OsStr) -> Option<&'static str> {
    match locate_kicad_cli(search_path) {
        Some(path) => {
            tracing::debug!("Found {}", path.display());
            None
        }
        None => Some("WARNING: kicad-cli not found. Check your KiCad installation path."),
    }
}

/// The `build-outputs` binary shipped next to this executable, else whatever `PATH` finds.
pub fn default_build_command() -> Vec<String> {
    let file_name = format!("{}{}", BUILD_STEP, std::env::consts::EXE_SUFFIX);
    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .filter(|path| path.is_file());

    match sibling {
        Some(path) => vec![path.to_string_lossy().into_owned()],
        None => vec![BUILD_STEP.to_string()],
    }
}

pub struct Launcher<R: CommandRunner> {
    runner: R,
    build_command: Vec<String>,
    kicad_bin_dir: Option<PathBuf>,
    base_path: Option<OsString>,
}

impl<R: CommandRunner> Launcher<R> {
    pub fn new(runner: R, config: &ToolConfig) -> Self {
        Self {
            runner,
            build_command: config
                .launcher
                .build_command
                .clone()
                .filter(|command| !command.is_empty())
                .unwrap_or_else(default_build_command),
            kicad_bin_dir: config
                .launcher
                .kicad_bin_dir
                .clone()
                .or_else(kicad::default_bin_dir),
            base_path: std::env::var_os("PATH"),
        }
    }

    pub fn with_build_command(mut self, command: Vec<String>) -> Self {
        self.build_command = command;
        self
    }

    pub fn with_kicad_bin_dir(mut self, bin_dir: Option<PathBuf>) -> Self {
        self.kicad_bin_dir = bin_dir;
        self
    }

    /// Replaces the inherited `PATH` the launcher extends.
    pub fn with_base_path(mut self, path: Option<OsString>) -> Self {
        self.base_path = path;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn search_path(&self) -> OsString {
        let current = self.base_path.as_deref();
        extend_search_path(self.kicad_bin_dir.as_deref(), current).unwrap_or_else(|e| {
            tracing::warn!("Could not extend PATH: {}", e);
            current.map(OsStr::to_os_string).unwrap_or_default()
        })
    }

    pub fn command_for(&self, request: &LaunchRequest, search_path: OsString) -> CommandSpec {
        let (program, leading) = match self.build_command.split_first() {
            Some((program, leading)) => (program.as_str(), leading),
            None => (BUILD_STEP, &[][..]),
        };

        CommandSpec::new(program)
            .args(leading)
            .args(build_arguments(request))
            .env("PATH", search_path)
            .inherit_stdio()
    }

    /// Runs the build step and maps its outcome to the launcher's exit code.
    pub async fn run(&self, request: &LaunchRequest) -> i32 {
        let search_path = self.search_path();
        if let Some(warning) = missing_kicad_cli_warning(&search_path) {
            eprintln!("{warning}");
        }

        println!("Generating outputs for {}...", request.project_stem);

        let spec = self.command_for(request, search_path);
        tracing::debug!("Running {}", spec.display_line());

        match self.runner.run(&spec).await {
            Ok(output) if output.code == Some(0) => {
                println!("Done.");
                EXIT_SUCCESS
            }
            Ok(output) => {
                let code = output
                    .code
                    .map_or_else(|| "signal".to_string(), |c| c.to_string());
                tracing::error!("Build step failed with exit code {}", code);
                eprintln!("ERROR: output generation failed (exit code {code})");
                EXIT_FAILURE
            }
            Err(e) => {
                tracing::error!("Build step could not run: {}", e);
                eprintln!("ERROR: {e}");
                eprintln!("💡 {}", e.recovery_suggestion());
                EXIT_FAILURE
            }
        }
    }
}
