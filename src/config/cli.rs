use crate::config::toml_config::ToolConfig;
use crate::core::launcher::resolve_request;
use crate::domain::model::{BuildOptions, LaunchRequest};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "generate-outputs")]
#[command(about = "Generate 3D models, renders, docs and fabrication files for a KiCad project")]
#[command(
    after_help = "Arguments after `--` are forwarded unchanged to the build step, e.g.\n  generate-outputs --vendor jlcpcb -- --glb --skip-drc"
)]
pub struct LauncherArgs {
    /// Project path without the .kicad_pro suffix
    #[arg(long, value_name = "STEM")]
    pub project: Option<String>,

    /// Fabrication vendor for the KiKit package (empty disables it)
    #[arg(long, value_name = "NAME")]
    pub vendor: Option<String>,

    /// Extra flags forwarded verbatim to the build step
    #[arg(last = true, value_name = "ARGS")]
    pub extra: Vec<String>,
}

impl LauncherArgs {
    pub fn into_request(self, config: &ToolConfig, cwd: &Path) -> Result<LaunchRequest> {
        if let Some(vendor) = &self.vendor {
            validation::validate_vendor("--vendor", vendor)?;
        }
        resolve_request(self.project, self.vendor, self.extra, config, cwd)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "build-outputs")]
#[command(about = "Standardize KiCad 9 outputs into the repository folder structure")]
pub struct BuildArgs {
    /// Path to the .kicad_pro (or base path) of the project
    #[arg(long)]
    pub project: PathBuf,

    /// Repo root containing 3D_MODEL, PICTURES, DOCUMENTATION, PRODUCTION
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Production folder relative to root
    #[arg(long, default_value = "PRODUCTION")]
    pub prod_dir: String,

    /// Also render an isometric image
    #[arg(long)]
    pub iso: bool,

    /// Also export a .glb 3D model
    #[arg(long)]
    pub glb: bool,

    /// Zip gerbers into <project>_gerbers.zip
    #[arg(long)]
    pub zip: bool,

    /// Vendor for KiKit 'fab' (e.g. jlcpcb)
    #[arg(long, value_name = "VENDOR")]
    pub kikit: Option<String>,

    /// Skip the DRC report
    #[arg(long)]
    pub skip_drc: bool,

    /// Write to <prod-dir>/<project> (cleared each run) instead of timestamped folders
    #[arg(long)]
    pub no_timestamp: bool,

    /// Configuration file
    #[arg(long, default_value = "outputs.toml")]
    pub config: PathBuf,

    /// Print the commands that would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Validate for BuildArgs {
    fn validate(&self) -> Result<()> {
        validation::validate_path("--project", &self.project.to_string_lossy())?;
        validation::validate_path("--prod-dir", &self.prod_dir)?;
        if let Some(vendor) = &self.kikit {
            validation::validate_vendor("--kikit", vendor)?;
        }
        Ok(())
    }
}

impl From<&BuildArgs> for BuildOptions {
    fn from(args: &BuildArgs) -> Self {
        Self {
            project: args.project.clone(),
            root: args.root.clone(),
            prod_dir: args.prod_dir.clone(),
            iso: args.iso,
            glb: args.glb,
            zip: args.zip,
            kikit: args.kikit.clone(),
            skip_drc: args.skip_drc,
            no_timestamp: args.no_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_passthrough_after_separator() {
        let args = LauncherArgs::try_parse_from([
            "generate-outputs",
            "--project",
            "CAD/board/board",
            "--vendor",
            "",
            "--",
            "--glb",
            "--prod-dir",
            "out",
        ])
        .unwrap();

        assert_eq!(args.project.as_deref(), Some("CAD/board/board"));
        assert_eq!(args.vendor.as_deref(), Some(""));
        assert_eq!(args.extra, vec!["--glb", "--prod-dir", "out"]);
    }

    #[test]
    fn test_launcher_help_is_not_an_error_kind() {
        let err = LauncherArgs::try_parse_from(["generate-outputs", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_build_args_defaults() {
        let args = BuildArgs::try_parse_from(["build-outputs", "--project", "b.kicad_pro"]).unwrap();
        let options = BuildOptions::from(&args);
        assert_eq!(options.root, PathBuf::from("."));
        assert_eq!(options.prod_dir, "PRODUCTION");
        assert!(!options.iso && !options.zip && !options.no_timestamp);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_build_args_accept_launcher_flags() {
        let args = BuildArgs::try_parse_from([
            "build-outputs",
            "--project",
            "CAD/b/b.kicad_pro",
            "--no-timestamp",
            "--iso",
            "--zip",
            "--kikit",
            "jlcpcb",
        ])
        .unwrap();
        assert!(args.no_timestamp && args.iso && args.zip);
        assert_eq!(args.kikit.as_deref(), Some("jlcpcb"));
    }

    #[test]
    fn test_build_args_require_project() {
        assert!(BuildArgs::try_parse_from(["build-outputs"]).is_err());
    }
}
