//! Locating `kicad-cli` and building its command lines.
//!
//! Every export the pipeline performs is a `kicad-cli` subcommand; this module
//! only knows the argument shapes, not when or in which order they run.

use crate::domain::model::CommandSpec;
use crate::utils::error::{OutputsError, Result};
use std::path::{Path, PathBuf};

pub const KICAD_CLI: &str = "kicad-cli";
pub const KICAD_CLI_ENV: &str = "KICAD_CLI";

pub const BOM_FIELDS: &str = "Reference,Value,Footprint,${QUANTITY},Manufacturer,MPN,Datasheet,${DNP}";
pub const BOM_LABELS: &str = "Refs,Value,Footprint,Qty,Manufacturer,MPN,Datasheet,DNP";
pub const BOM_GROUP_BY: &str = "Value,Footprint,MPN";

/// Where the KiCad 9 installer puts its binaries on this platform.
pub fn default_bin_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        Some(PathBuf::from(r"C:\Program Files\KiCad\9.0\bin"))
    } else if cfg!(target_os = "macos") {
        Some(PathBuf::from("/Applications/KiCad/KiCad.app/Contents/MacOS"))
    } else {
        None
    }
}

fn executable_name(name: &str) -> String {
    format!("{}{}", name, std::env::consts::EXE_SUFFIX)
}

/// Finds `kicad-cli`: configured path, then `KICAD_CLI`, then `PATH`, then the
/// default install location.
pub fn find_kicad_cli(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!("Configured kicad-cli {} does not exist, searching", path.display());
    }

    if let Some(path) = std::env::var_os(KICAD_CLI_ENV).map(PathBuf::from) {
        if path.is_file() {
            return Ok(path);
        }
        tracing::warn!("{} points at {}, which does not exist", KICAD_CLI_ENV, path.display());
    }

    if let Ok(path) = which::which(KICAD_CLI) {
        return Ok(path);
    }

    default_bin_dir()
        .map(|dir| dir.join(executable_name(KICAD_CLI)))
        .filter(|path| path.is_file())
        .ok_or(OutputsError::KicadCliNotFound)
}

/// KiKit runs as a Python module; prefer the interpreter shipped next to `kicad-cli`.
pub fn find_kicad_python(kicad_cli: &Path) -> Result<PathBuf> {
    for name in ["python.exe", "python"] {
        let candidate = kicad_cli.with_file_name(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    ["python", "python3"]
        .into_iter()
        .find_map(|name| which::which(name).ok())
        .ok_or(OutputsError::PythonNotFound)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderView {
    Top,
    Bottom,
    Side,
    Iso,
}

impl RenderView {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Side => "side",
            Self::Iso => "iso",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KicadCli {
    path: PathBuf,
}

impl KicadCli {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString>,
    {
        CommandSpec::new(&self.path).args(args)
    }

    /// Missing 3D models make KiCad exit with 2 while still writing the file.
    pub fn export_step(&self, board: &Path, out: &Path) -> CommandSpec {
        self.command(["pcb", "export", "step", "--subst-models", "-o"])
            .arg(out)
            .arg(board)
            .ok_codes(&[0, 2])
    }

    pub fn export_glb(&self, board: &Path, out: &Path) -> CommandSpec {
        self.command(["pcb", "export", "glb", "--subst-models", "-o"])
            .arg(out)
            .arg(board)
            .ok_codes(&[0, 2])
    }

    pub fn render(&self, board: &Path, out: &Path, view: RenderView) -> CommandSpec {
        let spec = self.command(["pcb", "render", "-o"]).arg(out);
        let spec = match view {
            RenderView::Top => spec.args(["--side", "top"]),
            RenderView::Bottom => spec.args(["--side", "bottom"]),
            // orthographic view from the left edge
            RenderView::Side => spec.args(["--side", "left"]),
            RenderView::Iso => spec,
        };
        let spec = spec.args(["--background", "transparent"]);
        let spec = if view == RenderView::Iso {
            spec.args(["--perspective", "--rotate", "-45,0,45", "--zoom", "1"])
        } else {
            spec
        };
        spec.arg(board)
    }

    pub fn export_schematic_pdf(&self, schematic: &Path, out: &Path) -> CommandSpec {
        self.command(["sch", "export", "pdf", "-o"]).arg(out).arg(schematic)
    }

    pub fn erc(&self, schematic: &Path, out: &Path) -> CommandSpec {
        self.command(["sch", "erc", "-o"]).arg(out).arg(schematic)
    }

    pub fn export_board_pdf(&self, board: &Path, out: &Path, layers: &[String]) -> CommandSpec {
        self.command(["pcb", "export", "pdf", "-o"])
            .arg(out)
            .args(["--layers".to_string(), layers.join(",")])
            .arg("--mode-multipage")
            .arg(board)
    }

    pub fn drc(&self, board: &Path, out: &Path) -> CommandSpec {
        self.command(["pcb", "drc", "-o"])
            .arg(out)
            .args(["--format", "report"])
            .arg(board)
    }

    /// Uses the plot parameters saved in the board so the output matches the GUI.
    pub fn export_gerbers(&self, board: &Path, out_dir: &Path) -> CommandSpec {
        self.command(["pcb", "export", "gerbers", "-o"])
            .arg(out_dir)
            .arg("--board-plot-params")
            .arg(board)
    }

    pub fn export_drill(&self, board: &Path, out_dir: &Path) -> CommandSpec {
        self.command(["pcb", "export", "drill", "-o"])
            .arg(out_dir)
            .args(["--format", "excellon", "--generate-map"])
            .arg(board)
    }

    pub fn export_pos(&self, board: &Path, out: &Path) -> CommandSpec {
        self.command(["pcb", "export", "pos", "-o"])
            .arg(out)
            .args(["--format", "csv", "--units", "mm", "--side", "both"])
            .arg(board)
    }

    pub fn export_bom(&self, schematic: &Path, out: &Path) -> CommandSpec {
        self.command(["sch", "export", "bom", "-o"])
            .arg(out)
            .args([
                "--fields",
                BOM_FIELDS,
                "--labels",
                BOM_LABELS,
                "--group-by",
                BOM_GROUP_BY,
            ])
            .arg(schematic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(spec: &CommandSpec) -> Vec<String> {
        spec.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_step_export_accepts_missing_models() {
        let kicad = KicadCli::new("kicad-cli");
        let spec = kicad.export_step(Path::new("b.kicad_pcb"), Path::new("3D_MODEL/b.step"));
        assert_eq!(
            args_of(&spec),
            vec!["pcb", "export", "step", "--subst-models", "-o", "3D_MODEL/b.step", "b.kicad_pcb"]
        );
        assert!(spec.accepts(Some(2)));
        assert!(!spec.accepts(Some(1)));
    }

    #[test]
    fn test_render_views() {
        let kicad = KicadCli::new("kicad-cli");
        let board = Path::new("b.kicad_pcb");

        let side = kicad.render(board, Path::new("b_side.png"), RenderView::Side);
        assert_eq!(
            args_of(&side),
            vec!["pcb", "render", "-o", "b_side.png", "--side", "left", "--background", "transparent", "b.kicad_pcb"]
        );

        let iso = kicad.render(board, Path::new("b_iso.png"), RenderView::Iso);
        let iso_args = args_of(&iso);
        assert!(!iso_args.contains(&"--side".to_string()));
        assert!(iso_args.windows(2).any(|w| w == ["--rotate", "-45,0,45"]));
        assert!(iso_args.contains(&"--perspective".to_string()));
        assert_eq!(iso_args.last().map(String::as_str), Some("b.kicad_pcb"));
        assert!(!iso.accepts(Some(2)));
    }

    #[test]
    fn test_board_pdf_joins_layers() {
        let kicad = KicadCli::new("kicad-cli");
        let layers = vec!["F.Cu".to_string(), "Edge.Cuts".to_string()];
        let spec = kicad.export_board_pdf(Path::new("b.kicad_pcb"), Path::new("b.pdf"), &layers);
        let args = args_of(&spec);
        assert!(args.windows(2).any(|w| w == ["--layers", "F.Cu,Edge.Cuts"]));
        assert!(args.contains(&"--mode-multipage".to_string()));
    }

    #[test]
    fn test_bom_fields_are_passed_literally() {
        let kicad = KicadCli::new("kicad-cli");
        let spec = kicad.export_bom(Path::new("b.kicad_sch"), Path::new("b_bom.csv"));
        let args = args_of(&spec);
        assert!(args.contains(&BOM_FIELDS.to_string()));
        assert!(args.windows(2).any(|w| w == ["--group-by", "Value,Footprint,MPN"]));
    }

    #[test]
    fn test_configured_cli_path_wins() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cli = temp_dir.path().join("kicad-cli");
        std::fs::write(&cli, "").unwrap();
        assert_eq!(find_kicad_cli(Some(&cli)).unwrap(), cli);
    }

    #[test]
    fn test_python_next_to_kicad_cli() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cli = temp_dir.path().join("kicad-cli");
        let python = temp_dir.path().join("python");
        std::fs::write(&cli, "").unwrap();
        std::fs::write(&python, "").unwrap();
        assert_eq!(find_kicad_python(&cli).unwrap(), python);
    }
}
