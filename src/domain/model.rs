use std::ffi::OsString;
use std::path::PathBuf;

/// Flags the launcher forwards to the build step on every run.
pub const FIXED_BUILD_FLAGS: [&str; 3] = ["--no-timestamp", "--iso", "--zip"];

/// One launcher invocation: what to build and what to forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Project path without the `.kicad_pro` suffix.
    pub project_stem: String,
    /// `None` or an empty string means no vendor package.
    pub vendor: Option<String>,
    pub extra_args: Vec<String>,
}

impl LaunchRequest {
    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref().filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFiles {
    pub name: String,
    pub schematic: PathBuf,
    pub board: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub three_d_dir: PathBuf,
    pub pictures_dir: PathBuf,
    pub docs_dir: PathBuf,
    pub production_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub project: PathBuf,
    pub root: PathBuf,
    pub prod_dir: String,
    pub iso: bool,
    pub glb: bool,
    pub zip: bool,
    pub kikit: Option<String>,
    pub skip_drc: bool,
    pub no_timestamp: bool,
}

impl BuildOptions {
    pub fn new(project: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            root: PathBuf::from("."),
            prod_dir: "PRODUCTION".to_string(),
            iso: false,
            glb: false,
            zip: false,
            kikit: None,
            skip_drc: false,
            no_timestamp: false,
        }
    }
}

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
    pub ok_codes: Vec<i32>,
    /// Stream the child's output instead of capturing it.
    pub inherit_stdio: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            ok_codes: vec![0],
            inherit_stdio: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn ok_codes(mut self, codes: &[i32]) -> Self {
        self.ok_codes = codes.to_vec();
        self
    }

    pub fn inherit_stdio(mut self) -> Self {
        self.inherit_stdio = true;
        self
    }

    pub fn accepts(&self, code: Option<i32>) -> bool {
        code.is_some_and(|c| self.ok_codes.contains(&c))
    }

    /// `program arg1 arg2 ...`, as printed before each run.
    pub fn display_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn program_name(&self) -> String {
        PathBuf::from(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub project: String,
    pub step_file: Option<PathBuf>,
    pub glb_file: Option<PathBuf>,
    pub pictures: Vec<PathBuf>,
    pub schematic_pdf: Option<PathBuf>,
    pub erc_report: Option<PathBuf>,
    pub board_prints_pdf: Option<PathBuf>,
    pub drc_report: Option<PathBuf>,
    pub gerbers_dir: Option<PathBuf>,
    pub drill_dir: Option<PathBuf>,
    pub pos_csv: Option<PathBuf>,
    pub bom_csv: Option<PathBuf>,
    pub gerbers_zip: Option<PathBuf>,
    pub vendor_zip: Option<PathBuf>,
    pub readme: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_vendor_is_none() {
        let request = LaunchRequest {
            project_stem: "CAD/board/board".to_string(),
            vendor: Some(String::new()),
            extra_args: vec![],
        };
        assert_eq!(request.vendor(), None);
    }

    #[test]
    fn test_command_spec_accepts_codes() {
        let spec = CommandSpec::new("kicad-cli").ok_codes(&[0, 2]);
        assert!(spec.accepts(Some(0)));
        assert!(spec.accepts(Some(2)));
        assert!(!spec.accepts(Some(1)));
        assert!(!spec.accepts(None));
    }

    #[test]
    fn test_display_line() {
        let spec = CommandSpec::new("kicad-cli").args(["pcb", "render", "--side", "top"]);
        assert_eq!(spec.display_line(), "kicad-cli pcb render --side top");
    }
}
