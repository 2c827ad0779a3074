use crate::core::export::{self, ExportPlan};
use crate::core::kicad::{self, KicadCli};
use crate::core::project::resolve_project;
use crate::core::readme::render_readme_if_missing;
use crate::domain::model::{BuildOptions, CommandSpec, OutputLayout, ProjectFiles, RunSummary};
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use std::path::PathBuf;

/// The resolved project and where its outputs go.
#[derive(Debug, Clone)]
pub struct BuildTarget {
    pub project: ProjectFiles,
    pub layout: OutputLayout,
}

impl BuildTarget {
    pub fn resolve(options: &BuildOptions) -> Result<Self> {
        let project = resolve_project(&options.project)?;
        let layout = OutputLayout::for_options(options, &project.name)?;
        Ok(Self { project, layout })
    }
}

/// Runs the export steps in order: 3D, renders, docs, fab, KiKit, README.
/// The first failing step aborts the run.
pub struct OutputEngine<R: CommandRunner> {
    runner: R,
    kicad: KicadCli,
    board_layers: Vec<String>,
    python: Option<PathBuf>,
}

impl<R: CommandRunner> OutputEngine<R> {
    pub fn new(runner: R, kicad: KicadCli, board_layers: Vec<String>) -> Self {
        Self {
            runner,
            kicad,
            board_layers,
            python: None,
        }
    }

    /// Overrides the interpreter used for KiKit instead of searching for one.
    pub fn with_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = Some(python.into());
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn python(&self) -> Result<PathBuf> {
        match &self.python {
            Some(python) => Ok(python.clone()),
            None => kicad::find_kicad_python(self.kicad.path()),
        }
    }

    fn plan<'a>(&'a self, target: &'a BuildTarget) -> ExportPlan<'a> {
        ExportPlan {
            kicad: &self.kicad,
            project: &target.project,
            layout: &target.layout,
            board_layers: &self.board_layers,
        }
    }

    /// Every external command a run with `options` would execute, without running any.
    pub fn planned_commands(
        &self,
        target: &BuildTarget,
        options: &BuildOptions,
    ) -> Result<Vec<CommandSpec>> {
        let plan = self.plan(target);
        let mut commands = plan.three_d_commands(options.glb);
        commands.extend(plan.picture_commands(options.iso));
        commands.extend(plan.doc_commands(!options.skip_drc));
        commands.extend(plan.fab_commands());
        if let Some(vendor) = options.kikit.as_deref().filter(|v| !v.is_empty()) {
            commands.push(plan.kikit_command(&self.python()?, vendor));
        }
        Ok(commands)
    }

    pub async fn run(&self, target: &BuildTarget, options: &BuildOptions) -> Result<RunSummary> {
        let runner: &dyn CommandRunner = &self.runner;
        let plan = self.plan(target);

        target.layout.prepare(options.no_timestamp)?;

        tracing::info!("Exporting 3D model(s)");
        let three_d = export::export_3d(runner, &plan, options.glb).await?;

        tracing::info!("Rendering pictures");
        let pictures = export::export_pictures(runner, &plan, options.iso).await?;

        tracing::info!("Exporting documentation");
        let docs = export::export_docs(runner, &plan, !options.skip_drc).await?;

        tracing::info!("Exporting fabrication files");
        let fab = export::export_fab(runner, &plan, options.zip).await?;

        let vendor_zip = match options.kikit.as_deref().filter(|v| !v.is_empty()) {
            Some(vendor) => {
                tracing::info!("Running KiKit fab for vendor: {}", vendor);
                let zip = export::run_kikit_fab(runner, &plan, &self.python()?, vendor).await?;
                tracing::info!("KiKit vendor ZIP: {}", zip.display());
                Some(zip)
            }
            None => None,
        };

        let readme = render_readme_if_missing(&target.layout.root, &target.project.name)?;

        Ok(RunSummary {
            project: target.project.name.clone(),
            step_file: Some(three_d.step),
            glb_file: three_d.glb,
            pictures,
            schematic_pdf: Some(docs.schematic_pdf),
            erc_report: Some(docs.erc_report),
            board_prints_pdf: Some(docs.board_prints_pdf),
            drc_report: docs.drc_report,
            gerbers_dir: Some(fab.gerbers_dir),
            drill_dir: Some(fab.drill_dir),
            pos_csv: Some(fab.pos_csv),
            bom_csv: Some(fab.bom_csv),
            gerbers_zip: fab.gerbers_zip,
            vendor_zip,
            readme: Some(readme),
        })
    }
}
