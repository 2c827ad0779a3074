use crate::core::kicad::{KicadCli, RenderView};
use crate::core::kikit;
use crate::domain::model::{CommandOutput, CommandSpec, OutputLayout, ProjectFiles};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{OutputsError, Result};
use crate::utils::fs::{clear_dir, ensure_dir, zip_dir};
use std::path::{Path, PathBuf};

/// Runs `spec` and fails unless the exit code is one it accepts.
/// Captured output is only surfaced when the command fails.
pub async fn run_checked(runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<CommandOutput> {
    tracing::info!(">> {}", spec.display_line());
    let output = runner.run(spec).await?;

    if !spec.accepts(output.code) {
        if !output.stdout.trim().is_empty() {
            tracing::error!("{}", output.stdout.trim_end());
        }
        if !output.stderr.trim().is_empty() {
            tracing::error!("{}", output.stderr.trim_end());
        }
        return Err(OutputsError::CommandFailed {
            program: spec.program_name(),
            code: output.code,
        });
    }

    if output.code != Some(0) {
        tracing::warn!(
            "{} exited with code {:?}, accepted",
            spec.program_name(),
            output.code
        );
    }
    Ok(output)
}

pub fn artifact_path(dir: &Path, project: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{project}{suffix}"))
}

#[derive(Debug, Clone)]
pub struct ThreeDOutputs {
    pub step: PathBuf,
    pub glb: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DocOutputs {
    pub schematic_pdf: PathBuf,
    pub erc_report: PathBuf,
    pub board_prints_pdf: PathBuf,
    pub drc_report: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct FabOutputs {
    pub gerbers_dir: PathBuf,
    pub drill_dir: PathBuf,
    pub pos_csv: PathBuf,
    pub bom_csv: PathBuf,
    pub gerbers_zip: Option<PathBuf>,
}

/// All `kicad-cli` and KiKit invocations for one project, in execution order.
pub struct ExportPlan<'a> {
    pub kicad: &'a KicadCli,
    pub project: &'a ProjectFiles,
    pub layout: &'a OutputLayout,
    pub board_layers: &'a [String],
}

impl ExportPlan<'_> {
    fn board_stem(&self) -> String {
        file_stem(&self.project.board)
    }

    fn schematic_stem(&self) -> String {
        file_stem(&self.project.schematic)
    }

    pub fn step_file(&self) -> PathBuf {
        artifact_path(&self.layout.three_d_dir, &self.board_stem(), ".step")
    }

    pub fn three_d_commands(&self, glb: bool) -> Vec<CommandSpec> {
        let board = &self.project.board;
        let mut commands = vec![self.kicad.export_step(board, &self.step_file())];
        if glb {
            let glb_out = artifact_path(&self.layout.three_d_dir, &self.board_stem(), ".glb");
            commands.push(self.kicad.export_glb(board, &glb_out));
        }
        commands
    }

    pub fn picture_paths(&self, iso: bool) -> Vec<(RenderView, PathBuf)> {
        let mut views = vec![RenderView::Top, RenderView::Bottom, RenderView::Side];
        if iso {
            views.push(RenderView::Iso);
        }
        views
            .into_iter()
            .map(|view| {
                let suffix = format!("_{}.png", view.suffix());
                (
                    view,
                    artifact_path(&self.layout.pictures_dir, &self.board_stem(), &suffix),
                )
            })
            .collect()
    }

    pub fn picture_commands(&self, iso: bool) -> Vec<CommandSpec> {
        self.picture_paths(iso)
            .iter()
            .map(|(view, out)| self.kicad.render(&self.project.board, out, *view))
            .collect()
    }

    pub fn doc_outputs(&self, include_drc: bool) -> DocOutputs {
        let docs = &self.layout.docs_dir;
        DocOutputs {
            schematic_pdf: artifact_path(docs, &self.schematic_stem(), "_schematic.pdf"),
            erc_report: artifact_path(docs, &self.schematic_stem(), "_erc.rpt"),
            board_prints_pdf: artifact_path(docs, &self.board_stem(), "_board_prints.pdf"),
            drc_report: include_drc.then(|| artifact_path(docs, &self.board_stem(), "_drc.rpt")),
        }
    }

    pub fn doc_commands(&self, include_drc: bool) -> Vec<CommandSpec> {
        let outputs = self.doc_outputs(include_drc);
        let (sch, pcb) = (&self.project.schematic, &self.project.board);
        let mut commands = vec![
            self.kicad.export_schematic_pdf(sch, &outputs.schematic_pdf),
            self.kicad.erc(sch, &outputs.erc_report),
            self.kicad
                .export_board_pdf(pcb, &outputs.board_prints_pdf, self.board_layers),
        ];
        if let Some(drc) = &outputs.drc_report {
            commands.push(self.kicad.drc(pcb, drc));
        }
        commands
    }

    pub fn fab_outputs(&self, zip: bool) -> FabOutputs {
        let root = &self.layout.production_dir;
        FabOutputs {
            gerbers_dir: root.join("gerbers"),
            drill_dir: root.join("drill"),
            pos_csv: artifact_path(root, &self.board_stem(), "_pos.csv"),
            bom_csv: artifact_path(root, &self.schematic_stem(), "_bom.csv"),
            gerbers_zip: zip.then(|| artifact_path(root, &self.board_stem(), "_gerbers.zip")),
        }
    }

    pub fn fab_commands(&self) -> Vec<CommandSpec> {
        let outputs = self.fab_outputs(false);
        let (sch, pcb) = (&self.project.schematic, &self.project.board);
        vec![
            self.kicad.export_gerbers(pcb, &outputs.gerbers_dir),
            self.kicad.export_drill(pcb, &outputs.drill_dir),
            self.kicad.export_pos(pcb, &outputs.pos_csv),
            self.kicad.export_bom(sch, &outputs.bom_csv),
        ]
    }

    pub fn kikit_command(&self, python: &Path, vendor: &str) -> CommandSpec {
        kikit::fab_command(
            python,
            vendor,
            &self.project.schematic,
            &self.project.board,
            &kikit::vendor_dir(&self.layout.production_dir, vendor),
        )
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn run_all(runner: &dyn CommandRunner, commands: &[CommandSpec]) -> Result<()> {
    for spec in commands {
        run_checked(runner, spec).await?;
    }
    Ok(())
}

/// STEP (and optionally GLB). Exit code 2 is tolerated as long as the STEP file exists.
pub async fn export_3d(
    runner: &dyn CommandRunner,
    plan: &ExportPlan<'_>,
    glb: bool,
) -> Result<ThreeDOutputs> {
    ensure_dir(&plan.layout.three_d_dir)?;
    let commands = plan.three_d_commands(glb);
    let step = plan.step_file();

    run_checked(runner, &commands[0]).await?;
    if !step.exists() {
        return Err(OutputsError::MissingArtifact {
            step: "STEP export".to_string(),
            path: step,
        });
    }

    let glb = match commands.get(1) {
        Some(spec) => {
            run_checked(runner, spec).await?;
            Some(artifact_path(&plan.layout.three_d_dir, &plan.board_stem(), ".glb"))
        }
        None => None,
    };

    Ok(ThreeDOutputs { step, glb })
}

pub async fn export_pictures(
    runner: &dyn CommandRunner,
    plan: &ExportPlan<'_>,
    iso: bool,
) -> Result<Vec<PathBuf>> {
    ensure_dir(&plan.layout.pictures_dir)?;
    run_all(runner, &plan.picture_commands(iso)).await?;
    Ok(plan.picture_paths(iso).into_iter().map(|(_, path)| path).collect())
}

pub async fn export_docs(
    runner: &dyn CommandRunner,
    plan: &ExportPlan<'_>,
    include_drc: bool,
) -> Result<DocOutputs> {
    ensure_dir(&plan.layout.docs_dir)?;
    run_all(runner, &plan.doc_commands(include_drc)).await?;
    Ok(plan.doc_outputs(include_drc))
}

/// Gerbers, drill, placement and BOM into the production run folder, plus an
/// optional ZIP of the gerbers that replaces any previous one.
pub async fn export_fab(
    runner: &dyn CommandRunner,
    plan: &ExportPlan<'_>,
    zip: bool,
) -> Result<FabOutputs> {
    let outputs = plan.fab_outputs(zip);
    ensure_dir(&plan.layout.production_dir)?;
    ensure_dir(&outputs.gerbers_dir)?;
    ensure_dir(&outputs.drill_dir)?;

    run_all(runner, &plan.fab_commands()).await?;

    if let Some(zip_path) = &outputs.gerbers_zip {
        if zip_path.exists() {
            if let Err(e) = std::fs::remove_file(zip_path) {
                tracing::warn!("Couldn't remove stale {}: {}", zip_path.display(), e);
            }
        }
        zip_dir(&outputs.gerbers_dir, zip_path)?;
        tracing::info!("Zipped gerbers into {}", zip_path.display());
    }

    Ok(outputs)
}

/// Vendor-ready package via `kikit fab`. The vendor folder is emptied before each run.
pub async fn run_kikit_fab(
    runner: &dyn CommandRunner,
    plan: &ExportPlan<'_>,
    python: &Path,
    vendor: &str,
) -> Result<PathBuf> {
    let vendor_root = ensure_dir(kikit::vendor_dir(&plan.layout.production_dir, vendor))?;
    clear_dir(&vendor_root)?;

    run_checked(runner, &plan.kikit_command(python, vendor)).await?;
    Ok(vendor_root.join("gerbers.zip"))
}
