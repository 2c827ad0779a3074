use clap::Parser;
use kicad_outputs::core::engine::BuildTarget;
use kicad_outputs::core::kicad::{self, KicadCli, KICAD_CLI};
use kicad_outputs::domain::model::{BuildOptions, RunSummary};
use kicad_outputs::utils::{logger, validation::Validate};
use kicad_outputs::{BuildArgs, OutputEngine, Result, SystemRunner, ToolConfig};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = BuildArgs::parse();

    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(args).await {
        tracing::error!("❌ Build failed: {}", e);
        eprintln!("\nERROR: {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }
}

async fn run(args: BuildArgs) -> Result<()> {
    args.validate()?;

    let config = ToolConfig::load_optional(&args.config)?;
    config.validate()?;

    let options = BuildOptions::from(&args);

    let kicad_path = match kicad::find_kicad_cli(config.kicad.cli_path.as_deref()) {
        Ok(path) => path,
        Err(e) if args.dry_run => {
            tracing::warn!("{}; showing commands with a plain `{}`", e, KICAD_CLI);
            PathBuf::from(KICAD_CLI)
        }
        Err(e) => return Err(e),
    };
    tracing::debug!("Using {}", kicad_path.display());

    let target = BuildTarget::resolve(&options)?;
    display_header(&target);

    let mut engine = OutputEngine::new(
        SystemRunner,
        KicadCli::new(&kicad_path),
        config.board_layers(),
    );

    if args.dry_run {
        if kicad::find_kicad_python(&kicad_path).is_err() {
            engine = engine.with_python("python");
        }
        perform_dry_run(&engine, &target, &options)?;
        return Ok(());
    }

    let summary = engine.run(&target, &options).await?;
    display_summary(&target, &summary);
    Ok(())
}

fn display_header(target: &BuildTarget) {
    println!("Project: {}", target.project.name);
    println!("SCH:     {}", target.project.schematic.display());
    println!("PCB:     {}", target.project.board.display());
    println!("Root:    {}", target.layout.root.display());
}

fn perform_dry_run(
    engine: &OutputEngine<SystemRunner>,
    target: &BuildTarget,
    options: &BuildOptions,
) -> Result<()> {
    let commands = engine.planned_commands(target, options)?;

    println!();
    println!("🔍 Dry run: {} commands would run", commands.len());
    for spec in &commands {
        println!("  >> {}", spec.display_line());
    }
    println!();
    println!("Production run:  {}", target.layout.production_dir.display());
    if options.no_timestamp {
        println!("  (folder is cleared before a real run)");
    }
    Ok(())
}

fn display_summary(target: &BuildTarget, summary: &RunSummary) {
    let layout = &target.layout;

    println!("\nAll done ✅");
    println!("- 3D models:       {}", layout.three_d_dir.display());
    println!("- Pictures:        {}", layout.pictures_dir.display());
    println!("- Documentation:   {}", layout.docs_dir.display());
    println!("- Production run:  {}", layout.production_dir.display());

    if let Some(zip) = &summary.gerbers_zip {
        println!("- Gerbers ZIP:     {}", zip.display());
    }
    if let Some(zip) = &summary.vendor_zip {
        println!("- Vendor ZIP:      {}", zip.display());
    }
}
