use clap::Parser;
use kicad_outputs::config::toml_config::DEFAULT_CONFIG_FILE;
use kicad_outputs::core::launcher::EXIT_FAILURE;
use kicad_outputs::utils::{logger, validation::Validate};
use kicad_outputs::{Launcher, LauncherArgs, SystemRunner, ToolConfig};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // --help exits with 0 here, before anything runs
    let args = LauncherArgs::parse();

    logger::init_cli_logger(false);
    tracing::debug!("Launcher args: {:?}", args);

    let config = match ToolConfig::load_optional(DEFAULT_CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", DEFAULT_CONFIG_FILE, e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(EXIT_FAILURE);
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let request = match args.into_request(&config, &cwd) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(EXIT_FAILURE);
        }
    };

    let launcher = Launcher::new(SystemRunner, &config);
    let exit_code = launcher.run(&request).await;
    std::process::exit(exit_code);
}
