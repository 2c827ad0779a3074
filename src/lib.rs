pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{BuildArgs, LauncherArgs};

pub use adapters::SystemRunner;
pub use config::ToolConfig;
pub use crate::core::{engine::OutputEngine, launcher::Launcher};
pub use utils::error::{OutputsError, Result};
