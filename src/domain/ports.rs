use crate::domain::model::{CommandOutput, CommandSpec};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Runs external programs. The system implementation spawns real processes;
/// tests substitute recorders that fake KiCad's outputs.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `spec` to completion. A non-zero exit is not an error at this level;
    /// only failing to start the program is.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}
