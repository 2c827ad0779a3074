use crate::domain::model::{BuildOptions, OutputLayout};
use crate::utils::error::Result;
use crate::utils::fs::{clear_dir, ensure_dir, timestamp_tag};
use std::path::Path;

pub const THREE_D_DIR: &str = "3D_MODEL";
pub const PICTURES_DIR: &str = "PICTURES";
pub const DOCUMENTATION_DIR: &str = "DOCUMENTATION";

impl OutputLayout {
    /// Computes the folder layout without touching the filesystem.
    ///
    /// With `no_timestamp` the production run lives at `<prod_dir>/<project>` and is
    /// reused across runs; otherwise each run gets `<prod_dir>/<YYYYmmdd_HHMM>_<project>`.
    pub fn compute(root: &Path, prod_dir: &str, project: &str, no_timestamp: bool) -> Self {
        let run_name = if no_timestamp {
            project.to_string()
        } else {
            format!("{}_{}", timestamp_tag(), project)
        };

        Self {
            root: root.to_path_buf(),
            three_d_dir: root.join(THREE_D_DIR),
            pictures_dir: root.join(PICTURES_DIR),
            docs_dir: root.join(DOCUMENTATION_DIR),
            production_dir: root.join(prod_dir).join(run_name),
        }
    }

    pub fn for_options(options: &BuildOptions, project: &str) -> Result<Self> {
        let root = std::path::absolute(&options.root)?;
        Ok(Self::compute(&root, &options.prod_dir, project, options.no_timestamp))
    }

    /// Creates every output folder. A reused production folder is emptied first.
    pub fn prepare(&self, clear_production: bool) -> Result<()> {
        ensure_dir(&self.three_d_dir)?;
        ensure_dir(&self.pictures_dir)?;
        ensure_dir(&self.docs_dir)?;
        ensure_dir(&self.production_dir)?;

        if clear_production {
            tracing::debug!("Clearing {}", self.production_dir.display());
            clear_dir(&self.production_dir)?;
        }
        Ok(())
    }
}
