//! Environment-file handling: the `CHAIN` variable selects `.env.<chain>`,
//! which supplies the remaining configuration of a deployment run.

use {
    anyhow::{Context, Result},
    std::path::{Path, PathBuf},
};

pub const DEFAULT_CHAIN: &str = "development";

/// Name of the environment file for the given chain id.
pub fn env_file(chain: &str) -> PathBuf {
    PathBuf::from(format!(".env.{chain}"))
}

/// Loads `.env.<chain>` into the process environment if the file exists,
/// returning the path that was loaded. Variables that are already set keep
/// their value.
pub fn load_env_file(chain: &str) -> Result<Option<PathBuf>> {
    let path = env_file(chain);
    if !path.exists() {
        return Ok(None);
    }
    apply(&path)?;
    Ok(Some(path))
}

fn apply(path: &Path) -> Result<()> {
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load environment file {}", path.display()))?;
    Ok(())
}
