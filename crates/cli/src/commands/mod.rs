//! Command implementations.

mod emit;
mod info;
mod validate;

pub use emit::run_emit;
pub use info::run_info;
pub use validate::run_validate;

use std::path::Path;

use config_loader::{ConfigLoader, DispatchBlueprint};

use crate::error::{CliError, Result};

/// Load a blueprint, reporting a missing file before parsing
pub(crate) fn load_blueprint(path: &Path) -> Result<DispatchBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    Ok(ConfigLoader::load_from_path(path)?)
}
