//! Configuration for the solver team.
//!
//! A single explicit configuration struct, loaded once from YAML at process
//! start and passed by reference to every component. Complexity presets from
//! the problem selector overlay the turn ceiling and sandbox time budget.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;

use crate::errors::KataError;
use std::path::Path;

/// Load a configuration from a YAML file.
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<KataConfig, KataError> {
    ConfigLoader::from_file(path).await
}
