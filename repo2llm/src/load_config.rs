/// `load_config` module: reads the optional YAML settings file into [`Settings`].
///
/// The file holds no secrets. Tokens stay in the environment and are read when the service
/// builds its providers.
///
/// # Errors
/// Read and parse failures are reported with `anyhow` and surface at the CLI boundary.
use anyhow::Result;
use repo2llm_core::config::Settings;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Load settings from a YAML file. Absent keys keep their defaults; an empty file is valid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    match serde_yaml::from_str::<Settings>(&config_content) {
        Ok(settings) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(settings)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
