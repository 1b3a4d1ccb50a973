// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;
use crate::utils::log::header;

/// Load and validate a configuration file, reporting its key settings.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    header("Validating configuration");

    let checked = Config::load(config_path).and_then(|config| {
        config.validate()?;
        Ok(config)
    });

    match checked {
        Ok(config) => {
            log::info!("Configuration OK: {}", config_path.display());
            log::info!("    Root URL: {}", config.registry.root_url);
            log::info!("    Frame: {}", config.registry.frame_name);
            log::info!("    Wait timeout: {}s", config.registry.wait_timeout_secs);
            log::info!("    Request timeout: {}s", config.session.request_timeout_secs);
            log::info!("    Fields: {}", config.fields.len());
            Ok(config)
        }
        Err(e) => {
            log::error!("Configuration invalid: {}", e);
            Err(e)
        }
    }
}
