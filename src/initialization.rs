use std::env;
use log::info;
use crate::config::{load_config, Config};
use crate::errors::CfeBillInitError;
use crate::logging::setup_logger;

/// Environment variable holding the config file path when none is given on the command line
pub const CONFIG_ENV: &str = "CFEBILL_CONFIG";

/// Loads configuration and sets up logging
///
/// The config file path is taken from the first command line argument, or from the
/// CFEBILL_CONFIG environment variable if no argument is given.
pub fn init() -> Result<Config, CfeBillInitError> {
    let config_path = env::args().nth(1)
        .or_else(|| env::var(CONFIG_ENV).ok())
        .ok_or_else(|| CfeBillInitError(format!("usage: cfebill <config file> (or set {})", CONFIG_ENV)))?;

    let config = load_config(&config_path)?;
    setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;

    info!("cfebill version: {}", env!("CARGO_PKG_VERSION"));
    info!("configuration loaded from {}", config_path);

    Ok(config)
}
