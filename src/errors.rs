use thiserror::Error;

#[derive(Error, Debug)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(format!("file error: {}", e)) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(format!("toml document error: {}", e)) }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}

#[derive(Error, Debug)]
#[error("logging setup error: {0}")]
pub struct LoggingError(pub String);
impl From<std::io::Error> for LoggingError {
    fn from(e: std::io::Error) -> Self { LoggingError(format!("log file error: {}", e)) }
}
impl From<log4rs::config::runtime::ConfigErrors> for LoggingError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self { LoggingError(e.to_string()) }
}
impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self { LoggingError(e.to_string()) }
}

#[derive(Error, Debug)]
#[error("CfeBillInitError: {0}")]
pub struct CfeBillInitError(pub String);
impl From<ConfigError> for CfeBillInitError {
    fn from(e: ConfigError) -> Self { CfeBillInitError(e.to_string()) }
}
impl From<LoggingError> for CfeBillInitError {
    fn from(e: LoggingError) -> Self { CfeBillInitError(e.to_string()) }
}
