use thiserror::Error;

#[derive(Error, Debug)]
#[error("error reading meter data: {0}")]
pub struct ReadingsError(pub String);
impl From<csv::Error> for ReadingsError {
    fn from(e: csv::Error) -> ReadingsError {
        ReadingsError(format!("csv document error: {}", e))
    }
}
impl From<std::io::Error> for ReadingsError {
    fn from(e: std::io::Error) -> ReadingsError {
        ReadingsError(format!("file error: {}", e))
    }
}
impl From<&str> for ReadingsError {
    fn from(e: &str) -> ReadingsError {
        ReadingsError(e.to_string())
    }
}
