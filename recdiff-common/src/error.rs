//! Error type shared by the library and the binary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading the config file or writing a report
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected command-line value, such as a report name with a path in it
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The HTTP client for an instance could not be built
    #[error("HTTP client for {instance}: {reason}")]
    HttpClient { instance: String, reason: String },

    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_missing() -> Result<String> {
        Ok(std::fs::read_to_string("/nonexistent/recdiff/config.toml")?)
    }

    fn parse_broken() -> Result<serde_json::Value> {
        Ok(serde_json::from_str("{")?)
    }

    #[test]
    fn test_question_mark_conversions() {
        assert!(matches!(read_missing(), Err(Error::Io(_))));
        assert!(matches!(parse_broken(), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_messages_name_the_cause() {
        let err = Error::HttpClient {
            instance: "Dev".to_string(),
            reason: "TLS backend unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP client for Dev: TLS backend unavailable");
        assert_eq!(
            Error::Config("tables[0] is empty".to_string()).to_string(),
            "Configuration error: tables[0] is empty"
        );
        assert_eq!(
            Error::InvalidInput("bad".to_string()).to_string(),
            "Invalid input: bad"
        );
    }
}
