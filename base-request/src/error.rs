use std::{fmt::Display, io};

#[derive(Debug)]
pub enum Error {
    Transport(reqwest::Error),
    InvalidJson(serde_json::Error),
    MissingField(&'static str),
    RetriesExhausted {
        method: String,
        url: String,
        attempts: u32,
        last_status: u16,
    },
    InvalidConfiguration(String),
    LoggerAlreadyInitialized,
    IoError(io::Error),
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidJson(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IoError(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {}", e),
            Error::InvalidJson(e) => write!(f, "the response body is not valid JSON: {}", e),
            Error::MissingField(field) => {
                write!(f, "the response body has no \"{}\" field", field)
            }
            Error::RetriesExhausted {
                method,
                url,
                attempts,
                last_status,
            } => write!(
                f,
                "{} {} gave up after {} attempts, last status {}",
                method, url, attempts, last_status
            ),
            Error::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            Error::LoggerAlreadyInitialized => {
                write!(f, "the request logger has already been initialized")
            }
            Error::IoError(e) => write!(f, "IoError: {}", e),
        }
    }
}
