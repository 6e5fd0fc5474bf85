use crate::{error::Error, retry::RetryPolicy};
use std::{env, path::PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_LOG_FILE: &str = "logs/logs_api.log";

const BASE_URL_ENV: &str = "API_SUITE_BASE_URL";
const RETRY_ENV: &str = "API_SUITE_RETRY";
const LOG_FILE_ENV: &str = "API_SUITE_LOG_FILE";
const ECHO_ENV: &str = "API_SUITE_ECHO";

/// Settings shared by every request issued from a test run.
#[derive(Debug, Clone)]
pub struct SuiteConfiguration {
    base_url: String,
    retry_policy: RetryPolicy,
    accepted_statuses: Vec<u16>,
    log_file: PathBuf,
    echo_responses: bool,
}

impl SuiteConfiguration {
    pub fn new() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            retry_policy: RetryPolicy::default(),
            accepted_statuses: vec![200],
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            echo_responses: true,
        }
    }

    /// Defaults overridden by `API_SUITE_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        let mut configuration = Self::new();

        if let Some(base_url) = read_env(BASE_URL_ENV) {
            configuration.set_base_url(base_url);
        }

        if let Some(retry) = read_env(RETRY_ENV) {
            let policy = RetryPolicy::parse(&retry).ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "{} should be \"unbounded\" or a positive number, got \"{}\"",
                    RETRY_ENV, retry
                ))
            })?;
            configuration.set_retry_policy(policy);
        }

        if let Some(log_file) = read_env(LOG_FILE_ENV) {
            configuration.set_log_file(log_file);
        }

        if let Some(echo) = read_env(ECHO_ENV) {
            configuration.set_echo_responses(!matches!(
                echo.to_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            ));
        }

        Ok(configuration)
    }

    pub fn set_base_url<S: Into<String>>(&mut self, base_url: S) {
        self.base_url = base_url.into();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_retry_policy(&mut self, retry_policy: RetryPolicy) {
        self.retry_policy = retry_policy;
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    pub fn set_accepted_statuses<I: IntoIterator<Item = u16>>(&mut self, statuses: I) {
        self.accepted_statuses = statuses.into_iter().collect();
    }

    pub fn accepted_statuses(&self) -> &[u16] {
        &self.accepted_statuses
    }

    pub fn set_log_file<P: Into<PathBuf>>(&mut self, log_file: P) {
        self.log_file = log_file.into();
    }

    pub fn log_file(&self) -> &PathBuf {
        &self.log_file
    }

    pub fn set_echo_responses(&mut self, value: bool) {
        self.echo_responses = value;
    }

    pub fn echo_responses(&self) -> bool {
        self.echo_responses
    }
}

impl Default for SuiteConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
