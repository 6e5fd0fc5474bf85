mod base_request;
mod configuration;
pub mod data;
mod error;
pub mod logging;
mod response;
mod retry;

pub use crate::base_request::{BaseRequest, BaseRequestBuilder};
pub use configuration::{SuiteConfiguration, DEFAULT_BASE_URL, DEFAULT_LOG_FILE};
pub use error::Error;
pub use reqwest::Method;
pub use response::{ApiResponse, Mutation, MutationOutcome, Payload};
pub use retry::RetryPolicy;
