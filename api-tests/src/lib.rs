//! Checks against the mock JSON API.
//!
//! The helpers below issue one request through [`BaseRequest`] and log what came
//! back. The checks themselves live in the per-entity test modules and run against
//! the stub server seeded with `fixtures/db.json`.

use base_request::{
    logging, ApiResponse, BaseRequest, BaseRequestBuilder, Error, MutationOutcome, Payload,
    SuiteConfiguration,
};
use serde_json::Value;
use std::fmt::Display;
use tracing::info;

#[cfg(test)]
mod comments;
#[cfg(test)]
mod design_course;
#[cfg(test)]
mod posts;
#[cfg(test)]
mod studio;
#[cfg(test)]
mod users;

/// A wrapper for `base_url` using the environment's configuration, with the
/// request log opened.
///
/// Creating an item answers `201 Created`, so both 200 and 201 end the retry loop.
pub fn suite_request<S: Into<String>>(base_url: S) -> Result<BaseRequest, Error> {
    let mut configuration = SuiteConfiguration::from_env()?;
    configuration.set_base_url(base_url);
    configuration.set_accepted_statuses(vec![200, 201]);

    logging::init_once(configuration.log_file())?;

    Ok(BaseRequestBuilder::from_configuration(&configuration).build())
}

/// Fetch one entity and log it.
pub fn get_entity<E: AsRef<str>, I: Display>(
    base_request: &BaseRequest,
    entity: E,
    id: I,
) -> Result<Value, Error> {
    let entity_info = base_request.get(entity, id, false)?;
    info!("{}", entity_info);

    Ok(entity_info)
}

/// Add an item to a collection with a JSON body and log the response.
pub fn post_entity<E: AsRef<str>>(
    base_request: &BaseRequest,
    entity: E,
    data: Value,
) -> Result<ApiResponse, Error> {
    let response = base_request.post_collection(entity, data)?;
    info!("{} {}", response.status_code, response.text);

    Ok(response)
}

pub fn put_entity<E: AsRef<str>, I: Display, P: Into<Payload>>(
    base_request: &BaseRequest,
    entity: E,
    id: I,
    data: P,
) -> Result<MutationOutcome, Error> {
    let outcome = base_request.put(entity, id, data)?;
    info!("{}", outcome);

    Ok(outcome)
}

pub fn delete_entity<E: AsRef<str>, I: Display>(
    base_request: &BaseRequest,
    entity: E,
    id: I,
) -> Result<MutationOutcome, Error> {
    let outcome = base_request.delete(entity, id)?;
    info!("{}", outcome);

    Ok(outcome)
}

/// Number of elements of an array body or keys of an object body.
pub fn json_len(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(fields) => fields.len(),
        Value::String(text) => text.chars().count(),
        _ => 0,
    }
}

/// Flush and close the request log at the end of a test. The next request opens it again.
pub fn close_suite_log() {
    if let Err(e) = logging::shutdown() {
        eprintln!("could not close the request log: {}", e);
    }
}

#[cfg(test)]
pub(crate) fn suite_stub(configuration: &mut stub_server::StubConfiguration) {
    configuration.add_teardown_hook(close_suite_log);
}

#[cfg(test)]
pub(crate) fn stub_request() -> BaseRequest {
    match suite_request(stub_server::StubServer::base_url()) {
        Ok(base_request) => base_request,
        Err(e) => panic!("could not set up the request wrapper: {}", e),
    }
}
