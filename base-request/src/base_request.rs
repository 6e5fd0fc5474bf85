use crate::configuration::{SuiteConfiguration, DEFAULT_BASE_URL};
use crate::error::Error;
use crate::response::{ApiResponse, Mutation, MutationOutcome, Payload};
use crate::retry::RetryPolicy;
use reqwest::Method;
use serde_json::Value;
use std::{fmt::Display, thread};
use tracing::{debug, info, warn};
type ReqwestClient = reqwest::blocking::Client;

/// Builder used to build a BaseRequest instance
#[derive(Debug, Clone, Default)]
pub struct BaseRequestBuilder {
    base_url: Option<String>,
    http_client: Option<ReqwestClient>,
    retry_policy: Option<RetryPolicy>,
    accepted_statuses: Option<Vec<u16>>,
    echo_responses: Option<bool>,
}

impl BaseRequestBuilder {
    /// Create a new BaseRequestBuilder instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the values of a suite configuration.
    pub fn from_configuration(configuration: &SuiteConfiguration) -> Self {
        Self::new()
            .with_base_url(configuration.base_url())
            .with_retry_policy(configuration.retry_policy())
            .with_accepted_statuses(configuration.accepted_statuses().iter().copied())
            .with_echo_responses(configuration.echo_responses())
    }

    /// Use the given base url when building a BaseRequest instance.
    ///
    /// # Arguments
    /// `base_url` - scheme, host and port of the API, e.g. `http://localhost:3000`.
    ///
    /// # Returns
    /// This builder.
    pub fn with_base_url<T: Into<String>>(mut self, base_url: T) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use the given blocking reqwest client when building a BaseRequest instance.
    ///
    /// # Arguments
    /// `client` - a pre-configured blocking reqwest client.
    ///
    /// # Returns
    /// This builder.
    pub fn with_http_client(mut self, client: ReqwestClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Retry requests whose status is not accepted according to `policy`.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Statuses that end the retry loop. Defaults to `200` only.
    pub fn with_accepted_statuses<I: IntoIterator<Item = u16>>(mut self, statuses: I) -> Self {
        self.accepted_statuses = Some(statuses.into_iter().collect());
        self
    }

    /// Print every completed exchange to stdout. Enabled by default.
    pub fn with_echo_responses(mut self, value: bool) -> Self {
        self.echo_responses = Some(value);
        self
    }

    /// Consume the builder and create a BaseRequest instance using all of the previously configured values or
    /// their defaults.
    ///
    /// # Returns
    /// A BaseRequest instance.
    pub fn build(mut self) -> BaseRequest {
        let base_url = self
            .base_url
            .take()
            .unwrap_or_else(|| String::from(DEFAULT_BASE_URL));

        BaseRequest {
            http: self.http_client.take().unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_policy: self.retry_policy.unwrap_or_default(),
            accepted_statuses: self.accepted_statuses.take().unwrap_or_else(|| vec![200]),
            echo_responses: self.echo_responses.unwrap_or(true),
        }
    }
}

/// Issues requests against `{base_url}/{entity}/{id}` and re-issues them until an
/// accepted status comes back.
#[derive(Debug, Clone)]
pub struct BaseRequest {
    http: ReqwestClient,
    base_url: String,
    retry_policy: RetryPolicy,
    accepted_statuses: Vec<u16>,
    echo_responses: bool,
}

impl BaseRequest {
    /// Create a BaseRequest for `base_url` with the default client and retry policy.
    pub fn new<T: Into<String>>(base_url: T) -> Self {
        BaseRequestBuilder::new().with_base_url(base_url).build()
    }

    pub fn from_configuration(configuration: &SuiteConfiguration) -> Self {
        BaseRequestBuilder::from_configuration(configuration).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// `{base_url}/{entity}/{id}`
    pub fn url_for<E: AsRef<str>, I: Display>(&self, entity: E, id: I) -> String {
        format!("{}/{}/{}", self.base_url, entity.as_ref(), id)
    }

    /// `{base_url}/{entity}`
    pub fn collection_url<E: AsRef<str>>(&self, entity: E) -> String {
        format!("{}/{}", self.base_url, entity.as_ref())
    }

    /// Fetch one entity.
    ///
    /// # Arguments
    /// `entity` - the collection name, e.g. `users`.
    /// `id` - the entity id.
    /// `expected_error` - accept the first response whatever its status instead of retrying.
    ///
    /// # Returns
    /// The decoded JSON body of the last response.
    pub fn get<E: AsRef<str>, I: Display>(
        &self,
        entity: E,
        id: I,
        expected_error: bool,
    ) -> Result<Value, Error> {
        let url = self.url_for(entity, id);
        let response = self.request(Method::GET, &url, None, expected_error)?;
        let body = response.json()?;

        debug!(url = %url, "{}", body);
        Ok(body)
    }

    /// Post `body` and return the `message` field of the response.
    pub fn post<E: AsRef<str>, I: Display, P: Into<Payload>>(
        &self,
        entity: E,
        id: I,
        body: P,
    ) -> Result<Value, Error> {
        let url = self.url_for(entity, id);
        let response = self.request(Method::POST, &url, Some(&body.into()), false)?;

        response
            .json()?
            .get("message")
            .cloned()
            .ok_or(Error::MissingField("message"))
    }

    pub fn put<E: AsRef<str>, I: Display, P: Into<Payload>>(
        &self,
        entity: E,
        id: I,
        body: P,
    ) -> Result<MutationOutcome, Error> {
        let url = self.url_for(entity, id);
        let response = self.request(Method::PUT, &url, Some(&body.into()), false)?;

        Ok(MutationOutcome::new(Mutation::Updated, &response))
    }

    pub fn delete<E: AsRef<str>, I: Display>(
        &self,
        entity: E,
        id: I,
    ) -> Result<MutationOutcome, Error> {
        let url = self.url_for(entity, id);
        let response = self.request(Method::DELETE, &url, None, false)?;

        Ok(MutationOutcome::new(Mutation::Deleted, &response))
    }

    /// GET the whole collection, accepting the first response.
    pub fn get_collection<E: AsRef<str>>(&self, entity: E) -> Result<ApiResponse, Error> {
        self.request(Method::GET, &self.collection_url(entity), None, true)
    }

    /// POST a new item to the collection, accepting the first response.
    pub fn post_collection<E: AsRef<str>, P: Into<Payload>>(
        &self,
        entity: E,
        body: P,
    ) -> Result<ApiResponse, Error> {
        self.request(
            Method::POST,
            &self.collection_url(entity),
            Some(&body.into()),
            true,
        )
    }

    /// DELETE the whole collection, accepting the first response.
    pub fn delete_collection<E: AsRef<str>>(&self, entity: E) -> Result<ApiResponse, Error> {
        self.request(Method::DELETE, &self.collection_url(entity), None, true)
    }

    /// Send a request, re-issuing it while its status is not accepted.
    ///
    /// With `expected_error` set the first response is returned whatever its status.
    /// Transport failures are never retried.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Payload>,
        expected_error: bool,
    ) -> Result<ApiResponse, Error> {
        let mut attempts: u32 = 0;

        let response = loop {
            attempts = attempts.saturating_add(1);

            let mut request_builder = self.http.request(method.clone(), url);
            if let Some(body) = body {
                request_builder = body.attach(request_builder);
            }

            let response = ApiResponse::read(method.as_str(), request_builder.send()?)?;
            debug!(
                method = %method,
                url,
                attempt = attempts,
                status = response.status_code,
                "attempt finished"
            );

            if expected_error || self.accepted_statuses.contains(&response.status_code) {
                break response;
            }

            if !self.retry_policy.allows_another(attempts) {
                warn!(method = %method, url, attempts, "giving up");
                return Err(Error::RetriesExhausted {
                    method: method.to_string(),
                    url: url.to_string(),
                    attempts,
                    last_status: response.status_code,
                });
            }

            let backoff = self.retry_policy.backoff(attempts);
            warn!(
                method = %method,
                url,
                status = response.status_code,
                "status not accepted, retrying in {:?}",
                backoff
            );
            if !backoff.is_zero() {
                thread::sleep(backoff);
            }
        };

        if self.echo_responses {
            response.echo();
        }
        info!(
            "{} {} {} {}",
            response.method, response.url, response.status_code, response.reason
        );

        Ok(response)
    }
}

impl Default for BaseRequest {
    fn default() -> Self {
        BaseRequestBuilder::new().build()
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::Error, BaseRequest, BaseRequestBuilder, Payload, RetryPolicy};
    use serde_json::json;
    use stub_server::{scripted_test, ResponseData, StubConfiguration, StubServer};

    fn client(retry_policy: RetryPolicy) -> BaseRequest {
        BaseRequestBuilder::new()
            .with_base_url(StubServer::base_url())
            .with_retry_policy(retry_policy)
            .build()
    }

    #[test]
    fn test_url_building() {
        let base_request = BaseRequest::new("http://localhost:3000/");

        assert_eq!(base_request.base_url(), "http://localhost:3000");
        assert_eq!(
            base_request.url_for("users", 2),
            "http://localhost:3000/users/2"
        );
        assert_eq!(
            base_request.collection_url("design_course"),
            "http://localhost:3000/design_course"
        );
    }

    fn sana(config: &mut StubConfiguration) {
        config.add_scripted_response(ResponseData::json(
            200,
            &json!({"id": 2, "name": "sana", "age": 12}),
        ));
    }

    #[scripted_test(sana)]
    fn test_get_returns_decoded_body() {
        let user = client(RetryPolicy::default()).get("users", 2, false).unwrap();

        assert_eq!(user, json!({"id": 2, "name": "sana", "age": 12}));

        let requests = StubServer::received_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].uri, "/users/2");
    }

    fn unavailable_twice(config: &mut StubConfiguration) {
        config.add_scripted_response(ResponseData::json(503, &json!({})));
        config.add_scripted_response(ResponseData::json(500, &json!({"error": "boom"})));
        config.add_scripted_response(ResponseData::json(200, &json!({"id": 1, "name": "Mark"})));
    }

    #[scripted_test(unavailable_twice)]
    fn test_get_retries_until_ok() {
        let user = client(RetryPolicy::immediate(5))
            .get("users", 1, false)
            .unwrap();

        assert_eq!(user["name"], "Mark");
        assert_eq!(StubServer::received_requests().len(), 3);
    }

    fn not_found(config: &mut StubConfiguration) {
        config.add_scripted_response(ResponseData::json(404, &json!({})));
    }

    #[scripted_test(not_found)]
    fn test_expected_error_accepts_first_response() {
        let body = client(RetryPolicy::Unbounded)
            .get("users", 42, true)
            .unwrap();

        assert_eq!(body, json!({}));
        assert_eq!(StubServer::received_requests().len(), 1);
    }

    #[scripted_test(not_found)]
    fn test_bounded_retry_gives_up() {
        let result = client(RetryPolicy::immediate(3)).get("users", 42, false);

        match result {
            Err(Error::RetriesExhausted {
                method,
                url,
                attempts,
                last_status,
            }) => {
                assert_eq!(method, "GET");
                assert!(url.ends_with("/users/42"));
                assert_eq!(attempts, 3);
                assert_eq!(last_status, 404);
            }
            other => panic!("expected the retries to run out, got {:?}", other),
        }
        assert_eq!(StubServer::received_requests().len(), 3);
    }

    #[test]
    fn test_transport_error_is_not_retried() {
        let closed_port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let base_request = BaseRequestBuilder::new()
            .with_base_url(format!("http://127.0.0.1:{}", closed_port))
            .with_retry_policy(RetryPolicy::Unbounded)
            .build();

        match base_request.get("users", 2, false) {
            Err(Error::Transport(e)) => assert!(e.is_connect(), "{}", e),
            other => panic!("expected a transport error, got {:?}", other),
        }
    }

    fn eventually_ok(config: &mut StubConfiguration) {
        for _ in 0..4 {
            config.add_scripted_response(ResponseData::json(500, &json!({})));
        }
        config.add_scripted_response(ResponseData::json(200, &json!([])));
    }

    #[scripted_test(eventually_ok)]
    fn test_unbounded_retry_waits_for_ok() {
        let body = client(RetryPolicy::Unbounded)
            .get("posts", 1, false)
            .unwrap();

        assert_eq!(body, json!([]));
        assert_eq!(StubServer::received_requests().len(), 5);
    }

    fn not_json(config: &mut StubConfiguration) {
        config.add_scripted_response(ResponseData::text(200, "<html>Not Found</html>"));
    }

    #[scripted_test(not_json)]
    fn test_get_rejects_non_json_body() {
        match client(RetryPolicy::default()).get("users", 1, false) {
            Err(Error::InvalidJson(_)) => (),
            other => panic!("expected a JSON error, got {:?}", other),
        }
    }

    #[scripted_test(not_json)]
    fn test_put_is_labelled_updated_whatever_the_body() {
        let outcome = client(RetryPolicy::default())
            .put("users", 2, Payload::form(vec![("name", "sana"), ("age", "12")]))
            .unwrap();

        assert_eq!(outcome.label(), "Updated");
        assert_eq!(outcome.status_code, 200);
        assert_eq!(outcome.body, None);

        let requests = StubServer::received_requests();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].body, "name=sana&age=12");
        assert_eq!(
            requests[0].headers.get("content-type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
    }

    fn created_message(config: &mut StubConfiguration) {
        config.add_scripted_response(ResponseData::json(200, &json!({"message": "created"})));
    }

    #[scripted_test(created_message)]
    fn test_post_returns_message() {
        let message = client(RetryPolicy::default())
            .post("users", 5, json!({"id": 5, "name": "Amelie", "age": 10}))
            .unwrap();

        assert_eq!(message, json!("created"));

        let requests = StubServer::received_requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].uri, "/users/5");
        let sent: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(sent["name"], "Amelie");
    }

    fn no_message(config: &mut StubConfiguration) {
        config.add_scripted_response(ResponseData::json(200, &json!({"id": 5})));
    }

    #[scripted_test(no_message)]
    fn test_post_without_message_fails() {
        match client(RetryPolicy::default()).post("users", 5, json!({"id": 5})) {
            Err(Error::MissingField("message")) => (),
            other => panic!("expected a missing field error, got {:?}", other),
        }
    }

    fn deleted(config: &mut StubConfiguration) {
        config.add_scripted_response(ResponseData::json(200, &json!({})));
    }

    #[scripted_test(deleted)]
    fn test_delete_is_labelled_deleted() {
        let outcome = BaseRequestBuilder::new()
            .with_base_url(StubServer::base_url())
            .with_echo_responses(false)
            .build()
            .delete("users", 3)
            .unwrap();

        assert_eq!(outcome.to_string(), "Deleted");
        assert!(outcome.is_success());
        assert_eq!(outcome.body, Some(json!({})));
        assert_eq!(StubServer::received_requests()[0].method, "DELETE");
    }
}
