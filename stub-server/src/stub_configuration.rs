use crate::{
    fixture::{FixtureSource, JsonFileFixture},
    ResponseData, StubMode,
};
use std::{path::Path, sync::Arc};

#[derive(Debug)]
pub struct StubConfiguration {
    mode: StubMode,
    fixture_source: Option<Arc<dyn FixtureSource + Send + Sync>>,
    scripted_responses: Vec<ResponseData>,
    teardown_hooks: Vec<fn()>,
}

impl StubConfiguration {
    pub fn new(mode: StubMode) -> Self {
        Self {
            mode,
            fixture_source: None,
            scripted_responses: Vec::new(),
            teardown_hooks: Vec::new(),
        }
    }

    pub fn mode(&self) -> StubMode {
        self.mode
    }

    /// Seed collections mode from a `db.json`-style file.
    pub fn set_fixture_file<P: AsRef<Path>>(&mut self, path: P) {
        self.fixture_source = Some(Arc::new(JsonFileFixture::new(path)));
    }

    pub fn set_fixture_source(&mut self, fixture_source: Box<dyn FixtureSource + Send + Sync>) {
        self.fixture_source = Some(fixture_source.into());
    }

    pub fn fixture_source(&self) -> Option<Arc<dyn FixtureSource + Send + Sync>> {
        self.fixture_source.clone()
    }

    /// Queue a response for scripted mode. Responses are replayed in the order they
    /// were added; the last one keeps being replayed once the queue is exhausted.
    pub fn add_scripted_response(&mut self, response: ResponseData) {
        self.scripted_responses.push(response);
    }

    pub fn scripted_responses(&self) -> &[ResponseData] {
        &self.scripted_responses
    }

    /// Run `hook` once the test is over, before the server is released to the next one.
    pub fn add_teardown_hook(&mut self, hook: fn()) {
        self.teardown_hooks.push(hook);
    }

    pub fn teardown_hooks(&self) -> &[fn()] {
        &self.teardown_hooks
    }
}
