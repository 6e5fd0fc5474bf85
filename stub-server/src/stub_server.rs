use crate::{
    collections::Collections, error::Error, runner, RequestData, ResponseData, StubConfiguration,
};
use lazy_static::lazy_static;
use std::{
    net::SocketAddr,
    sync::{Mutex, PoisonError},
};

lazy_static! {
    static ref STUB_INSTANCE: Mutex<StubServer> = Mutex::new(StubServer::new());
    static ref STUB_ADDRESS: Result<SocketAddr, String> =
        runner::start().map_err(|e| e.to_string());
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StubMode {
    /// Serve the fixture's entities with json-server semantics.
    Collections,
    /// Replay the configured responses in order.
    Scripted,
}

#[derive(Debug)]
pub struct StubServer {
    configuration: Option<StubConfiguration>,
    collections: Option<Collections>,
    interactions: Vec<RequestData>,
    interaction_number: usize,
    error: Option<Error>,
}

impl StubServer {
    fn new() -> Self {
        StubServer {
            configuration: None,
            collections: None,
            interactions: Vec::new(),
            interaction_number: 0,
            error: None,
        }
    }

    pub(crate) fn with_instance<R, F: FnOnce(&mut StubServer) -> R>(func: F) -> R {
        let mut instance = STUB_INSTANCE
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        func(&mut instance)
    }

    /// Address of the server, starting it on first use.
    pub fn address() -> Result<SocketAddr, Error> {
        match &*STUB_ADDRESS {
            Ok(address) => Ok(*address),
            Err(reason) => Err(Error::ServerStartFailed(reason.clone())),
        }
    }

    /// `http://127.0.0.1:{port}` of the running server.
    ///
    /// # Panics
    /// If the server could not be started.
    pub fn base_url() -> String {
        match Self::address() {
            Ok(address) => format!("http://{}", address),
            Err(e) => panic!("{}", e),
        }
    }

    /// Requests received since the current test started, oldest first.
    pub fn received_requests() -> Vec<RequestData> {
        Self::with_instance(|server| server.interactions.clone())
    }

    pub(crate) fn configure(&mut self, configuration: StubConfiguration) -> Result<(), Error> {
        self.reset();

        if configuration.mode() == StubMode::Collections {
            let fixture = configuration
                .fixture_source()
                .ok_or(Error::NotConfigured)?
                .load()
                .map_err(|e| Error::InvalidFixture(e.to_string()))?;

            self.collections = Some(Collections::from_value(fixture)?);
        }

        self.configuration = Some(configuration);
        Ok(())
    }

    pub(crate) fn handle_request(
        &mut self,
        request_data: RequestData,
    ) -> Result<ResponseData, Error> {
        self.interactions.push(request_data.clone());

        let mode = self
            .configuration
            .as_ref()
            .ok_or(Error::NotConfigured)?
            .mode();

        match mode {
            StubMode::Scripted => self.handle_scripted(),
            StubMode::Collections => Ok(self
                .collections
                .as_mut()
                .ok_or(Error::NotConfigured)?
                .handle(&request_data)),
        }
    }

    fn handle_scripted(&mut self) -> Result<ResponseData, Error> {
        let script = self
            .configuration
            .as_ref()
            .ok_or(Error::NotConfigured)?
            .scripted_responses();

        let last = script.len().checked_sub(1).ok_or(Error::EmptyScript)?;
        let response = script[self.interaction_number.min(last)].clone();
        self.interaction_number += 1;

        Ok(response)
    }

    pub(crate) fn record_error(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub(crate) fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    pub(crate) fn teardown_hooks(&self) -> Vec<fn()> {
        self.configuration
            .as_ref()
            .map(|configuration| configuration.teardown_hooks().to_vec())
            .unwrap_or_default()
    }

    pub(crate) fn reset(&mut self) {
        self.configuration = None;
        self.collections = None;
        self.interactions.clear();
        self.interaction_number = 0;
        self.error = None;
    }
}
