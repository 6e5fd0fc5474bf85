mod collections;
mod data;
mod error;
mod fixture;
mod runner;
mod stub_configuration;
mod stub_server;
mod test_session;

pub use collections::Collections;
pub use data::{RequestData, ResponseData};
pub use error::Error;
pub use fixture::{FixtureSource, InlineFixture, JsonFileFixture};
pub use stub_configuration::StubConfiguration;
pub use stub_server::{StubMode, StubServer};
pub use stub_server_codegen::{collections_test, scripted_test};
pub use test_session::TestSession;
