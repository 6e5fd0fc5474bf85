use crate::{error::Error, StubConfiguration, StubServer};
use lazy_static::lazy_static;
use std::sync::{Condvar, Mutex, PoisonError};

lazy_static! {
    static ref TEST_SESSION: TestSession = TestSession::new();
}

/// Serializes tests that share the stub server inside one test binary.
pub struct TestSession {
    lock: (Mutex<bool>, Condvar),
}

impl TestSession {
    fn new() -> Self {
        Self {
            lock: (Mutex::new(false), Condvar::new()),
        }
    }

    /// Wait for the server to be free, then configure it for the next test.
    ///
    /// On error the server is released again, so `after_test` must not be called.
    pub fn before_test(configuration: StubConfiguration) -> Result<(), Error> {
        TEST_SESSION.enter_test();

        let result = StubServer::address()
            .and_then(|_| StubServer::with_instance(|server| server.configure(configuration)));

        if result.is_err() {
            StubServer::with_instance(StubServer::reset);
            TEST_SESSION.exit_test();
        }

        result
    }

    /// Run the teardown hooks, reset the server and release it for the next test.
    ///
    /// Returns the first error the server ran into while handling requests.
    pub fn after_test() -> Result<(), Error> {
        let (error, teardown_hooks) = StubServer::with_instance(|server| {
            let error = server.take_error();
            let teardown_hooks = server.teardown_hooks();
            server.reset();
            (error, teardown_hooks)
        });

        for hook in teardown_hooks {
            hook();
        }

        TEST_SESSION.exit_test();

        match error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn enter_test(&self) {
        let (lock, cond) = &self.lock;
        let mut is_test_running = cond
            .wait_while(
                lock.lock().unwrap_or_else(PoisonError::into_inner),
                |is_test_running| *is_test_running,
            )
            .unwrap_or_else(PoisonError::into_inner);
        *is_test_running = true;
    }

    fn exit_test(&self) {
        let (lock, cond) = &self.lock;
        let mut is_test_running = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *is_test_running = false;

        cond.notify_one();
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}
