//! Process-wide request log.
//!
//! Lines are written as `timestamp - LEVEL - message` to a single append-only file.
//! The logger has to be initialized explicitly before the first request; events
//! emitted earlier are dropped.

use crate::error::Error;
use chrono::Local;
use lazy_static::lazy_static;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
    EnvFilter,
};

const LOG_FILTER_ENV: &str = "API_SUITE_LOG";
const DEFAULT_FILTER: &str = "debug";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

lazy_static! {
    // The file every event is written to. Empty before `init` and after `close`.
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
    static ref SUITE_LOG: Mutex<Option<LogGuard>> = Mutex::new(None);
    static ref INSTALLED: Mutex<bool> = Mutex::new(false);
}

fn log_file() -> MutexGuard<'static, Option<File>> {
    LOG_FILE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn open(path: &Path) -> Result<File, Error> {
    if let Some(directory) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(directory)?;
    }

    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Keeps the log file open. Dropping it flushes and closes the file; events
/// emitted afterwards are discarded.
#[derive(Debug)]
pub struct LogGuard {
    path: PathBuf,
    closed: bool,
}

impl LogGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) -> Result<(), Error> {
        if let Some(file) = log_file().as_mut() {
            file.flush()?;
            file.sync_all()?;
        }
        Ok(())
    }

    /// Flush and release the file.
    pub fn close(mut self) -> Result<(), Error> {
        self.release()
    }

    fn release(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match log_file().take() {
            Some(mut file) => {
                file.flush()?;
                file.sync_all()?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Writes events to the current log file, or nowhere once it is closed.
struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match log_file().as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match log_file().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Install the global subscriber writing to `log_file_path`, creating its directory if needed.
///
/// Fails with [`Error::LoggerAlreadyInitialized`] when a global subscriber is already set.
pub fn init<P: AsRef<Path>>(log_file_path: P) -> Result<LogGuard, Error> {
    let path = log_file_path.as_ref();
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    if *installed {
        return Err(Error::LoggerAlreadyInitialized);
    }

    let file = open(path)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .event_format(LineFormat)
        .with_writer(|| LogWriter)
        .try_init()
        .map_err(|_| Error::LoggerAlreadyInitialized)?;

    *installed = true;
    *log_file() = Some(file);

    Ok(LogGuard {
        path: path.to_path_buf(),
        closed: false,
    })
}

/// Open the log for the whole process unless it is already open.
///
/// Used by test binaries, where every test may be the first one to run. After
/// [`shutdown`] the file is opened again, appending to what was written before.
pub fn init_once<P: AsRef<Path>>(log_file_path: P) -> Result<(), Error> {
    let mut suite_log = SUITE_LOG.lock().unwrap_or_else(PoisonError::into_inner);
    if suite_log.is_some() {
        return Ok(());
    }

    let installed = *INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    let path = log_file_path.as_ref();

    let guard = if installed {
        let mut current = log_file();
        if current.is_none() {
            *current = Some(open(path)?);
        }
        LogGuard {
            path: path.to_path_buf(),
            closed: false,
        }
    } else {
        init(path)?
    };

    *suite_log = Some(guard);
    Ok(())
}

/// Flush and close the log opened by [`init_once`].
pub fn shutdown() -> Result<(), Error> {
    let mut suite_log = SUITE_LOG.lock().unwrap_or_else(PoisonError::into_inner);

    match suite_log.take() {
        Some(guard) => guard.close(),
        None => Ok(()),
    }
}

struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
