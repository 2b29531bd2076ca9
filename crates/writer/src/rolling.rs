//! Rolling file writer
//!
//! Orchestrates the buffered log file, the rollover policies, and the path
//! template. Every write runs policy check, a possible rollover, and the
//! buffer write as one critical section under a single lock, so records
//! land in the file in lock acquisition order and never interleave.
//!
//! ```text
//! [write()] -> [policies.can_accept] -> [LogFile.write]
//!                     | (rejected)
//!              [close active file]
//!                     |
//!              [template.resolve] -> [LogFile.open] -> [policies.init]
//!                     |
//!              [prune backups, refresh latest link]
//! ```
//!
//! On startup the most recent file the template could have produced is
//! continued if every policy agrees; otherwise a fresh file is started.
//! After a failed rollover no file is active and the next write attempts
//! the rollover again - a record is either written or its error returned,
//! never silently dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use scribe_config::FileWriterConfig;

use crate::encoding::Charset;
use crate::error::{Error, Result};
use crate::log_file::LogFile;
use crate::path::PathTemplate;
use crate::policy::{self, Policy};

/// Smallest usable write buffer; the charset header must fit into a single
/// chunk.
const MIN_BUFFER_SIZE: usize = 16;

/// Thread-safe writer that appends records to the active log file and rolls
/// over to a new file when its policies demand it
pub struct RollingFileWriter {
    state: Mutex<WriterState>,
}

struct WriterState {
    template: PathTemplate,
    charset: Charset,
    buffer_size: usize,
    policies: Vec<Policy>,
    backups: Option<usize>,
    latest_link: Option<PathBuf>,
    current: Option<LogFile>,
}

impl RollingFileWriter {
    /// Create a writer from its configuration and open the initial file
    ///
    /// Configuration problems (unknown charset, malformed template or
    /// policy parameters) and failure to open the initial file are reported
    /// here; the writer does not start.
    pub fn new(config: &FileWriterConfig) -> Result<Self> {
        if config.buffer_size < MIN_BUFFER_SIZE {
            return Err(Error::InvalidBufferSize(config.buffer_size));
        }

        let charset = Charset::from_name(&config.charset)?;
        let template = PathTemplate::parse(&config.path)?;

        // Without configured policies every restart starts a new file
        let policies = if config.policies.is_empty() {
            vec![Policy::startup()]
        } else {
            config
                .policies
                .iter()
                .map(Policy::from_config)
                .collect::<Result<Vec<_>>>()?
        };

        let mut state = WriterState {
            template,
            charset,
            buffer_size: config.buffer_size,
            policies,
            backups: config.backups,
            latest_link: config.latest_link.clone(),
            current: None,
        };
        state.open_initial(Local::now())?;

        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Write one fully rendered log record
    ///
    /// Returns once the record is buffered or on the file descriptor. Any
    /// rollover the record triggers happens first, inside the same critical
    /// section.
    pub fn write(&self, record: &str) -> Result<()> {
        self.state.lock().write(record, Local::now())
    }

    /// Push buffered bytes of the active file to the file descriptor
    pub fn flush(&self) -> Result<()> {
        match self.state.lock().current.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Flush and close the active file
    ///
    /// Further writes reopen a file via the normal rollover path.
    pub fn close(&self) -> Result<()> {
        match self.state.lock().current.take() {
            Some(file) => file.close(),
            None => Ok(()),
        }
    }

    /// Path of the currently active log file, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state
            .lock()
            .current
            .as_ref()
            .map(|file| file.path().to_path_buf())
    }
}

impl Drop for RollingFileWriter {
    fn drop(&mut self) {
        if let Some(file) = self.state.lock().current.take() {
            let path = file.path().display().to_string();
            if let Err(error) = file.close() {
                tracing::error!(path = %path, error = %error, "failed to close log file");
            }
        }
    }
}

impl WriterState {
    /// Open the initial file, continuing the most recent matching file when
    /// every policy allows it
    fn open_initial(&mut self, now: DateTime<Local>) -> Result<()> {
        if let Some(existing) = self.template.find_existing(now).into_iter().next() {
            if policy::can_continue_all(&self.policies, &existing, now) {
                let file = self.open_file(&existing, true, now)?;
                tracing::debug!(path = %existing.display(), "continuing existing log file");
                self.current = Some(file);
                return Ok(());
            }
        }

        let path = self.template.resolve(now);
        let file = self.open_file(&path, false, now)?;
        tracing::info!(path = %path.display(), "started new log file");
        self.current = Some(file);
        Ok(())
    }

    fn write(&mut self, record: &str, now: DateTime<Local>) -> Result<()> {
        let data = self.charset.encode(record);
        if data.is_empty() {
            return Ok(());
        }

        let accepted = self.current.is_some()
            && policy::can_accept_all(&mut self.policies, data.len() as u64, now);
        if accepted {
            if let Some(file) = self.current.as_mut() {
                return file.write_bytes(&data);
            }
        }

        self.roll_and_write(&data, now)
    }

    /// Close the active file, open its replacement, and write the pending
    /// record to it
    fn roll_and_write(&mut self, data: &[u8], now: DateTime<Local>) -> Result<()> {
        if let Some(old) = self.current.take() {
            let old_path = old.path().display().to_string();
            old.close()?;
            tracing::info!(path = %old_path, "rolled over log file");
        }

        let path = self.template.resolve(now);
        let mut file = self.open_file(&path, false, now)?;

        // The pending record counts against the fresh file
        policy::can_accept_all(&mut self.policies, data.len() as u64, now);
        file.write_bytes(data)?;

        self.current = Some(file);
        Ok(())
    }

    /// Open a log file and rebuild the surrounding state: policy baselines,
    /// backup pruning, and the latest link
    fn open_file(&mut self, path: &Path, append: bool, now: DateTime<Local>) -> Result<LogFile> {
        let file = LogFile::open(path, self.charset, self.buffer_size, append)?;
        policy::init_all(&mut self.policies, path, now);
        self.prune_backups(path, now);
        self.refresh_latest_link(path);
        Ok(file)
    }

    /// Delete matching files beyond the configured backup count
    ///
    /// Failures are logged and never fail the write that triggered them.
    fn prune_backups(&self, active: &Path, now: DateTime<Local>) {
        let Some(keep) = self.backups else {
            return;
        };

        let backups: Vec<PathBuf> = self
            .template
            .find_existing(now)
            .into_iter()
            .filter(|path| path != active)
            .collect();

        for path in backups.iter().skip(keep) {
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "deleted old log file"),
                Err(error) => {
                    tracing::warn!(path = %path.display(), error = %error, "failed to delete old log file");
                }
            }
        }
    }

    /// Re-point the configured hard link at the active file
    ///
    /// Failures are logged and never fail the write that triggered them.
    fn refresh_latest_link(&self, active: &Path) {
        let Some(link) = &self.latest_link else {
            return;
        };

        match fs::remove_file(link) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                tracing::error!(link = %link.display(), error = %error, "failed to replace latest link");
                return;
            }
        }

        if let Err(error) = fs::hard_link(active, link) {
            tracing::error!(link = %link.display(), error = %error, "failed to create latest link");
        }
    }
}

#[cfg(test)]
#[path = "rolling_test.rs"]
mod rolling_test;
