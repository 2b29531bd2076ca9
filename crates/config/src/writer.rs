//! Rolling file writer configuration
//!
//! Configuration for the buffered rolling file writer. The path may contain
//! `{date}` and `{pid}` placeholders that are resolved when a new log file is
//! started. Rollover behavior is controlled by a list of policies; with an
//! empty list the writer starts a new file on every startup.

use std::path::PathBuf;

use serde::Deserialize;

/// Default write buffer size (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for the rolling file writer
///
/// # Example
///
/// ```toml
/// [writer]
/// path = "logs/app_{date: %Y-%m-%d}.log"
/// buffer_size = 65536
/// backups = 10
///
/// [[writer.policies]]
/// type = "size"
/// limit = 10485760
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileWriterConfig {
    /// Path template for log files, with optional `{date}`/`{pid}` placeholders
    pub path: String,

    /// Charset used for encoding log records
    /// Default: "UTF-8"
    pub charset: String,

    /// Write buffer size in bytes
    /// Default: 65536 (64KiB)
    pub buffer_size: usize,

    /// Rollover policies; a log file is only continued if all of them agree
    /// Default: empty (start a new file on every startup)
    pub policies: Vec<PolicyConfig>,

    /// Number of rolled log files to keep besides the active one
    /// Default: None (keep everything)
    pub backups: Option<usize>,

    /// Path of a hard link that always points to the active log file
    /// Default: None
    pub latest_link: Option<PathBuf>,
}

impl Default for FileWriterConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            charset: "UTF-8".into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            policies: Vec::new(),
            backups: None,
            latest_link: None,
        }
    }
}

/// Configuration for a single rollover policy
///
/// Policies decide at startup whether an existing log file may be continued
/// and per record whether the active file still has room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PolicyConfig {
    /// Never roll over
    Endless,

    /// Start a new log file on every process start
    Startup,

    /// Roll over once the file reaches a size limit
    Size {
        /// Maximum file size in bytes
        limit: u64,
    },

    /// Roll over once per day
    Daily {
        /// Time of day for the rollover, "HH:MM" (default: midnight)
        #[serde(default)]
        time: Option<String>,
    },

    /// Roll over once per week
    Weekly {
        /// Day of week for the rollover (default: Monday)
        #[serde(default)]
        day: Option<String>,
        /// Time of day for the rollover, "HH:MM" (default: midnight)
        #[serde(default)]
        time: Option<String>,
    },

    /// Roll over on the first day of every month
    Monthly {
        /// Time of day for the rollover, "HH:MM" (default: midnight)
        #[serde(default)]
        time: Option<String>,
    },
}

impl PolicyConfig {
    /// Get the policy type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Endless => "endless",
            Self::Startup => "startup",
            Self::Size { .. } => "size",
            Self::Daily { .. } => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Monthly { .. } => "monthly",
        }
    }
}
