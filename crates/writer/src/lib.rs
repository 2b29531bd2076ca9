//! Scribe - rolling file writer
//!
//! Buffered, policy-driven file output for the Scribe logging framework.
//! Fully rendered log records go in; byte-exact, charset-encoded log files
//! come out, rolled over to new files as the configured policies demand.
//!
//! # Architecture
//!
//! ```text
//! [caller] --record--> [RollingFileWriter] --policy check--> [Policy list]
//!                             |
//!                             | (rollover: close, resolve, reopen)
//!                             v
//!                      [PathTemplate] -> [LogFile] -> [ChunkBuffer] -> disk
//! ```
//!
//! The writer serializes every write (including any rollover it triggers)
//! under one lock, so records never reorder or interleave. Buffering is
//! block-aligned: flushes land on offsets that are multiples of the buffer
//! capacity, even when an existing file is continued after a restart.
//!
//! # Example
//!
//! ```no_run
//! use scribe_config::FileWriterConfig;
//! use scribe_writer::RollingFileWriter;
//!
//! let config = FileWriterConfig {
//!     path: "logs/app_{date: %Y-%m-%d}.log".into(),
//!     ..FileWriterConfig::default()
//! };
//!
//! let writer = RollingFileWriter::new(&config)?;
//! writer.write("2025-03-14 09:26:53 INFO  Hello World!\n")?;
//! writer.close()?;
//! # Ok::<(), scribe_writer::Error>(())
//! ```

// =============================================================================
// Core components
// =============================================================================

/// Fixed-capacity chunk buffer between encoded records and the disk
pub mod chunk;

/// Charset encoding and byte order marks
pub mod encoding;

/// A single open log file with its write buffer
pub mod log_file;

/// Dynamic log file path templates
pub mod path;

/// Rollover policies (endless, startup, size, daily, weekly, monthly)
pub mod policy;

/// The rolling file writer orchestrating all of the above
pub mod rolling;

mod error;

pub use chunk::ChunkBuffer;
pub use encoding::Charset;
pub use error::{Error, Result};
pub use log_file::LogFile;
pub use path::{PathSegment, PathTemplate};
pub use policy::Policy;
pub use rolling::RollingFileWriter;
