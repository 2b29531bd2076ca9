//! Dynamic log file paths
//!
//! Log file paths are templates of static text and placeholders in curly
//! brackets. Placeholders are resolved when a new file is started, never
//! per write:
//!
//! - `{date}` or `{date: <chrono format>}` - timestamp of the rollover
//!   (default format `%Y-%m-%d_%H-%M-%S`)
//! - `{pid}` - process id
//!
//! Besides rendering concrete paths, a template can enumerate the files it
//! could have produced in earlier runs. That drives both continuation of
//! the most recent file after a restart and pruning of old backups.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::SystemTime;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::error::{Error, Result};

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// One renderable piece of a file path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Fixed text emitted as-is
    Static(String),
    /// Rollover timestamp rendered with a chrono format string
    Date(String),
    /// Process id of the running process
    ProcessId,
}

impl PathSegment {
    /// Render this segment into the path under construction
    pub fn resolve(&self, out: &mut String, timestamp: DateTime<Local>) {
        match self {
            Self::Static(text) => out.push_str(text),
            // The format string was validated when the template was parsed
            Self::Date(format) => {
                let _ = write!(out, "{}", timestamp.format(format));
            }
            Self::ProcessId => {
                let _ = write!(out, "{}", process::id());
            }
        }
    }

}

/// An ordered sequence of path segments
#[derive(Debug, Clone)]
pub struct PathTemplate {
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    /// Parse a template string
    ///
    /// Unknown placeholders, unbalanced brackets, and invalid date formats
    /// are configuration errors.
    pub fn parse(template: &str) -> Result<Self> {
        if template.is_empty() {
            return Err(Error::InvalidPathTemplate("template is empty".into()));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                Error::InvalidPathTemplate(format!("unclosed '{{' in '{template}'"))
            })?;
            let placeholder = &after[..close];
            if placeholder.contains('{') {
                return Err(Error::InvalidPathTemplate(format!(
                    "nested '{{' in '{template}'"
                )));
            }

            if !literal.is_empty() {
                segments.push(PathSegment::Static(std::mem::take(&mut literal)));
            }
            segments.push(parse_placeholder(placeholder)?);
            rest = &after[close + 1..];
        }

        if rest.contains('}') {
            return Err(Error::InvalidPathTemplate(format!(
                "unmatched '}}' in '{template}'"
            )));
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(PathSegment::Static(literal));
        }

        Ok(Self { segments })
    }

    /// Render a concrete path for the given rollover timestamp
    pub fn resolve(&self, timestamp: DateTime<Local>) -> PathBuf {
        let mut path = String::new();
        for segment in &self.segments {
            segment.resolve(&mut path, timestamp);
        }
        PathBuf::from(path)
    }

    /// Files this template could have produced, newest first
    ///
    /// Scans the template's directory (placeholders in the directory part
    /// are resolved with `timestamp`) and keeps entries whose names the
    /// file-name part of the template can render. Ordered by modification
    /// time, falling back to the name so equally-old files keep a stable
    /// order. An unreadable or missing directory yields an empty list.
    pub fn find_existing(&self, timestamp: DateTime<Local>) -> Vec<PathBuf> {
        let (directory, name_segments) = self.split_directory(timestamp);

        let read_dir = match &directory {
            Some(dir) => fs::read_dir(dir),
            None => fs::read_dir("."),
        };
        let entries = match read_dir {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<(SystemTime, String)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                if !matches_name(&name_segments, &name) {
                    return None;
                }
                let metadata = entry.metadata().ok()?;
                if !metadata.is_file() {
                    return None;
                }
                Some((metadata.modified().ok()?, name))
            })
            .collect();

        files.sort_by(|a, b| b.cmp(a));

        files
            .into_iter()
            .map(|(_, name)| match &directory {
                Some(dir) => PathBuf::from(format!("{dir}{name}")),
                None => PathBuf::from(name),
            })
            .collect()
    }

    /// Split into the rendered directory part (including the trailing
    /// separator) and the segments making up the file name
    fn split_directory(&self, timestamp: DateTime<Local>) -> (Option<String>, Vec<PathSegment>) {
        let mut split = None;
        for (index, segment) in self.segments.iter().enumerate() {
            if let PathSegment::Static(text) = segment {
                if let Some(position) = text.rfind(std::path::is_separator) {
                    split = Some((index, position));
                }
            }
        }

        let Some((index, position)) = split else {
            return (None, self.segments.clone());
        };

        let mut directory = String::new();
        for segment in &self.segments[..index] {
            segment.resolve(&mut directory, timestamp);
        }
        let PathSegment::Static(text) = &self.segments[index] else {
            return (None, self.segments.clone());
        };
        directory.push_str(&text[..=position]);

        let mut name_segments = Vec::new();
        if position + 1 < text.len() {
            name_segments.push(PathSegment::Static(text[position + 1..].to_string()));
        }
        name_segments.extend_from_slice(&self.segments[index + 1..]);

        (Some(directory), name_segments)
    }
}

fn parse_placeholder(text: &str) -> Result<PathSegment> {
    let (name, argument) = match text.find(':') {
        Some(index) => (text[..index].trim(), Some(text[index + 1..].trim())),
        None => (text.trim(), None),
    };

    match name {
        "date" => {
            let format = argument
                .filter(|value| !value.is_empty())
                .unwrap_or(DEFAULT_DATE_FORMAT);
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(Error::InvalidPathTemplate(format!(
                    "invalid date format '{format}'"
                )));
            }
            Ok(PathSegment::Date(format.to_string()))
        }
        "pid" => Ok(PathSegment::ProcessId),
        _ => Err(Error::InvalidPathTemplate(format!(
            "unknown placeholder '{name}'"
        ))),
    }
}

/// Check whether the name segments can render exactly `name`
///
/// Static segments must match literally; dynamic segments match any
/// non-empty run of characters.
fn matches_name(segments: &[PathSegment], name: &str) -> bool {
    match segments.split_first() {
        None => name.is_empty(),
        Some((PathSegment::Static(text), rest)) => name
            .strip_prefix(text.as_str())
            .is_some_and(|tail| matches_name(rest, tail)),
        Some((_, rest)) => (1..=name.len())
            .filter(|index| name.is_char_boundary(*index))
            .any(|index| matches_name(rest, &name[index..])),
    }
}

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;
